//! Raw-mode setup and the restore path every exit has to go through.
//!
//! Restoration is idempotent: the drop guard, the panic hook and the signal
//! task may all race to it and only the first one does any work.

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};

static ACTIVE: AtomicBool = AtomicBool::new(false);
static EXITING: AtomicBool = AtomicBool::new(false);

pub(crate) type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Enter raw mode on the alternate screen, cleared and titled.
pub(crate) fn enter() -> Result<Tui> {
    enable_raw_mode().context("enable raw mode")?;
    ACTIVE.store(true, Ordering::SeqCst);
    install_panic_hook();

    let setup = || -> Result<Tui> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            SetTitle("VIA Tools"),
            Clear(ClearType::All)
        )
        .context("prepare screen")?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")?;
        terminal.clear().ok();
        Ok(terminal)
    };
    setup().inspect_err(|_| restore())
}

/// Undo `enter`. Safe to call any number of times from any thread.
pub(crate) fn restore() {
    restore_to(&mut io::stdout());
}

fn restore_to<W: Write>(out: &mut W) {
    if !ACTIVE.swap(false, Ordering::SeqCst) {
        return;
    }
    // Teardown: nothing left to do if these fail.
    let _ = disable_raw_mode();
    let _ = execute!(out, LeaveAlternateScreen, Show);
}

/// True for exactly one caller over the process lifetime.
pub(crate) fn claim_exit() -> bool {
    !EXITING.swap(true, Ordering::SeqCst)
}

/// Restore the terminal and terminate. Later callers only restore.
pub(crate) fn exit_after_restore(code: i32) {
    restore();
    if claim_exit() {
        std::process::exit(code);
    }
}

/// Restores the terminal when the render loop unwinds or returns.
pub(crate) struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore();
    }
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        previous(info);
    }));
}

/// Wait for a termination signal, then restore and exit.
#[cfg(unix)]
pub(crate) async fn restore_on_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt()).context("install SIGINT handler")?;
    let mut terminate = signal(SignalKind::terminate()).context("install SIGTERM handler")?;
    let mut hangup = signal(SignalKind::hangup()).context("install SIGHUP handler")?;
    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = hangup.recv() => "SIGHUP",
    };
    tracing::info!(signal = name, "terminating; the download keeps running");
    exit_after_restore(0);
    Ok(())
}

#[cfg(not(unix))]
pub(crate) async fn restore_on_signal() -> Result<()> {
    tokio::signal::ctrl_c().await.context("install Ctrl-C handler")?;
    exit_after_restore(0);
    Ok(())
}
