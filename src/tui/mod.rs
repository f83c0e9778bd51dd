mod help;
mod keys;
mod terminal;
mod theme;
mod view;

use crate::cli::Cli;
use crate::config::{Config, WatchTiming};
use crate::guard::FsWorkspace;
use crate::model::AppEvent;
use crate::orchestrator::{Controller, Flow, Ports};
use crate::supervisor::TmuxSupervisor;
use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use theme::Theme;

pub async fn run(_args: Cli) -> Result<()> {
    // One channel carries keys, ticks and watcher signals into the render loop.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();

    let signals = tokio::spawn(terminal::restore_on_signal());

    let ports = Ports {
        supervisor: Arc::new(TmuxSupervisor::new()),
        workspace: Arc::new(FsWorkspace),
        load_config: Box::new(Config::from_env),
    };
    let controller = Controller::new(
        ports,
        WatchTiming::default(),
        Handle::current(),
        event_tx.clone(),
    );

    // The render loop gets its own thread so blocking terminal I/O stays off the runtime.
    let ui_handle =
        std::thread::spawn(move || run_threaded(controller, event_tx, event_rx));
    let joined = tokio::task::spawn_blocking(move || ui_handle.join())
        .await
        .context("join TUI thread")?;
    signals.abort();

    match joined {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!("TUI thread panicked")),
    }
}

/// Run the render loop on the current thread until the operator quits.
fn run_threaded(
    mut controller: Controller,
    event_tx: UnboundedSender<AppEvent>,
    mut event_rx: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let mut terminal = terminal::enter()?;
    let _guard = terminal::TerminalGuard;
    let theme = Theme::from_env();

    spawn_input_reader(event_tx);
    terminal
        .draw(|f| view::draw(f.area(), f, controller.model(), &theme))
        .context("draw first frame")?;

    // The only blocking point: waiting for the next event.
    while let Some(ev) = event_rx.blocking_recv() {
        if fold(&mut controller, ev) == Flow::Quit {
            break;
        }
        // Coalesce whatever queued up meanwhile into a single frame.
        let mut quit = false;
        while let Ok(ev) = event_rx.try_recv() {
            if fold(&mut controller, ev) == Flow::Quit {
                quit = true;
                break;
            }
        }
        if quit {
            break;
        }
        terminal
            .draw(|f| view::draw(f.area(), f, controller.model(), &theme))
            .ok();
    }

    tracing::info!("quit requested");
    Ok(())
}

fn fold(controller: &mut Controller, ev: AppEvent) -> Flow {
    match ev {
        AppEvent::Key(key) => match keys::command_for(controller.model().state(), &key) {
            Some(cmd) => controller.apply(cmd),
            None => Flow::Continue,
        },
        other => {
            controller.handle(other);
            Flow::Continue
        }
    }
}

/// Forward terminal input into the event channel. Abandoned at exit.
fn spawn_input_reader(event_tx: UnboundedSender<AppEvent>) {
    std::thread::spawn(move || loop {
        let ev = match event::read() {
            Ok(Event::Key(key)) => AppEvent::Key(key),
            Ok(Event::Resize(..)) => AppEvent::Resize,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "terminal input closed");
                break;
            }
        };
        if event_tx.send(ev).is_err() {
            break;
        }
    });
}
