//! Download lifecycle controller.
//!
//! Folds operator commands and background signals into the `MenuModel`,
//! running the side effect of each transition before committing it.

use super::lifecycle::{transition, Effect, LifecycleEvent, Transition};
use crate::config::{Config, WatchTiming};
use crate::error::{ConfigError, LaunchError};
use crate::guard::Workspace;
use crate::model::{AppEvent, JobState, JobStatus, MenuAction, MenuModel, Notice, RunId};
use crate::supervisor::{spawn_ticker, spawn_watcher, Supervisor, SupervisedJob};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Commands produced from key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UiCommand {
    MoveUp,
    MoveDown,
    Activate,
    Confirm,
    Decline,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

pub(crate) type ConfigLoader = Box<dyn Fn() -> Result<Config, ConfigError> + Send>;

/// Impure collaborators of the controller.
pub(crate) struct Ports {
    pub supervisor: Arc<dyn Supervisor>,
    pub workspace: Arc<dyn Workspace>,
    pub load_config: ConfigLoader,
}

pub(crate) struct Controller {
    model: MenuModel,
    ports: Ports,
    timing: WatchTiming,
    runtime: Handle,
    event_tx: UnboundedSender<AppEvent>,
    ticker: Option<JoinHandle<()>>,
    // Config captured when confirmation was requested; used by `y`.
    pending: Option<Config>,
    last_run: RunId,
}

impl Controller {
    pub fn new(
        ports: Ports,
        timing: WatchTiming,
        runtime: Handle,
        event_tx: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            model: MenuModel::new(timing.tick_interval),
            ports,
            timing,
            runtime,
            event_tx,
            ticker: None,
            pending: None,
            last_run: 0,
        }
    }

    pub fn model(&self) -> &MenuModel {
        &self.model
    }

    pub fn apply(&mut self, cmd: UiCommand) -> Flow {
        match cmd {
            UiCommand::Quit => return Flow::Quit,
            UiCommand::MoveUp => self.model.move_up(),
            UiCommand::MoveDown => self.model.move_down(),
            UiCommand::Activate => self.activate(),
            UiCommand::Confirm => self.confirm(),
            UiCommand::Decline => self.step(LifecycleEvent::Decline),
        }
        Flow::Continue
    }

    /// Fold a background signal. Key events are mapped to commands by the caller.
    pub fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(_) | AppEvent::Resize | AppEvent::Tick => {}
            AppEvent::PidResolved { run, pid } => {
                if let Some(job) = self.current_job(run) {
                    job.pid = Some(pid);
                }
            }
            AppEvent::JobFinished { run } => {
                if self.current_job(run).is_some() {
                    self.step(LifecycleEvent::JobFinished);
                } else {
                    tracing::debug!(run, "ignoring completion of a stale run");
                }
            }
            AppEvent::WatchAbandoned { run, reason } => {
                let Some(job) = self.current_job(run) else {
                    return;
                };
                job.watched = false;
                let hint = SupervisedJob::attach_hint(&job.session);
                self.model.set_notice(Notice::error(format!(
                    "Cannot track the download ({reason}). Check it with `{hint}`"
                )));
            }
        }
    }

    fn current_job(&mut self, run: RunId) -> Option<&mut JobStatus> {
        self.model.job_mut().filter(|job| job.run == run)
    }

    fn activate(&mut self) {
        if self.model.state() == JobState::ConfirmDelete {
            return;
        }
        let action = self.model.selected();
        if !self.model.is_enabled(action) {
            self.model
                .set_notice(Notice::info("A download is already running."));
            return;
        }
        match action {
            MenuAction::DownloadLatest => self.request_download(),
            MenuAction::CheckStatus => self.report_status(),
        }
    }

    fn request_download(&mut self) {
        let config = match (self.ports.load_config)() {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "configuration incomplete");
                self.model.set_notice(Notice::error(e.to_string()));
                return;
            }
        };
        let target_exists = self.ports.workspace.needs_confirmation(&config.target);
        let t = transition(
            self.model.state(),
            LifecycleEvent::DownloadSelected { target_exists },
        );
        self.commit(t, Some(config));
    }

    fn confirm(&mut self) {
        if self.model.state() != JobState::ConfirmDelete {
            return;
        }
        let config = match self.pending.take() {
            Some(config) => config,
            None => match (self.ports.load_config)() {
                Ok(config) => config,
                Err(e) => {
                    self.model.set_notice(Notice::error(e.to_string()));
                    return;
                }
            },
        };
        self.commit(
            transition(self.model.state(), LifecycleEvent::Confirm),
            Some(config),
        );
    }

    fn step(&mut self, event: LifecycleEvent) {
        let t = transition(self.model.state(), event);
        self.commit(t, None);
    }

    fn commit(&mut self, t: Transition, config: Option<Config>) {
        let from = self.model.state();
        if !t.changes(from) {
            return;
        }

        match t.effect {
            None => {}
            Some(Effect::StopTimer) => {
                self.model.timer_mut().stop();
                if let Some(ticker) = self.ticker.take() {
                    ticker.abort();
                }
                let took = self.model.timer().display();
                self.model
                    .set_notice(Notice::info(format!("Download complete! ({took})")));
            }
            Some(Effect::Launch) => {
                let Some(cfg) = config.as_ref() else { return };
                if let Err(e) = self.launch(cfg) {
                    self.report_launch_failure(&e);
                    return;
                }
            }
            Some(Effect::DeleteThenLaunch) => {
                let Some(cfg) = config.as_ref() else { return };
                if let Err(e) = self.ports.workspace.delete(&cfg.target) {
                    tracing::error!(error = %e, "cannot remove existing snapshot");
                    self.model.set_notice(Notice::error(e.to_string()));
                    self.pending = config;
                    return;
                }
                self.model.set_pending_target(None);
                if let Err(e) = self.launch(cfg) {
                    self.report_launch_failure(&e);
                    // The stale target is gone; start over from the menu.
                    self.enter(from, JobState::Idle);
                    return;
                }
            }
        }

        if t.next == JobState::ConfirmDelete {
            self.model
                .set_pending_target(config.as_ref().map(|c| c.target.clone()));
            self.model.clear_notice();
            self.pending = config;
        } else if from == JobState::ConfirmDelete {
            self.model.set_pending_target(None);
            self.pending = None;
        }
        self.enter(from, t.next);
    }

    fn enter(&mut self, from: JobState, next: JobState) {
        if from != next {
            tracing::info!(?from, to = ?next, "lifecycle transition");
        }
        self.model.set_state(next);
    }

    fn launch(&mut self, config: &Config) -> Result<(), LaunchError> {
        let job = SupervisedJob::pg_dump(config)?;
        let handle = self.ports.supervisor.launch(&job)?;

        self.last_run += 1;
        let run = self.last_run;
        self.model.set_job(JobStatus {
            run,
            session: handle.session.clone(),
            pid: None,
            watched: true,
        });
        self.model.clear_notice();
        self.model.timer_mut().start();

        spawn_watcher(
            &self.runtime,
            self.ports.supervisor.clone(),
            handle.session,
            run,
            self.timing,
            self.event_tx.clone(),
        );
        if let Some(old) = self.ticker.take() {
            old.abort();
        }
        self.ticker = Some(spawn_ticker(
            &self.runtime,
            self.timing.tick_interval,
            self.event_tx.clone(),
        ));
        Ok(())
    }

    fn report_launch_failure(&mut self, e: &LaunchError) {
        tracing::error!(error = %e, "failed to start the download");
        self.model
            .set_notice(Notice::error(format!("Failed to start the download: {e}")));
    }

    fn report_status(&mut self) {
        let state = self.model.state();
        let text = match self.model.job() {
            None => "No download has been started yet.".to_string(),
            Some(job) => {
                let hint = SupervisedJob::attach_hint(&job.session);
                match (state, job.pid, job.watched) {
                    (JobState::Completed, _, _) => format!(
                        "Last download finished after {}.",
                        self.model.timer().display()
                    ),
                    (_, Some(pid), _) => {
                        let liveness = if self.ports.supervisor.is_alive(pid) {
                            "running"
                        } else {
                            "exiting"
                        };
                        format!("Download {liveness} as pid {pid} in session {}. Attach with `{hint}`", job.session)
                    }
                    (_, None, true) => format!(
                        "Download starting in session {}; waiting for its process id.",
                        job.session
                    ),
                    (_, None, false) => format!(
                        "Download process id unknown; completion will not be detected. Attach with `{hint}`"
                    ),
                }
            }
        };
        self.model.set_notice(Notice::info(text));
    }
}
