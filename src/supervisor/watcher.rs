//! Background tasks feeding the render loop.
//!
//! Neither task touches the model: they only send `AppEvent`s. Both are
//! abandoned at process exit.

use super::{SessionId, Supervisor};
use crate::config::WatchTiming;
use crate::model::{AppEvent, RunId};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Poll the session's pane process until it is gone, then signal completion once.
pub(crate) fn spawn_watcher(
    runtime: &Handle,
    supervisor: Arc<dyn Supervisor>,
    session: SessionId,
    run: RunId,
    timing: WatchTiming,
    event_tx: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    runtime.spawn(watch(supervisor, session, run, timing, event_tx))
}

async fn watch(
    supervisor: Arc<dyn Supervisor>,
    session: SessionId,
    run: RunId,
    timing: WatchTiming,
    event_tx: UnboundedSender<AppEvent>,
) {
    // tmux needs a moment before the pane reports a real pid.
    tokio::time::sleep(timing.grace).await;

    let query = supervisor.clone();
    let target = session.clone();
    let resolved = tokio::task::spawn_blocking(move || query.resolve_pid(&target)).await;
    let pid = match resolved {
        Ok(Ok(pid)) => pid,
        Ok(Err(e)) => {
            tracing::warn!(%session, error = %e, "cannot resolve job pid; completion will not be detected");
            let _ = event_tx.send(AppEvent::WatchAbandoned {
                run,
                reason: e.to_string(),
            });
            return;
        }
        Err(e) => {
            tracing::warn!(%session, error = %e, "pid resolution task failed");
            let _ = event_tx.send(AppEvent::WatchAbandoned {
                run,
                reason: e.to_string(),
            });
            return;
        }
    };

    tracing::info!(%session, %pid, "watching job process");
    let _ = event_tx.send(AppEvent::PidResolved { run, pid });

    loop {
        if !supervisor.is_alive(pid) {
            tracing::info!(%session, %pid, "job process exited");
            let _ = event_tx.send(AppEvent::JobFinished { run });
            return;
        }
        tokio::time::sleep(timing.poll_interval).await;
    }
}

/// Emit `AppEvent::Tick` every `interval` until aborted or the loop hangs up.
pub(crate) fn spawn_ticker(
    runtime: &Handle,
    interval: Duration,
    event_tx: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        let mut ticks = tokio::time::interval(interval);
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticks.tick().await;
            if event_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LaunchError, ResolutionError};
    use crate::supervisor::{LaunchHandle, Pid, SupervisedJob};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    /// Reports the job alive for `alive_polls` probes.
    struct CountdownSupervisor {
        alive_polls: usize,
        probes: AtomicUsize,
        resolvable: bool,
    }

    impl Supervisor for CountdownSupervisor {
        fn launch(&self, job: &SupervisedJob) -> Result<LaunchHandle, LaunchError> {
            Ok(LaunchHandle {
                session: job.session.clone(),
            })
        }

        fn resolve_pid(&self, session: &SessionId) -> Result<Pid, ResolutionError> {
            if self.resolvable {
                Ok(Pid(4242))
            } else {
                Err(ResolutionError::SessionGone {
                    session: session.to_string(),
                    stderr: "can't find session".into(),
                })
            }
        }

        fn is_alive(&self, _pid: Pid) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst) < self.alive_polls
        }
    }

    fn fast() -> WatchTiming {
        WatchTiming {
            grace: Duration::from_millis(5),
            poll_interval: Duration::from_millis(5),
            tick_interval: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn completes_only_after_probe_reports_gone() {
        let sup = Arc::new(CountdownSupervisor {
            alive_polls: 3,
            probes: AtomicUsize::new(0),
            resolvable: true,
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_watcher(
            &Handle::current(),
            sup.clone(),
            SessionId::new("s"),
            7,
            fast(),
            tx,
        );
        handle.await.unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::PidResolved { run: 7, pid: Pid(4242) })
        ));
        assert!(matches!(rx.recv().await, Some(AppEvent::JobFinished { run: 7 })));
        assert!(rx.recv().await.is_none());
        // three alive observations, then exactly one dead one
        assert_eq!(sup.probes.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn unresolvable_session_abandons_watch() {
        let sup = Arc::new(CountdownSupervisor {
            alive_polls: 0,
            probes: AtomicUsize::new(0),
            resolvable: false,
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_watcher(&Handle::current(), sup.clone(), SessionId::new("s"), 1, fast(), tx)
            .await
            .unwrap();

        match rx.recv().await {
            Some(AppEvent::WatchAbandoned { run, reason }) => {
                assert_eq!(run, 1);
                assert!(reason.contains("can't find session"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(rx.recv().await.is_none());
        assert_eq!(sup.probes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ticker_stops_when_receiver_drops() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_ticker(&Handle::current(), Duration::from_millis(1), tx);
        assert!(matches!(rx.recv().await, Some(AppEvent::Tick)));
        assert!(matches!(rx.recv().await, Some(AppEvent::Tick)));
        drop(rx);
        handle.await.unwrap();
    }
}
