//! Transition table of the download lifecycle.
//!
//! Pure: the controller feeds in facts it gathered (whether the target exists)
//! and executes the returned effect before committing the next state.

use crate::model::JobState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleEvent {
    DownloadSelected { target_exists: bool },
    Confirm,
    Decline,
    JobFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    Launch,
    DeleteThenLaunch,
    StopTimer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transition {
    pub next: JobState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn stay(state: JobState) -> Self {
        Self {
            next: state,
            effect: None,
        }
    }

    fn to(next: JobState) -> Self {
        Self { next, effect: None }
    }

    fn with(next: JobState, effect: Effect) -> Self {
        Self {
            next,
            effect: Some(effect),
        }
    }

    pub fn changes(&self, from: JobState) -> bool {
        self.next != from || self.effect.is_some()
    }
}

pub(crate) fn transition(state: JobState, event: LifecycleEvent) -> Transition {
    use JobState::*;
    use LifecycleEvent::*;

    match (state, event) {
        (Idle | Completed, DownloadSelected { target_exists: true }) => Transition::to(ConfirmDelete),
        (Idle | Completed, DownloadSelected { target_exists: false }) => {
            Transition::with(Downloading, Effect::Launch)
        }
        (ConfirmDelete, Confirm) => Transition::with(Downloading, Effect::DeleteThenLaunch),
        (ConfirmDelete, Decline) => Transition::to(Idle),
        (Downloading, JobFinished) => Transition::with(Completed, Effect::StopTimer),
        // A running download is never started twice.
        (state, _) => Transition::stay(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use JobState::*;
    use LifecycleEvent::*;

    const STATES: [JobState; 4] = [Idle, ConfirmDelete, Downloading, Completed];
    const EVENTS: [LifecycleEvent; 5] = [
        DownloadSelected {
            target_exists: true,
        },
        DownloadSelected {
            target_exists: false,
        },
        Confirm,
        Decline,
        JobFinished,
    ];

    #[test]
    fn table_matches_lifecycle() {
        let expected = |s: JobState, e: LifecycleEvent| -> Transition {
            match (s, e) {
                (Idle, DownloadSelected { target_exists: true })
                | (Completed, DownloadSelected { target_exists: true }) => Transition::to(ConfirmDelete),
                (Idle, DownloadSelected { target_exists: false })
                | (Completed, DownloadSelected { target_exists: false }) => {
                    Transition::with(Downloading, Effect::Launch)
                }
                (ConfirmDelete, Confirm) => {
                    Transition::with(Downloading, Effect::DeleteThenLaunch)
                }
                (ConfirmDelete, Decline) => Transition::to(Idle),
                (Downloading, JobFinished) => Transition::with(Completed, Effect::StopTimer),
                _ => Transition::stay(s),
            }
        };
        for s in STATES {
            for e in EVENTS {
                assert_eq!(transition(s, e), expected(s, e), "{s:?} + {e:?}");
            }
        }
    }

    #[test]
    fn downloading_ignores_new_download_requests() {
        for target_exists in [true, false] {
            let t = transition(Downloading, DownloadSelected { target_exists });
            assert!(!t.changes(Downloading));
        }
    }

    #[test]
    fn completion_only_leaves_downloading() {
        for s in STATES {
            let t = transition(s, JobFinished);
            if s == Downloading {
                assert_eq!(t.next, Completed);
            } else {
                assert!(!t.changes(s));
            }
        }
    }
}
