use crate::config::TargetPath;
use crate::supervisor::{Pid, SessionId};
use crate::timer::ElapsedTimer;
use crossterm::event::KeyEvent;
use std::time::Duration;

/// Generation number of a launched job. Signals from older runs are ignored.
pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    ConfirmDelete,
    Downloading,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    DownloadLatest,
    CheckStatus,
}

impl MenuAction {
    pub fn label(self) -> &'static str {
        match self {
            MenuAction::DownloadLatest => "Download Latest",
            MenuAction::CheckStatus => "Check Download Status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-line message shown under the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// What the controller knows about the most recent launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub run: RunId,
    pub session: SessionId,
    pub pid: Option<Pid>,
    /// False once the watcher gave up resolving the pid.
    pub watched: bool,
}

/// Everything the render loop draws. Mutated only by `Controller`.
#[derive(Debug, Clone)]
pub struct MenuModel {
    actions: Vec<MenuAction>,
    cursor: usize,
    state: JobState,
    timer: ElapsedTimer,
    notice: Option<Notice>,
    pending_target: Option<TargetPath>,
    job: Option<JobStatus>,
}

impl MenuModel {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            actions: vec![MenuAction::DownloadLatest, MenuAction::CheckStatus],
            cursor: 0,
            state: JobState::Idle,
            timer: ElapsedTimer::new(tick_interval),
            notice: None,
            pending_target: None,
            job: None,
        }
    }

    pub fn actions(&self) -> &[MenuAction] {
        &self.actions
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> MenuAction {
        self.actions[self.cursor]
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn timer(&self) -> &ElapsedTimer {
        &self.timer
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn pending_target(&self) -> Option<&TargetPath> {
        self.pending_target.as_ref()
    }

    pub fn job(&self) -> Option<&JobStatus> {
        self.job.as_ref()
    }

    /// Starting a second download while one runs is not offered.
    pub fn is_enabled(&self, action: MenuAction) -> bool {
        !(action == MenuAction::DownloadLatest && self.state == JobState::Downloading)
    }

    pub(crate) fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub(crate) fn move_down(&mut self) {
        if self.cursor + 1 < self.actions.len() {
            self.cursor += 1;
        }
    }

    pub(crate) fn set_state(&mut self, state: JobState) {
        self.state = state;
    }

    pub(crate) fn timer_mut(&mut self) -> &mut ElapsedTimer {
        &mut self.timer
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub(crate) fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub(crate) fn set_pending_target(&mut self, target: Option<TargetPath>) {
        self.pending_target = target;
    }

    pub(crate) fn job_mut(&mut self) -> Option<&mut JobStatus> {
        self.job.as_mut()
    }

    pub(crate) fn set_job(&mut self, job: JobStatus) {
        self.job = Some(job);
    }
}

/// Everything the render loop can wake up for.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    PidResolved { run: RunId, pid: Pid },
    JobFinished { run: RunId },
    WatchAbandoned { run: RunId, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_stays_in_range() {
        let mut m = MenuModel::new(Duration::from_millis(100));
        let len = m.actions().len();
        for _ in 0..5 {
            m.move_up();
            assert!(m.cursor() < len);
        }
        assert_eq!(m.cursor(), 0);
        for _ in 0..5 {
            m.move_down();
            assert!(m.cursor() < len);
        }
        assert_eq!(m.cursor(), len - 1);
        m.move_up();
        assert_eq!(m.cursor(), len - 2);
    }

    #[test]
    fn download_disabled_only_while_downloading() {
        let mut m = MenuModel::new(Duration::from_millis(100));
        for state in [JobState::Idle, JobState::ConfirmDelete, JobState::Completed] {
            m.set_state(state);
            assert!(m.is_enabled(MenuAction::DownloadLatest));
        }
        m.set_state(JobState::Downloading);
        assert!(!m.is_enabled(MenuAction::DownloadLatest));
        assert!(m.is_enabled(MenuAction::CheckStatus));
    }
}
