use crate::model::JobState;
use crate::orchestrator::UiCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Translate a key press into a command for the current state.
///
/// While a deletion is pending only `y`/`n`, cursor keys and Ctrl-C are live.
pub(crate) fn command_for(state: JobState, key: &KeyEvent) -> Option<UiCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(UiCommand::Quit);
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(UiCommand::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(UiCommand::MoveDown),
        KeyCode::Char('y') | KeyCode::Char('Y') if state == JobState::ConfirmDelete => {
            Some(UiCommand::Confirm)
        }
        KeyCode::Char('n') | KeyCode::Char('N') if state == JobState::ConfirmDelete => {
            Some(UiCommand::Decline)
        }
        _ if state == JobState::ConfirmDelete => None,
        KeyCode::Char('q') => Some(UiCommand::Quit),
        KeyCode::Enter | KeyCode::Char(' ') => Some(UiCommand::Activate),
        _ => None,
    }
}
