use super::theme::Theme;
use crate::model::JobState;
use ratatui::text::{Line, Span};

/// Key hints shown under the menu.
pub fn help_lines(state: JobState, theme: &Theme) -> Vec<Line<'static>> {
    if state == JobState::ConfirmDelete {
        return vec![Line::from(vec![
            Span::styled("y", theme.success),
            Span::styled(" delete and download   ", theme.text),
            Span::styled("n", theme.danger),
            Span::styled(" keep it   ", theme.text),
            Span::styled("Ctrl-C", theme.selected),
            Span::styled(" quit", theme.text),
        ])];
    }
    vec![
        Line::from(Span::styled(
            "Use the arrow keys (or j/k) to navigate. Press Enter to select.",
            theme.text,
        )),
        Line::from(Span::styled("Press q or Ctrl-C to exit", theme.selected)),
    ]
}
