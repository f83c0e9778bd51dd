use super::help::help_lines;
use super::theme::Theme;
use crate::model::{JobState, MenuModel, NoticeLevel};
use crate::supervisor::SupervisedJob;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

pub fn draw(area: Rect, f: &mut Frame, model: &MenuModel, theme: &Theme) {
    let p = Paragraph::new(frame_lines(model, theme)).wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

/// Text of one frame. Pure function of the model.
pub fn frame_lines(model: &MenuModel, theme: &Theme) -> Vec<Line<'static>> {
    let mut out = Vec::new();

    if model.state() == JobState::ConfirmDelete {
        out.push(Line::from(vec![
            Span::styled(
                "Are you sure you want to delete the existing folder? (",
                theme.text,
            ),
            Span::styled("y", theme.success),
            Span::styled("/", theme.text),
            Span::styled("n", theme.danger),
            Span::styled(")", theme.text),
        ]));
        if let Some(target) = model.pending_target() {
            out.push(Line::from(Span::styled(format!("  {target}"), theme.highlight)));
        }
        push_notice(&mut out, model, theme);
        out.push(Line::from(""));
        out.extend(help_lines(model.state(), theme));
        return out;
    }

    match model.state() {
        JobState::Downloading => {
            out.push(Line::from(Span::styled("Starting download!", theme.success)));
            out.push(Line::from(Span::styled(
                "This will take a while. Please wait...",
                theme.selected,
            )));
            if let Some(job) = model.job() {
                out.push(Line::from(Span::styled(
                    "You can check the status by running",
                    theme.selected,
                )));
                out.push(Line::from(Span::styled(
                    format!("`{}`", SupervisedJob::attach_hint(&job.session)),
                    theme.highlight,
                )));
            }
            out.push(Line::from(""));
        }
        JobState::Completed => {
            out.push(Line::from(Span::styled("Download complete!", theme.success)));
            out.push(Line::from(""));
        }
        JobState::Idle | JobState::ConfirmDelete => {}
    }

    if model.timer().has_started() {
        out.push(Line::from(vec![
            Span::styled("Elapsed: ", theme.text),
            Span::styled(model.timer().display(), elapsed_style(model, theme)),
        ]));
        out.push(Line::from(""));
    }

    out.push(Line::from(Span::styled("What should we do today?", theme.heading)));
    out.push(Line::from(""));

    for (i, action) in model.actions().iter().enumerate() {
        let is_cursor = i == model.cursor();
        let enabled = model.is_enabled(*action);
        let style = match (enabled, is_cursor) {
            (false, _) => theme.disabled,
            (true, true) => theme.selected,
            (true, false) => theme.text,
        };
        let mut spans = vec![
            Span::raw(if is_cursor { "> " } else { "  " }),
            Span::styled(action.label(), style),
        ];
        if !enabled {
            spans.push(Span::styled(" (running)", theme.disabled));
        }
        out.push(Line::from(spans));
    }

    push_notice(&mut out, model, theme);
    out.push(Line::from(""));
    out.extend(help_lines(model.state(), theme));
    out
}

/// A frozen clock reads as a final result.
fn elapsed_style(model: &MenuModel, theme: &Theme) -> Style {
    if model.timer().is_running() {
        theme.heading
    } else {
        theme.success
    }
}

fn push_notice(out: &mut Vec<Line<'static>>, model: &MenuModel, theme: &Theme) {
    if let Some(notice) = model.notice() {
        let style = match notice.level {
            NoticeLevel::Info => theme.selected,
            NoticeLevel::Error => theme.danger,
        };
        out.push(Line::from(""));
        out.push(Line::from(Span::styled(notice.text.clone(), style)));
    }
}
