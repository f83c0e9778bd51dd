use ratatui::style::{Color, Modifier, Style};

/// Styles used by the view. Passed explicitly to every drawing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub heading: Style,
    pub text: Style,
    pub selected: Style,
    pub disabled: Style,
    pub highlight: Style,
    pub success: Style,
    pub danger: Style,
}

impl Theme {
    /// 256-color palette of the stage menu.
    pub fn stage() -> Self {
        let bold = |c: u8| Style::default().fg(Color::Indexed(c)).add_modifier(Modifier::BOLD);
        Self {
            heading: bold(255),
            text: Style::default().fg(Color::Indexed(255)),
            selected: bold(39),
            disabled: Style::default().fg(Color::DarkGray),
            highlight: bold(205),
            success: bold(46),
            danger: bold(196),
        }
    }

    /// No colors at all, for terminals that ask for it.
    pub fn plain() -> Self {
        Self {
            heading: Style::default().add_modifier(Modifier::BOLD),
            text: Style::default(),
            selected: Style::default().add_modifier(Modifier::REVERSED),
            disabled: Style::default().add_modifier(Modifier::DIM),
            highlight: Style::default().add_modifier(Modifier::BOLD),
            success: Style::default(),
            danger: Style::default().add_modifier(Modifier::BOLD),
        }
    }

    /// Honors the `NO_COLOR` convention.
    pub fn from_env() -> Self {
        match std::env::var_os("NO_COLOR") {
            Some(v) if !v.is_empty() => Self::plain(),
            _ => Self::stage(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::stage()
    }
}
