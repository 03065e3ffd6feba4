use crate::models::ThemePreference;
use ratatui::style::{Color, Modifier, Style};

/// Palette for the active colour scheme.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub preference: ThemePreference,
    pub bg: Color,
    pub fg: Color,
    pub dim: Color,
    pub accent: Color,
    pub highlight: Color,
    pub selection_bg: Color,

    // Status colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    // Chart series
    pub temp_line: Color,
    pub humidity_line: Color,
    pub ph_line: Color,
    pub n_line: Color,
    pub p_line: Color,
    pub k_line: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            preference: ThemePreference::Dark,
            bg: Color::Reset,
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Green,
            highlight: Color::Cyan,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            temp_line: Color::Rgb(0x88, 0x84, 0xd8),
            humidity_line: Color::Rgb(0x82, 0xca, 0x9d),
            ph_line: Color::Rgb(0xff, 0xc6, 0x58),
            n_line: Color::Rgb(0xff, 0x73, 0x00),
            p_line: Color::Rgb(0x38, 0x79, 0x08),
            k_line: Color::Rgb(0x00, 0x88, 0xfe),
        }
    }

    pub fn light() -> Self {
        Self {
            preference: ThemePreference::Light,
            bg: Color::White,
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Rgb(0x16, 0xa3, 0x4a),
            highlight: Color::Blue,
            selection_bg: Color::Rgb(0xe5, 0xe7, 0xeb),
            success: Color::Rgb(0x16, 0xa3, 0x4a),
            warning: Color::Rgb(0xf5, 0x9e, 0x0b),
            error: Color::Rgb(0xdc, 0x26, 0x26),
            temp_line: Color::Rgb(0x88, 0x84, 0xd8),
            humidity_line: Color::Rgb(0x82, 0xca, 0x9d),
            ph_line: Color::Rgb(0xff, 0xc6, 0x58),
            n_line: Color::Rgb(0xff, 0x73, 0x00),
            p_line: Color::Rgb(0x38, 0x79, 0x08),
            k_line: Color::Rgb(0x00, 0x88, 0xfe),
        }
    }

    pub fn for_preference(preference: ThemePreference) -> Self {
        match preference {
            ThemePreference::Dark => Self::dark(),
            ThemePreference::Light => Self::light(),
        }
    }

    // Styles
    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header(&self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::BOLD)
    }

    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .fg(self.fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    /// Gauge zone: good above 70, fair above 40, poor otherwise.
    pub fn score_color(&self, score: u8) -> Color {
        if score > 70 {
            self.success
        } else if score > 40 {
            self.warning
        } else {
            self.error
        }
    }

    pub fn nav_key(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn nav_label(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.accent)
    }
}
