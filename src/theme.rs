//! Color palette and shared styles.

pub mod colors {
    use ratatui::style::Color;

    pub const BG_DARK: Color = Color::Rgb(24, 24, 32);
    pub const BG_PANEL: Color = Color::Rgb(32, 32, 44);

    pub const PRIMARY: Color = Color::Rgb(244, 154, 194);
    pub const PRIMARY_DIM: Color = Color::Rgb(140, 90, 115);

    pub const TEXT_PRIMARY: Color = Color::Rgb(230, 230, 235);
    pub const TEXT_SECONDARY: Color = Color::Rgb(190, 190, 200);
    pub const TEXT_MUTED: Color = Color::Rgb(120, 120, 135);

    pub const GREEN: Color = Color::Rgb(152, 210, 160);
    pub const YELLOW: Color = Color::Rgb(235, 205, 140);
    pub const RED: Color = Color::Rgb(235, 120, 120);
    pub const PEACH: Color = Color::Rgb(245, 180, 140);
}

pub mod styles {
    use super::colors;
    use ratatui::style::{Modifier, Style};

    pub fn user_name() -> Style {
        Style::default()
            .fg(colors::GREEN)
            .add_modifier(Modifier::BOLD)
    }

    pub fn assistant_name() -> Style {
        Style::default()
            .fg(colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_marker() -> Style {
        Style::default()
            .fg(colors::GREEN)
            .add_modifier(Modifier::BOLD)
    }

    pub fn cursor_row() -> Style {
        Style::default()
            .bg(colors::BG_PANEL)
            .add_modifier(Modifier::BOLD)
    }

    pub fn mode_browse() -> Style {
        Style::default()
            .fg(colors::BG_DARK)
            .bg(colors::TEXT_MUTED)
            .add_modifier(Modifier::BOLD)
    }

    pub fn mode_insert() -> Style {
        Style::default()
            .fg(colors::BG_DARK)
            .bg(colors::GREEN)
            .add_modifier(Modifier::BOLD)
    }

    pub fn mode_command() -> Style {
        Style::default()
            .fg(colors::BG_DARK)
            .bg(colors::YELLOW)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key_hint() -> Style {
        Style::default().fg(colors::TEXT_MUTED)
    }

    pub fn key_highlight() -> Style {
        Style::default()
            .fg(colors::PEACH)
            .add_modifier(Modifier::BOLD)
    }
}

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[(tick / 2) % SPINNER_FRAMES.len()]
}
