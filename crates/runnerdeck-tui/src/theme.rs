use ratatui::style::{Color, Modifier, Style};
use runnerdeck_core::RunnerStatus;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);
pub const ERROR_STYLE: Style = Style::new()
    .fg(Color::Rgb(254, 128, 25))
    .add_modifier(Modifier::BOLD);
pub const MUTED_STYLE: Style = Style::new().fg(Color::Rgb(146, 131, 116));

pub fn zebra_row_style(index: usize) -> Style {
    let bg = if index % 2 == 0 {
        Color::Rgb(18, 20, 26)
    } else {
        Color::Rgb(24, 27, 34)
    };
    Style::new().bg(bg)
}

pub mod icons {
    pub const IDLE: &str = "o";
    pub const ACTIVE: &str = ">";
    pub const OFFLINE: &str = "x";
}

pub fn status_icon(status: RunnerStatus) -> &'static str {
    match status {
        RunnerStatus::Idle => icons::IDLE,
        RunnerStatus::Active => icons::ACTIVE,
        RunnerStatus::Offline => icons::OFFLINE,
    }
}

pub fn status_color(status: RunnerStatus) -> Color {
    match status {
        RunnerStatus::Idle => Color::Rgb(131, 165, 152),
        RunnerStatus::Active => Color::Rgb(184, 187, 38),
        RunnerStatus::Offline => Color::Rgb(146, 131, 116),
    }
}
