use ratatui::style::{Color, Modifier, Style};

pub const HEADER_BG: Color = Color::Blue;
pub const HEADER_FG: Color = Color::White;
pub const STATUS_FG: Color = Color::DarkGray;
pub const INPUT_FG: Color = Color::Yellow;
pub const BORDER_FG: Color = Color::DarkGray;
pub const USER_FG: Color = Color::Green;
pub const ASSISTANT_FG: Color = Color::Cyan;
pub const ERROR_FG: Color = Color::Red;

pub fn header_style() -> Style {
    Style::default().bg(HEADER_BG).fg(HEADER_FG)
}

pub fn status_style() -> Style {
    Style::default().fg(STATUS_FG)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR_FG)
}

pub fn input_style() -> Style {
    Style::default().fg(INPUT_FG)
}

pub fn border_style() -> Style {
    Style::default().fg(BORDER_FG)
}

pub fn user_style() -> Style {
    Style::default().fg(USER_FG).add_modifier(Modifier::BOLD)
}

pub fn assistant_style() -> Style {
    Style::default().fg(ASSISTANT_FG).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}
