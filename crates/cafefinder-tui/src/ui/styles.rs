use ratatui::style::{Color, Modifier, Style};

// Color palette
pub const PRIMARY: Color = Color::Rgb(160, 110, 70);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const FAVORITE: Color = Color::Rgb(208, 72, 96);
pub const USER: Color = Color::Rgb(64, 128, 192);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const GRID: Color = Color::Rgb(56, 56, 64);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn rating_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

// Map markers
pub fn cafe_marker_style(focused: bool) -> Style {
    let style = Style::default().fg(PRIMARY);
    if focused {
        style.bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

pub fn favorite_style() -> Style {
    Style::default().fg(FAVORITE).add_modifier(Modifier::BOLD)
}

pub fn user_marker_style() -> Style {
    Style::default().fg(USER).add_modifier(Modifier::BOLD)
}

pub fn alert_style() -> Style {
    Style::default().fg(SECONDARY).add_modifier(Modifier::BOLD)
}
