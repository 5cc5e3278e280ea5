use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use cafefinder_core::Lifecycle;

use crate::app::{App, AppState};
use crate::utils::format_distance;

use super::{favorites, map, styles};

const FAVORITES_WIDTH: u16 = 64;
const FAVORITES_HEIGHT: u16 = 18;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Min(8),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    map::render(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    if app.controller.is_loading() {
        render_loading_overlay(frame);
    }

    if app.controller.is_favorites_panel_open() {
        favorites::render(frame, app);
    }

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }

    if let Some(message) = app.controller.alert() {
        render_alert_overlay(frame, message);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  ☕ Café Finder";
    let help_hint = "[?] Help";
    let favorites = format!("♥ {}  ", app.controller.favorites().len());
    let used = title.chars().count() + favorites.chars().count() + help_hint.len() + 2;

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(favorites, styles::favorite_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

/// What the status bar shows when no message is visible.
fn idle_status(app: &App) -> String {
    match app.controller.lifecycle() {
        Lifecycle::Loading | Lifecycle::Locating => "Finding your location...".to_string(),
        Lifecycle::Located | Lifecycle::LocationFailed | Lifecycle::FetchingCafes => {
            "Loading cafés...".to_string()
        }
        Lifecycle::Ready => format!(
            "{} cafés within {}",
            app.controller.cafes().len(),
            format_distance(f64::from(app.config.search_radius_m))
        ),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[r]andom | [f]avorites | [Tab] cafés | [q]uit";

    let left_text = match app.controller.visible_status(Instant::now()) {
        Some(msg) => format!(" {} ", msg),
        None => format!(" {} ", idle_status(app)),
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

/// Where the favorites panel is drawn; also used for backdrop clicks.
pub fn favorites_modal_area(frame_area: Rect) -> Rect {
    centered_rect_fixed(FAVORITES_WIDTH, FAVORITES_HEIGHT, frame_area)
}

fn render_loading_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(36, 5, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Finding cafés near you...", styles::highlight_style())),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}

fn render_alert_overlay(frame: &mut Frame, message: &str) {
    let area = centered_rect_fixed(60, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), styles::alert_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", styles::muted_style()),
            Span::styled("[Enter]", styles::help_key_style()),
            Span::styled(" to continue", styles::muted_style()),
        ]),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 22, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  ☕ Café Finder", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Map", styles::highlight_style())),
        help_line("r", "Suggest a random café"),
        help_line("Tab/S-Tab", "Next/previous café"),
        help_line("a / Space", "Add or remove favorite"),
        help_line("Esc", "Close popup"),
        Line::from(""),
        Line::from(Span::styled(" Favorites", styles::highlight_style())),
        help_line("f", "Open favorites"),
        help_line("↑/↓", "Navigate list"),
        help_line("v / Enter", "Fly to favorite"),
        help_line("d / Del", "Remove favorite"),
        help_line("Esc / click", "Close panel"),
        Line::from(""),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed() {
        let area = centered_rect_fixed(40, 10, Rect::new(0, 0, 100, 50));
        assert_eq!(area, Rect::new(30, 20, 40, 10));
    }

    #[test]
    fn test_centered_rect_fixed_small_terminal() {
        let area = centered_rect_fixed(64, 18, Rect::new(0, 0, 50, 10));
        assert_eq!(area, Rect::new(0, 0, 50, 10));
    }

    #[test]
    fn test_favorites_modal_area_is_centered() {
        let area = favorites_modal_area(Rect::new(0, 0, 120, 40));
        assert_eq!(area.width, FAVORITES_WIDTH);
        assert_eq!(area.height, FAVORITES_HEIGHT);
        assert_eq!(area.x, 28);
        assert_eq!(area.y, 11);
    }
}
