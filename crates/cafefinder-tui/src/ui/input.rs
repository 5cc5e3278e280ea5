//! Keyboard and mouse handling for the TUI.
//!
//! Overlays take input in stacking order: the alert first, then help, the
//! quit confirmation and the favorites panel, and finally the map.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::debug;

use crate::app::{App, AppState};
use crate::ui::favorites::is_inside;
use crate::ui::render::favorites_modal_area;

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // The alert blocks everything until acknowledged
    if app.controller.alert().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.controller.acknowledge_alert();
        }
        return false;
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    if app.controller.is_favorites_panel_open() {
        handle_favorites_input(app, key);
        return false;
    }

    handle_map_input(app, key);
    false
}

fn handle_favorites_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_prev_favorite(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_favorite(),
        KeyCode::Char('v') | KeyCode::Enter => app.view_selected_favorite(),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_selected_favorite(),
        KeyCode::Esc | KeyCode::Char('f') => app.close_favorites(),
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
}

fn handle_map_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.suggest_random_cafe(),
        KeyCode::Char('f') => app.open_favorites(),
        KeyCode::Tab => app.focus_next_marker(),
        KeyCode::BackTab => app.focus_prev_marker(),
        KeyCode::Char('a') | KeyCode::Char(' ') => {
            if let Some(outcome) = app.toggle_popup_favorite() {
                debug!(?outcome, "Toggled favorite from popup");
            }
        }
        KeyCode::Esc => app.close_popup(),
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
}

/// Handle mouse input. A click on the backdrop closes the favorites panel.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent, frame_area: Rect) {
    if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
        return;
    }
    if app.controller.alert().is_some() || !app.controller.is_favorites_panel_open() {
        return;
    }

    if !is_inside(favorites_modal_area(frame_area), mouse.column, mouse.row) {
        app.close_favorites();
    }
}
