//! Map canvas.
//!
//! The camera center is projected into Web Mercator world pixels and the
//! canvas spans a fixed number of world pixels per terminal cell, so the map
//! scale follows the camera zoom. Tile boundaries are drawn as a faint grid;
//! raster tiles are not painted.

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Rect},
    symbols::Marker as CanvasMarker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Clear, Paragraph,
    },
    Frame,
};

use cafefinder_core::map::tiles::{project, TILE_SIZE};
use cafefinder_core::map::MapView;
use cafefinder_core::CafeId;

use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_coordinate, truncate_string};

/// World pixels covered by one terminal column. Rows are twice as tall.
const PX_PER_COLUMN: f64 = 16.0;
const PX_PER_ROW: f64 = 32.0;

const CAFE_SYMBOL: &str = "☕";
const FAVORITE_SYMBOL: &str = "♥";
const USER_SYMBOL: &str = "◉";

const POPUP_WIDTH: u16 = 36;

/// Visible world-pixel window around a center.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Viewport {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Viewport {
    fn around(center: (f64, f64), area: Rect) -> Self {
        let half_w = f64::from(area.width) * PX_PER_COLUMN / 2.0;
        let half_h = f64::from(area.height) * PX_PER_ROW / 2.0;
        Self {
            left: center.0 - half_w,
            right: center.0 + half_w,
            top: center.1 - half_h,
            bottom: center.1 + half_h,
        }
    }

    fn contains(&self, (x, y): (f64, f64)) -> bool {
        (self.left..=self.right).contains(&x) && (self.top..=self.bottom).contains(&y)
    }

    /// Tile boundary offsets along each axis at fractional `zoom`.
    fn grid(&self, zoom: f64) -> (Vec<f64>, Vec<f64>) {
        let step = TILE_SIZE * 2f64.powf(zoom - zoom.floor());
        let lines = |from: f64, to: f64| {
            let first = (from / step).ceil() as i64;
            let last = (to / step).floor() as i64;
            (first..=last).map(|k| k as f64 * step).collect::<Vec<_>>()
        };
        (lines(self.left, self.right), lines(self.top, self.bottom))
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let now = Instant::now();
    let map = app.controller.map();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(!app.controller.is_favorites_panel_open()))
        .title_style(styles::muted_style());

    if let Some(layer) = map.tile_layer() {
        block = block.title_bottom(
            Line::from(Span::styled(format!(" {} ", layer.attribution), styles::muted_style()))
                .alignment(Alignment::Right),
        );
    }

    let Some(camera) = map.camera_at(now) else {
        let waiting = Paragraph::new(Line::from(Span::styled(
            "Waiting for location...",
            styles::muted_style(),
        )))
        .alignment(Alignment::Center)
        .block(block.title(" Map "));
        frame.render_widget(waiting, area);
        return;
    };

    let title = match map.center_tile(now) {
        Some(tile) => format!(
            " {} · z{:.0} · tile {}/{}/{} ",
            format_coordinate(camera.center),
            camera.zoom,
            tile.z,
            tile.x,
            tile.y
        ),
        None => format!(" {} ", format_coordinate(camera.center)),
    };
    let block = block.title(title);
    let inner = block.inner(area);

    let center = project(camera.center, camera.zoom);
    let viewport = Viewport::around(center, inner);
    let (columns, rows) = viewport.grid(camera.zoom);

    let focused: Option<&CafeId> = app
        .marker_focus
        .and_then(|i| app.controller.cafes().get(i))
        .map(|c| &c.id);

    // Canvas y grows upward, world y grows downward; negate world y.
    let mut labels: Vec<(f64, f64, Span<'static>)> = Vec::new();
    for marker in map.markers() {
        let point = project(marker.position(), camera.zoom);
        if !viewport.contains(point) {
            continue;
        }
        let span = if marker.is_favorite() {
            Span::styled(FAVORITE_SYMBOL, styles::favorite_style())
        } else {
            let is_focused = focused == Some(&marker.cafe.id);
            Span::styled(CAFE_SYMBOL, styles::cafe_marker_style(is_focused))
        };
        labels.push((point.0, -point.1, span));
    }
    if let Some(user) = map.user_marker() {
        let point = project(user, camera.zoom);
        if viewport.contains(point) {
            labels.push((point.0, -point.1, Span::styled(USER_SYMBOL, styles::user_marker_style())));
        }
    }

    let canvas = Canvas::default()
        .block(block)
        .marker(CanvasMarker::Braille)
        .x_bounds([viewport.left, viewport.right])
        .y_bounds([-viewport.bottom, -viewport.top])
        .paint(|ctx| {
            for x in &columns {
                ctx.draw(&CanvasLine::new(*x, -viewport.top, *x, -viewport.bottom, styles::GRID));
            }
            for y in &rows {
                ctx.draw(&CanvasLine::new(viewport.left, -*y, viewport.right, -*y, styles::GRID));
            }
            ctx.layer();
            for (x, y, span) in &labels {
                ctx.print(*x, *y, span.clone());
            }
        });
    frame.render_widget(canvas, area);

    render_popup(frame, map, inner);
}

/// The open popup, anchored to the bottom-left of the map.
fn render_popup(frame: &mut Frame, map: &MapView, inner: Rect) {
    let Some(popup) = map.popup() else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            truncate_string(&popup.title, usize::from(POPUP_WIDTH - 4)),
            styles::title_style(),
        )),
        Line::from(Span::styled(popup.rating_line.clone(), styles::rating_style())),
    ];

    if let Some(hours) = map
        .marker(&popup.cafe_id)
        .and_then(|m| m.cafe.tag("opening_hours"))
    {
        lines.push(Line::from(Span::styled(
            truncate_string(hours, usize::from(POPUP_WIDTH - 4)),
            styles::muted_style(),
        )));
    }

    let label_style = if popup.is_favorite {
        styles::favorite_style()
    } else {
        styles::help_desc_style()
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[a] ", styles::help_key_style()),
        Span::styled(popup.favorite_label, label_style),
    ]));

    let height = lines.len() as u16 + 2;
    if inner.width < POPUP_WIDTH || inner.height < height {
        return;
    }
    let area = Rect::new(inner.x + 1, inner.bottom() - height, POPUP_WIDTH, height);

    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_scales_with_area() {
        let viewport = Viewport::around((1000.0, 2000.0), Rect::new(0, 0, 10, 4));
        assert_eq!(viewport.left, 920.0);
        assert_eq!(viewport.right, 1080.0);
        assert_eq!(viewport.top, 1936.0);
        assert_eq!(viewport.bottom, 2064.0);
        assert!(viewport.contains((1000.0, 2000.0)));
        assert!(!viewport.contains((1100.0, 2000.0)));
    }

    #[test]
    fn test_grid_lines_at_tile_edges() {
        let viewport = Viewport::around((512.0, 512.0), Rect::new(0, 0, 40, 20));
        let (columns, rows) = viewport.grid(3.0);
        // 640px wide window centered on 512 spans 192..832
        assert_eq!(columns, vec![256.0, 512.0, 768.0]);
        // 640px tall window spans 192..832 as well
        assert_eq!(rows, vec![256.0, 512.0, 768.0]);
    }

    #[test]
    fn test_grid_step_grows_between_zoom_levels() {
        let viewport = Viewport::around((0.0, 0.0), Rect::new(0, 0, 80, 2));
        let (columns, _) = viewport.grid(3.5);
        let step = TILE_SIZE * 2f64.sqrt();
        assert!(columns.iter().all(|x| (x / step - (x / step).round()).abs() < 1e-9));
        assert!(columns.contains(&0.0));
    }
}
