use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::render::favorites_modal_area;
use crate::ui::styles;
use crate::utils::{format_coordinate, format_distance};

pub fn render(frame: &mut Frame, app: &App) {
    let area = favorites_modal_area(frame.area());
    frame.render_widget(Clear, area);

    let favorites = app.controller.favorites().list();
    let block = Block::default()
        .title(format!(" ♥ Favorites ({}) ", favorites.len()))
        .title_style(styles::title_style())
        .title_bottom(Line::from(vec![
            Span::styled(" [v]", styles::help_key_style()),
            Span::styled("iew ", styles::muted_style()),
            Span::styled("[d]", styles::help_key_style()),
            Span::styled("elete ", styles::muted_style()),
            Span::styled("[Esc]", styles::help_key_style()),
            Span::styled(" close ", styles::muted_style()),
        ]))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if favorites.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(" No favorite cafés yet.", styles::list_item_style())),
            Line::from(""),
            Line::from(vec![
                Span::styled(" Open a café with ", styles::muted_style()),
                Span::styled("Tab", styles::help_key_style()),
                Span::styled(" and press ", styles::muted_style()),
                Span::styled("a", styles::help_key_style()),
                Span::styled(" to save it.", styles::muted_style()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let header = Row::new([Cell::from("Name"), Cell::from("Rating"), Cell::from("Where")])
        .style(styles::title_style())
        .height(1);

    let origin = app
        .controller
        .user_location()
        .or_else(|| app.controller.search_center());

    let rows: Vec<Row> = favorites
        .iter()
        .enumerate()
        .map(|(i, cafe)| {
            let style = if i == app.favorites_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let place = match origin {
                Some(origin) => format_distance(origin.distance_to(&cafe.position())),
                None => format_coordinate(cafe.position()),
            };
            Row::new(vec![
                Cell::from(cafe.name.as_str()),
                Cell::from(Span::styled(cafe.rating_display(), styles::rating_style())),
                Cell::from(place),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(8),
        Constraint::Length(18),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.favorites_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Whether a terminal cell lies on the panel rather than its backdrop.
pub fn is_inside(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
}
