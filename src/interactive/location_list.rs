//! Table of the visible locations

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use super::app::App;
use crate::render::LocationRecord;
use crate::utils::truncate_str;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("Name"),
        Cell::from("Rate"),
        Cell::from("Distance"),
        Cell::from("Added"),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD))
    .height(1);

    let records = &app.dashboard.records;
    let rows: Vec<Row> = if records.is_empty() {
        let hint = if app.ctrl.locations().is_empty() {
            "No locations yet, press 'a' to add one"
        } else {
            "Nothing matches the filter"
        };
        vec![Row::new(vec![Cell::from(""), Cell::from(hint)])
            .style(Style::default().fg(Color::Gray))]
    } else {
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| record_row(record, idx == app.cursor))
            .collect()
    };

    let widths = [
        Constraint::Length(2),
        Constraint::Min(16),
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Length(18),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(list_title(app))
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(table, area);
}

fn record_row(record: &LocationRecord, under_cursor: bool) -> Row<'static> {
    let marker = if record.active { "▶" } else { "" };
    let distance = record
        .distance
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut style = Style::default().fg(Color::White);
    if record.active {
        style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }
    if under_cursor {
        style = style.bg(Color::DarkGray);
    }

    Row::new(vec![
        Cell::from(marker),
        Cell::from(truncate_str(&record.name, 28)),
        Cell::from(record.stars.clone()).style(Style::default().fg(Color::Yellow)),
        Cell::from(distance),
        Cell::from(record.created_ago.clone()),
    ])
    .style(style)
}

/// " Locations (3/5) - sort: rate ↓ - filter: "par" ≥ 2 "
fn list_title(app: &App) -> String {
    let mut title = format!(
        " Locations ({}/{})",
        app.dashboard.records.len(),
        app.ctrl.locations().len()
    );

    if let Some(spec) = app.ctrl.view().sort_by() {
        title.push_str(&format!(" - sort: {} {}", spec.field.label(), spec.direction.arrow()));
    }

    let filter = &app.dashboard.filter_by;
    if !filter.txt.is_empty() {
        title.push_str(&format!(" - filter: \"{}\"", filter.txt));
    }
    if filter.min_rate > 0.0 {
        title.push_str(&format!(" - min rate: {}", filter.min_rate));
    }
    title.push(' ');
    title
}
