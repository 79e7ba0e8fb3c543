//! Selected location panel

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::app::App;
use crate::distance;

fn field(label: &'static str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            label,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, Style::default().fg(color)),
    ])
}

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let lines = match app.selected() {
        Some((loc, record)) => {
            let mut lines = vec![
                field("Name: ", loc.name.clone(), Color::White),
                field("Address: ", loc.geo.address.clone(), Color::White),
                field(
                    "Coordinates: ",
                    loc.geo.lat_lng().format_coordinates(),
                    Color::Gray,
                ),
                field("Rate: ", loc.stars(), Color::Yellow),
            ];

            if let Some(pos) = app.ctrl.view().user_position() {
                let d = distance::measure(loc.geo.lat_lng(), pos, app.ctrl.unit());
                lines.push(field("Distance: ", d.to_string(), Color::Green));
            }
            if let Some(record) = record {
                let mut ages = format!("added {}", record.created_ago);
                if let Some(updated) = &record.updated_ago {
                    ages.push_str(&format!(", updated {}", updated));
                }
                lines.push(field("History: ", ages, Color::Gray));
            } else {
                lines.push(Line::from(Span::styled(
                    "Hidden by the current filter",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            if let Ok(url) = app.ctrl.share_url(&app.share_base_url) {
                lines.push(field("Link: ", url.to_string(), Color::Blue));
            }
            lines
        }
        None => vec![
            Line::from(Span::styled(
                "No location selected",
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter on a row to select it",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Location ")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}
