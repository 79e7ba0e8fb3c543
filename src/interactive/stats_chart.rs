//! Rate and recency distribution charts
//!
//! Each chart is drawn as one proportional bar, one colored run per slice,
//! followed by its legend.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::app::App;
use super::utils::hex_color;
use crate::segments::PieChart;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let total = app.dashboard.rate_stats.total();
    render_chart(f, " By Rate ", &app.dashboard.rate_chart, total, chunks[0]);
    render_chart(f, " By Recency ", &app.dashboard.recency_chart, total, chunks[1]);
}

fn render_chart(f: &mut Frame, title: &str, chart: &PieChart, total: usize, area: Rect) {
    let bar_width = area.width.saturating_sub(4) as usize;
    let mut lines = Vec::new();

    if chart.is_empty() {
        lines.push(Line::from(Span::styled(
            "No locations to chart",
            Style::default().fg(Color::Gray),
        )));
    } else {
        lines.push(bar_line(chart, bar_width));
        lines.push(Line::from(""));
        for entry in &chart.legend {
            let color = hex_color(entry.color);
            lines.push(Line::from(vec![
                Span::styled("■ ", Style::default().fg(color)),
                Span::styled(format!("{:10}", entry.label), Style::default().fg(Color::White)),
                Span::styled(
                    format!(" {} ({}%)", entry.count, entry.percent),
                    Style::default().fg(color),
                ),
            ]));
        }
        lines.push(Line::from(vec![
            Span::styled("Total: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                total.to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(paragraph, area);
}

/// Scale slice boundaries to `width` cells; boundaries are rounded so the
/// runs always add up to the full width
fn bar_line(chart: &PieChart, width: usize) -> Line<'static> {
    let cell = |percent: u32| (percent as usize * width + 50) / 100;
    let spans = chart
        .spans()
        .into_iter()
        .map(|slice| {
            let run = cell(slice.to).saturating_sub(cell(slice.from));
            Span::styled("█".repeat(run), Style::default().fg(hex_color(slice.color)))
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}
