//! Add-location form with a context panel for the focused field

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_input::Input;

use super::app::App;
use super::form::FormField;
use crate::location::{stars, LatLng, MAX_RATE, MIN_RATE};

/// Render the form editor
pub fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let Some(form) = &app.form else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "Tab: Next | Shift+Tab: Prev | ←→: Move cursor | Home/End | Enter: Save | Esc: Cancel",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
    ];

    for field in FormField::ALL {
        let is_current = form.current_field == field;

        let label_style = if is_current {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let value_style = if is_current {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{:18}", field.label()), label_style),
            Span::raw(": "),
            Span::styled(display_value(form.input(field), is_current), value_style),
        ]));
    }

    lines.push(Line::from(""));

    let hint = match form.current_field {
        FormField::Name => "Optional, a blank name is saved as a default",
        FormField::Place => "An address to look up, or coordinates such as 32.08, 34.78",
        FormField::Rate => "A whole number from 1 to 5",
    };
    lines.push(Line::from(Span::styled(
        format!("💡 {}", hint),
        Style::default().fg(Color::Blue),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Add Location ")
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(paragraph, area);
}

/// Field value with a block cursor when focused
fn display_value(input: &Input, is_current: bool) -> String {
    let value = input.value();
    if is_current {
        let mut display: String = value.chars().take(input.cursor()).collect();
        display.push('█');
        display.extend(value.chars().skip(input.cursor()));
        display
    } else if value.is_empty() {
        "<empty>".to_string()
    } else {
        value.to_string()
    }
}

/// Render the right panel for the focused field
pub fn render_context_panel(f: &mut Frame, app: &App, area: Rect) {
    let Some(form) = &app.form else {
        return;
    };

    let (title, lines) = match form.current_field {
        FormField::Rate => (" Rate ", rate_picker_lines(form.rate.value())),
        FormField::Place => (" Place ", place_lines(form.place.value())),
        FormField::Name => (" Name ", name_lines(app)),
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn rate_picker_lines(raw: &str) -> Vec<Line<'static>> {
    let current = raw.trim().parse::<u8>().ok();
    let mut lines = vec![Line::from("")];

    for rate in (MIN_RATE..=MAX_RATE).rev() {
        let style = if current == Some(rate) {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(
            format!("  {}  {}", rate, stars(rate)),
            style,
        )));
    }

    if current.map_or(true, |r| !(MIN_RATE..=MAX_RATE).contains(&r)) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Out of range, will be rejected",
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn place_lines(raw: &str) -> Vec<Line<'static>> {
    let raw = raw.trim();
    let (text, color) = if raw.is_empty() {
        ("Required".to_string(), Color::Gray)
    } else {
        match raw.parse::<LatLng>() {
            Ok(pos) => (format!("Coordinates: {}", pos.format_coordinates()), Color::Green),
            Err(_) => (format!("Will look up \"{}\"", raw), Color::White),
        }
    };

    vec![
        Line::from(""),
        Line::from(Span::styled(text, Style::default().fg(color))),
    ]
}

fn name_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "Already saved",
        Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Cyan),
    ))];
    lines.push(Line::from(""));

    let locations = app.ctrl.locations();
    if locations.is_empty() {
        lines.push(Line::from(Span::styled(
            "No locations yet",
            Style::default().fg(Color::Gray),
        )));
    }
    for loc in locations.iter().rev().take(9) {
        lines.push(Line::from(Span::styled(
            format!("• {}", loc.name),
            Style::default().fg(Color::White),
        )));
    }
    lines
}
