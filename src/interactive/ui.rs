//! Main UI rendering logic

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::app::{App, AppMode};
use super::utils::{get_message_style, hex_color};
use super::{form_ui, location_details, location_list, stats_chart};
use crate::messages::MessageType;

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(5), // Messages
            Constraint::Length(3), // Footer
        ])
        .split(size);

    render_header(f, app, chunks[0]);

    match app.mode {
        AppMode::Help => render_help(f, chunks[1]),
        _ => render_main_content(f, app, chunks[1]),
    }

    render_messages(f, app, chunks[2]);
    render_footer(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let theme = app.ctrl.theme();
    let accent = hex_color(theme.colors().bg1);
    let position = match app.ctrl.view().user_position() {
        Some(pos) => pos.format_coordinates(),
        None => "unknown (press l)".to_string(),
    };
    let title = format!(
        " Locbook - {} places - Your position: {} - Theme: {} ",
        app.ctrl.locations().len(),
        position,
        theme
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent)),
        );

    f.render_widget(header, area);
}

fn render_main_content(f: &mut Frame, app: &App, area: Rect) {
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    if app.mode == AppMode::AddLocation {
        // Form mode: list on top of the form, context panel on the right
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(main_chunks[0]);

        location_list::render(f, app, left[0]);
        form_ui::render_form(f, app, left[1]);
        form_ui::render_context_panel(f, app, main_chunks[1]);
    } else {
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(8)])
            .split(main_chunks[1]);

        location_list::render(f, app, main_chunks[0]);
        location_details::render(f, app, right[0]);
        stats_chart::render(f, app, right[1]);
    }
}

fn render_help(f: &mut Frame, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::Cyan),
        )),
        Line::from(""),
        section("Navigation:"),
        Line::from("  ↑/↓ or k/j    Move between locations"),
        Line::from("  Enter         Select location"),
        Line::from("  Esc           Clear selection"),
        Line::from(""),
        section("Locations:"),
        Line::from("  a             Add a location (address or LAT,LNG)"),
        Line::from("  e             Change the rate (then 1-5)"),
        Line::from("  d             Remove location"),
        Line::from("  l             Find your position and show distances"),
        Line::from(""),
        section("View:"),
        Line::from("  /             Filter by name"),
        Line::from("  + / -         Raise / lower the minimum rate"),
        Line::from("  s             Cycle sort field"),
        Line::from("  r             Reverse sort direction"),
        Line::from("  t             Next theme"),
        Line::from("  c             Copy a link to this view"),
        Line::from(""),
        section("General:"),
        Line::from("  q             Quit application"),
        Line::from("  ?             Show this help"),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to return...",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(paragraph, area);
}

fn render_messages(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();

    let recent_messages: Vec<_> = app.messages.iter().rev().take(3).collect();

    for msg in recent_messages.iter().rev() {
        let mut style = get_message_style(msg.message_type);

        if app.mode == AppMode::ConfirmRemove && msg.message_type == MessageType::Warning {
            style = style.add_modifier(Modifier::SLOW_BLINK);
        }

        lines.push(Line::from(vec![
            Span::styled(format!("{} ", msg.icon()), style),
            Span::styled(msg.text.as_str(), style),
        ]));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Ready",
            Style::default().fg(Color::Gray),
        )));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Messages ")
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if app.mode == AppMode::Filter {
        // The footer doubles as the filter input
        let width = area.width.saturating_sub(12) as usize;
        let scroll = app.filter_input.visual_scroll(width);
        let line = Line::from(vec![
            Span::styled(" Filter: ", Style::default().fg(Color::Yellow)),
            Span::styled(app.filter_input.value(), Style::default().fg(Color::White)),
        ]);
        let input = Paragraph::new(line)
            .scroll((0, scroll as u16))
            .block(block.title(" [Enter] Keep  [Esc] Restore "));
        f.render_widget(input, area);

        let cursor = app.filter_input.visual_cursor().saturating_sub(scroll) as u16;
        f.set_cursor(area.x + 10 + cursor, area.y + 1);
        return;
    }

    let shortcuts = match app.mode {
        AppMode::Normal => {
            "[↑↓] Move  [Enter] Select  [a]dd  [e] Rate  [d]elete  [/] Filter  [+/-] Min rate  [s]ort  [r]everse  [l]ocate  [t]heme  [c]opy link  [?] help  [q]uit"
        }
        AppMode::AddLocation => "[Tab/↑↓] Field  [Enter] Save  [Esc] Cancel",
        AppMode::EditRate => "[1-5] New rate  [Esc] Cancel",
        AppMode::ConfirmRemove => "[y] Confirm  [any other key] Cancel",
        AppMode::Help => "Press any key to return",
        AppMode::Filter => "",
    };

    let footer = Paragraph::new(shortcuts)
        .style(Style::default().fg(Color::Gray))
        .block(block);

    f.render_widget(footer, area);
}
