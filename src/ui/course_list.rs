//! Course list screen rendering
//!
//! Renders the course page: a header, the mock data banner when mock mode is on,
//! one row per course, and a footer with key hints and data freshness.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::display::field_text;

/// Column widths for id, credits and grading
const ID_WIDTH: usize = 10;
const CREDITS_WIDTH: usize = 4;
const GRADING_WIDTH: usize = 28;

/// Renders the course list screen
///
/// # Arguments
/// * `frame` - The ratatui Frame to render to
/// * `app` - The application state containing courses and selection
pub fn render_course_list(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let banner_height = match (app.is_mock_mode_enabled(), app.fixture_notice()) {
        (false, _) => 0,
        (true, None) => 1,
        (true, Some(_)) => 2,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),             // Header
            Constraint::Length(banner_height), // Mock banner
            Constraint::Min(3),                // Course list
            Constraint::Length(1),             // Help text
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    if banner_height > 0 {
        render_mock_banner(frame, app, chunks[1]);
    }
    render_list(frame, app, chunks[2]);
    render_help(frame, app, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let separator = "─".repeat((area.width as usize).saturating_sub(2));
    let lines = vec![
        Line::from(vec![
            Span::styled(
                "UMD COURSES",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{} courses", app.course_count()),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(Span::styled(separator, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_mock_banner(frame: &mut Frame, app: &App, area: Rect) {
    let notice = app.fixture_notice();
    let headline = if notice.is_some() {
        " MOCK MODE  The local fixture file could not be used (press m to disable)"
    } else {
        " MOCK DATA  Course data is served from the local fixture file (press m to disable)"
    };

    let mut lines = vec![Line::from(Span::styled(
        headline,
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))];
    if let Some(notice) = notice {
        lines.push(Line::from(Span::styled(
            notice,
            Style::default().fg(Color::Red),
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

/// Truncates `text` to `width` characters, padding the result to exactly `width`
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    } else {
        format!("{:<width$}", text, width = width)
    }
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Courses ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if app.courses.is_empty() {
        let empty = Paragraph::new("No courses to show.")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // Keep the selection visible
    let visible = area.height.saturating_sub(2) as usize;
    let start = if visible > 0 && app.selected_index >= visible {
        app.selected_index + 1 - visible
    } else {
        0
    };

    let inner_width = (area.width as usize).saturating_sub(4);
    let name_width = inner_width.saturating_sub(ID_WIDTH + CREDITS_WIDTH + GRADING_WIDTH + 6);

    let lines: Vec<Line> = app
        .courses
        .iter()
        .enumerate()
        .skip(start)
        .take(visible.max(1))
        .map(|(i, course)| {
            let selected = i == app.selected_index;
            let cursor = if selected { "▶ " } else { "  " };
            let style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(cursor, style),
                Span::styled(fit(&field_text(course, "course_id"), ID_WIDTH), style),
                Span::raw("  "),
                Span::styled(fit(&field_text(course, "name"), name_width), style),
                Span::raw("  "),
                Span::styled(
                    fit(&field_text(course, "credits"), CREDITS_WIDTH),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw("  "),
                Span::styled(
                    fit(&field_text(course, "grading_method"), GRADING_WIDTH),
                    Style::default().fg(Color::Gray),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let freshness = app
        .last_refresh
        .map(|t| format!("Updated {}", t.format("%H:%M")))
        .unwrap_or_default();

    let text = match &app.status_message {
        Some(message) => format!(" {}  │  {}", message, freshness),
        None => format!(
            " ↑↓ select  Enter details  r reload  m mock mode  ? help  q quit  │  {}",
            freshness
        ),
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
