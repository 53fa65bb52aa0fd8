//! Course detail screen rendering
//!
//! Shows every field of a course as returned by the single-course lookup. The
//! record is opaque, so every field is listed, sorted by name.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

use crate::app::App;
use crate::catalog::CourseRecord;
use crate::display::{array_to_string, field_text, process_course};

/// Picks the record to show from a single-course response
///
/// The API wraps single courses in a one-element array; a bare object is
/// accepted as well.
fn unwrap_course(response: &CourseRecord) -> Option<&CourseRecord> {
    match response {
        Value::Array(items) => items.iter().find(|item| item.is_object()),
        Value::Object(_) => Some(response),
        _ => None,
    }
}

/// Builds one line per field
fn detail_lines(course: &CourseRecord) -> Vec<Line<'static>> {
    let processed = process_course(course);
    let Value::Object(map) = &processed else {
        return vec![Line::from(array_to_string(&processed))];
    };

    map.keys()
        .map(|key| {
            Line::from(vec![
                Span::styled(format!("{:<16}", key), Style::default().fg(Color::Cyan)),
                Span::raw(field_text(&processed, key)),
            ])
        })
        .collect()
}

/// Renders the detail view for `course_id`
pub fn render(frame: &mut Frame, app: &App, course_id: &str) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let lines = match app.course_detail(course_id) {
        None => vec![Line::from(Span::styled(
            "Loading course...",
            Style::default().fg(Color::Cyan),
        ))],
        Some(None) => vec![Line::from(Span::styled(
            "Course details are unavailable right now.",
            Style::default().fg(Color::Red),
        ))],
        Some(Some(response)) => match unwrap_course(response) {
            Some(course) => detail_lines(course),
            None => vec![Line::from("The API returned no course record.")],
        },
    };

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", course_id),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let body = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll_offset, 0));
    frame.render_widget(body, chunks[0]);

    frame.render_widget(
        Paragraph::new(" ↑↓ scroll  g top  Esc back  ? help  q quit")
            .style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );
}
