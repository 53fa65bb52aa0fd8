//! Keyboard reference drawn over the current view
//!
//! Rows come from `app::KEY_BINDINGS`, so the overlay lists exactly the keys
//! `App::handle_key` reacts to.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{KeyGroup, KEY_BINDINGS};

const KEY_COLUMN: usize = 8;
const CLOSE_HINT: &str = "Esc, ? or q closes this help";

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let lines = help_lines();
    let area = overlay_area(&lines, frame.area());

    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn help_lines() -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (group, heading) in [(KeyGroup::Navigation, "Navigation"), (KeyGroup::Data, "Data")] {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            heading,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(
            KEY_BINDINGS
                .iter()
                .filter(|binding| binding.group == group)
                .map(|binding| {
                    Line::from(vec![
                        Span::styled(
                            format!(" {:<width$}", binding.label, width = KEY_COLUMN),
                            Style::default().fg(Color::Yellow),
                        ),
                        Span::raw(binding.description),
                    ])
                }),
        );
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        CLOSE_HINT,
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

/// Sizes the box to its content plus borders and centers it, clipped to `screen`
fn overlay_area(lines: &[Line], screen: Rect) -> Rect {
    let content_width = lines.iter().map(Line::width).max().unwrap_or(0);
    let width = u16::try_from(content_width + 2)
        .unwrap_or(u16::MAX)
        .min(screen.width);
    let height = u16::try_from(lines.len() + 2)
        .unwrap_or(u16::MAX)
        .min(screen.height);

    Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(render).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_lists_every_binding() {
        let content = draw(80, 24);

        assert!(content.contains("Keys"));
        assert!(content.contains("Navigation"));
        assert!(content.contains("Data"));
        for binding in KEY_BINDINGS {
            assert!(content.contains(binding.label), "missing key {}", binding.label);
            assert!(
                content.contains(binding.description),
                "missing description {}",
                binding.description
            );
        }
    }

    #[test]
    fn test_box_grows_with_the_key_map() {
        let lines = help_lines();
        let area = overlay_area(&lines, Rect::new(0, 0, 120, 60));

        // headings, bindings, one blank between groups, blank and hint
        assert_eq!(lines.len(), KEY_BINDINGS.len() + 5);
        assert_eq!(usize::from(area.height), lines.len() + 2);
        assert_eq!(area.x, (120 - area.width) / 2);
    }

    #[test]
    fn test_small_terminal_clips_the_box() {
        let lines = help_lines();
        let screen = Rect::new(0, 0, 20, 6);
        let area = overlay_area(&lines, screen);

        assert_eq!(area, screen);
        draw(20, 6);
    }
}
