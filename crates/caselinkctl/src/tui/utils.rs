//! Utilities - help overlay and helpers

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const KEYS: [(&str, &str); 11] = [
    ("Tab/Shift+Tab", "Move between fields"),
    ("Backspace", "Delete character"),
    ("Ctrl+U", "Clear field"),
    ("F2", "Save config"),
    ("F3", "Heatmap view"),
    ("F4", "Graph view"),
    ("F5", "Start scan"),
    ("F6", "Get results"),
    ("F7", "Run procedure test"),
    ("F1", "Toggle help"),
    ("Esc/Ctrl+C", "Quit"),
];

pub fn draw_help_overlay(f: &mut Frame, area: Rect) {
    let mut help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    help_text.extend(KEYS.iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(format!("{:<14}", key), Style::default().fg(Color::Cyan)),
            Span::raw(*action),
        ])
    }));
    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        "Press F1 to close",
        Style::default().fg(Color::Gray),
    )));

    let help_area = centered_rect(50, 60, area);
    let help_block = Paragraph::new(help_text)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().bg(Color::Black));

    f.render_widget(Clear, help_area);
    f.render_widget(help_block, help_area);
}

/// Create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Shorten to `max` characters with a trailing ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(50, 50, outer);
        assert_eq!(inner.width, 50);
        assert_eq!(inner.x, 25);
        assert!(inner.y + inner.height <= 40);
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("data/cases.csv", 20), "data/cases.csv");
        assert_eq!(truncate("data/cases.csv", 6), "data/…");
        assert_eq!(truncate("abc", 0), "");
    }
}
