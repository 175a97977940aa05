use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::{sanitize, App, ChatRole};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    render_backdrop(app, frame, area);

    if app.visible {
        render_widget_panel(app, frame, widget_rect(area));
    }
}

/// Host screen behind the widget. Stands in for whatever page the
/// widget floats over; when closed only the launcher hint shows.
fn render_backdrop(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" chatpane ");

    let hint = if app.visible {
        Line::from(Span::styled(
            "Esc: close chat   Ctrl-T: toggle   Ctrl-C: quit",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(Span::styled(
            "c: open chat   Ctrl-T: toggle   q: quit",
            Style::default().fg(Color::DarkGray),
        ))
    };

    let paragraph = Paragraph::new(hint).block(block);
    frame.render_widget(paragraph, area);
}

/// Floating panel anchored to the bottom-right corner, the terminal
/// equivalent of the little chat window web widgets pop over a page.
fn widget_rect(area: Rect) -> Rect {
    let width = area.width.saturating_sub(4).clamp(1, 52).min(area.width);
    let height = area.height.saturating_sub(2).clamp(1, 22).min(area.height);
    let x = (area.x + area.width)
        .saturating_sub(width + 2)
        .max(area.x);
    let y = (area.y + area.height)
        .saturating_sub(height + 1)
        .max(area.y);
    Rect::new(x, y, width, height)
}

fn render_widget_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);

    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Store transcript dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Chat ");

    let chat_text = if app.transcript.is_empty() && !app.is_loading() {
        Text::from(Span::styled(
            "Ask me anything...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &app.transcript {
            let (label, color) = match msg.role {
                ChatRole::User => ("You:", Color::Cyan),
                ChatRole::Assistant => ("Assistant:", Color::Yellow),
                ChatRole::Error => ("Error:", Color::Red),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));

            let body = sanitize(&msg.text);
            for line in body.lines() {
                if msg.role == ChatRole::Error {
                    lines.push(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::Red),
                    )));
                } else {
                    lines.push(Line::from(line.to_string()));
                }
            }
            lines.push(Line::default());
        }

        if app.is_loading() {
            lines.push(Line::from(Span::styled(
                "Assistant:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.transcript_scroll, 0));

    frame.render_widget(chat, chat_area);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Message (Enter to send) ");

    // Inner width = total width - 2 (for borders)
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = input_view(&app.input, app.input_cursor, inner_width);

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, input_area);

    frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
}

/// Visible slice of the input plus the cursor column inside it,
/// horizontally scrolled so the cursor stays on screen.
fn input_view(input: &str, cursor_pos: usize, inner_width: usize) -> (String, u16) {
    // Scroll offset that keeps the cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    // Clamp so a degenerate panel width cannot place the cursor
    // outside the input box
    let cursor_x = (cursor_pos - scroll_offset).min(inner_width) as u16;

    (visible_text, cursor_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_view_scrolls_to_keep_cursor_visible() {
        let (text, cursor_x) = input_view("abcdefghij", 10, 5);
        assert_eq!(text, "ghij");
        assert_eq!(cursor_x, 4);
    }

    #[test]
    fn input_view_short_input_needs_no_scroll() {
        let (text, cursor_x) = input_view("abc", 3, 10);
        assert_eq!(text, "abc");
        assert_eq!(cursor_x, 3);
    }

    #[test]
    fn input_view_degenerate_width_pins_cursor() {
        let (text, cursor_x) = input_view("abcdef", 6, 0);
        assert_eq!(text, "");
        assert_eq!(cursor_x, 0);
    }

    #[test]
    fn widget_rect_stays_inside_the_terminal() {
        for (w, h) in [(80u16, 24u16), (30, 10), (10, 5), (5, 3)] {
            let area = Rect::new(0, 0, w, h);
            let rect = widget_rect(area);
            assert!(rect.x + rect.width <= area.x + area.width);
            assert!(rect.y + rect.height <= area.y + area.height);
            assert!(rect.width >= 1);
            assert!(rect.height >= 1);
        }
    }
}
