//! Chat transcript
//!
//! Renders the active channel's messages, oldest first, bottom-anchored.

use parlor_app::ReadModel;
use parlor_core::Timetoken;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Render the chat transcript.
pub fn render(frame: &mut Frame, model: &ReadModel, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = model.transcript.len().saturating_sub(visible);

    let lines: Vec<Line> = model
        .transcript
        .iter()
        .skip(skip)
        .map(|entry| {
            let name_style = if entry.own {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Green)
            };
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", format_time(entry.timetoken)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{}: ", entry.sender_name), name_style),
                Span::raw(entry.text.clone()),
            ])
        })
        .collect();

    let title = if model.heading.is_empty() {
        " Parlor ".to_owned()
    } else {
        format!(" {} ", model.heading)
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Human-readable time for a service timetoken.
fn format_time(timetoken: Timetoken) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(timetoken.as_unix_millis() as i64)
        .map_or_else(|| "--:--".to_owned(), |dt| dt.format("%H:%M").to_string())
}
