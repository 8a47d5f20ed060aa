//! Status line
//!
//! Session identity on the left, transient status or key help on the
//! right.

use parlor_app::{Presence, ReadModel};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status line.
pub fn render(frame: &mut Frame, model: &ReadModel, area: Rect) {
    let online = model
        .roster
        .iter()
        .filter(|contact| contact.user.presence == Presence::Online)
        .count();

    let right = model
        .status
        .clone()
        .unwrap_or_else(|| "Tab: next channel · Esc: quit".to_owned());

    let line = Line::from(vec![
        Span::styled(
            format!(" {} (You) ", model.me.display_name),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("· {online} online "), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("· {right}"), Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}
