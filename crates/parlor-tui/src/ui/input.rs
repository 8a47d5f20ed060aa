//! Message input box
//!
//! Shows the draft text with the cursor, and who is typing in the active
//! channel as the box title.

use parlor_app::ReadModel;
use ratatui::{
    Frame,
    layout::{Position, Rect},
    widgets::{Block, Borders, Paragraph},
};

use crate::InputState;

/// Render the message input box.
pub fn render(frame: &mut Frame, model: &ReadModel, input: &InputState, area: Rect) {
    let title = match model.typing.as_slice() {
        [] => " Message ".to_owned(),
        [one] => format!(" {one} is typing… "),
        many => format!(" {} are typing… ", many.join(", ")),
    };

    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(Paragraph::new(input.buffer()).block(block), area);

    let x = area.x + 1 + input.cursor_column() as u16;
    let y = area.y + 1;
    if x < area.x + area.width.saturating_sub(1) {
        frame.set_cursor_position(Position::new(x, y));
    }
}
