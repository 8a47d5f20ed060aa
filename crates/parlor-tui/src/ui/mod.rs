//! UI rendering
//!
//! Rendering functions that convert the read-model snapshot into terminal
//! output using ratatui widgets. All functions are pure (no I/O): drawing
//! is a function of the snapshot and the input state, nothing else.

mod channels;
mod chat;
mod input;
mod status;

use parlor_app::ReadModel;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::InputState;

/// Render the entire UI.
pub fn render(frame: &mut Frame, model: &ReadModel, input: &InputState) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    render_main_area(frame, model, *main_area);
    input::render(frame, model, input, *input_area);
    status::render(frame, model, *status_area);
}

/// Render the main area (channel sidebar + chat transcript).
fn render_main_area(frame: &mut Frame, model: &ReadModel, area: Rect) {
    const SIDEBAR_WIDTH: u16 = 24;
    const CHAT_AREA_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(CHAT_AREA_MIN_WIDTH)])
        .split(area);

    let [channels_area, chat_area] = chunks.as_ref() else {
        return;
    };

    channels::render(frame, model, *channels_area);
    chat::render(frame, model, *chat_area);
}
