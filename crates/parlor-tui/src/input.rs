//! Input state and key handling for the TUI.
//!
//! This module owns all text input state (buffer, cursor) and translates
//! terminal keys into reconciler events. The reconciler never sees raw
//! keys; buffer edits surface as typing activity or redraw requests.

use parlor_app::ReconcilerEvent;

/// Key input events from the terminal.
///
/// Decouples input handling from the terminal library, so key translation
/// is testable without a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Tab key (cycle channels).
    Tab,
    /// Escape key (quit).
    Esc,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
}

/// Text input state for the message box.
///
/// The cursor is a byte offset that always sits on a char boundary.
#[derive(Debug, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    /// Create an empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in display columns (chars before the cursor).
    pub fn cursor_column(&self) -> usize {
        self.buffer[..self.cursor].chars().count()
    }

    /// Handle a key and return the reconciler event it maps to, if any.
    pub fn handle_key(&mut self, key: KeyInput) -> Option<ReconcilerEvent> {
        match key {
            KeyInput::Char(c) => {
                self.buffer.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                Some(ReconcilerEvent::InputActivity)
            },
            KeyInput::Backspace => {
                if let Some((idx, _)) = self.buffer[..self.cursor].char_indices().next_back() {
                    self.buffer.remove(idx);
                    self.cursor = idx;
                }
                Some(ReconcilerEvent::Refresh)
            },
            KeyInput::Delete => {
                if self.cursor < self.buffer.len() {
                    self.buffer.remove(self.cursor);
                }
                Some(ReconcilerEvent::Refresh)
            },
            KeyInput::Left => {
                self.cursor = self.buffer[..self.cursor]
                    .char_indices()
                    .next_back()
                    .map_or(0, |(idx, _)| idx);
                Some(ReconcilerEvent::Refresh)
            },
            KeyInput::Right => {
                self.cursor = self.buffer[self.cursor..]
                    .chars()
                    .next()
                    .map_or(self.cursor, |c| self.cursor + c.len_utf8());
                Some(ReconcilerEvent::Refresh)
            },
            KeyInput::Home => {
                self.cursor = 0;
                Some(ReconcilerEvent::Refresh)
            },
            KeyInput::End => {
                self.cursor = self.buffer.len();
                Some(ReconcilerEvent::Refresh)
            },
            KeyInput::Enter => {
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                if text.is_empty() {
                    Some(ReconcilerEvent::Refresh)
                } else {
                    Some(ReconcilerEvent::SubmitMessage(text))
                }
            },
            KeyInput::Tab => Some(ReconcilerEvent::CycleChannel),
            KeyInput::Esc => Some(ReconcilerEvent::Quit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chars_edit_buffer_and_signal_activity() {
        let mut input = InputState::new();

        let event = input.handle_key(KeyInput::Char('h'));
        assert!(matches!(event, Some(ReconcilerEvent::InputActivity)));
        let _ = input.handle_key(KeyInput::Char('i'));

        assert_eq!(input.buffer(), "hi");
        assert_eq!(input.cursor_column(), 2);
    }

    #[test]
    fn enter_submits_and_clears() {
        let mut input = InputState::new();
        let _ = input.handle_key(KeyInput::Char('y'));
        let _ = input.handle_key(KeyInput::Char('o'));

        let event = input.handle_key(KeyInput::Enter);
        assert!(matches!(event, Some(ReconcilerEvent::SubmitMessage(text)) if text == "yo"));
        assert!(input.buffer().is_empty());
        assert_eq!(input.cursor_column(), 0);
    }

    #[test]
    fn enter_on_empty_buffer_only_redraws() {
        let mut input = InputState::new();
        assert!(matches!(input.handle_key(KeyInput::Enter), Some(ReconcilerEvent::Refresh)));
    }

    #[test]
    fn backspace_removes_before_cursor() {
        let mut input = InputState::new();
        let _ = input.handle_key(KeyInput::Char('a'));
        let _ = input.handle_key(KeyInput::Char('b'));
        let _ = input.handle_key(KeyInput::Backspace);

        assert_eq!(input.buffer(), "a");
        assert_eq!(input.cursor_column(), 1);
    }

    #[test]
    fn cursor_moves_over_multibyte_chars() {
        let mut input = InputState::new();
        let _ = input.handle_key(KeyInput::Char('é'));
        let _ = input.handle_key(KeyInput::Char('x'));
        assert_eq!(input.cursor_column(), 2);

        let _ = input.handle_key(KeyInput::Left);
        let _ = input.handle_key(KeyInput::Left);
        assert_eq!(input.cursor_column(), 0);

        let _ = input.handle_key(KeyInput::Char('a'));
        assert_eq!(input.buffer(), "aéx");
    }

    #[test]
    fn tab_and_esc_map_to_navigation_events() {
        let mut input = InputState::new();
        assert!(matches!(input.handle_key(KeyInput::Tab), Some(ReconcilerEvent::CycleChannel)));
        assert!(matches!(input.handle_key(KeyInput::Esc), Some(ReconcilerEvent::Quit)));
    }
}
