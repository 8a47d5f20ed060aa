//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait using crossterm for keyboard events and
//! ratatui for rendering. Service I/O goes through a [`LoopbackClient`];
//! completed history fetches are queued and delivered on the next poll, so
//! results always re-enter through the event stream with their channel tag
//! intact.

use std::{
    collections::VecDeque,
    io::{self, Stdout, stdout},
    time::Duration,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use parlor_app::{Driver, ReadModel, ReconcilerEvent};
use parlor_core::{ChannelName, ChatPayload, Pattern, SignalPayload, UserId};
use parlor_pubsub::{Loopback, LoopbackClient, ServiceEvent};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::{InputState, KeyInput, ui};

/// Tick cadence for typing expiry and broker interval flushes.
const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Owns the terminal, the input state for text editing, and the service
/// client handle.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    broker: Loopback,
    client: LoopbackClient,
    input: InputState,
    completed_fetches: VecDeque<ReconcilerEvent>,
}

impl TerminalDriver {
    /// Create a terminal driver and enter the alternate screen.
    pub fn new(broker: Loopback, client: LoopbackClient) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            broker,
            client,
            input: InputState::new(),
            completed_fetches: VecDeque::new(),
        })
    }

    /// Convert crossterm `KeyCode` to [`KeyInput`].
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }

    /// Map a service delivery to its reconciler event.
    fn convert_service(event: ServiceEvent) -> ReconcilerEvent {
        match event {
            ServiceEvent::Message(envelope) => ReconcilerEvent::Message(envelope),
            ServiceEvent::Signal(envelope) => ReconcilerEvent::Signal(envelope),
            ServiceEvent::Presence(envelope) => ReconcilerEvent::Presence(envelope),
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<ReconcilerEvent>, TerminalError> {
        // Completed fetches re-enter the queue ahead of new input.
        if let Some(event) = self.completed_fetches.pop_front() {
            return Ok(Some(event));
        }

        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        Ok(Self::convert_key(key.code)
                            .and_then(|key| self.input.handle_key(key)))
                    },
                    Some(Ok(Event::Resize(_, _))) => Ok(Some(ReconcilerEvent::Refresh)),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    _ => Ok(None),
                }
            }

            // Service deliveries
            service = self.client.recv() => {
                Ok(service.map(Self::convert_service))
            }

            // Periodic tick; also drives the broker's interval presence
            () = tokio::time::sleep(TICK_INTERVAL) => {
                self.broker.tick();
                Ok(Some(ReconcilerEvent::Tick))
            }
        }
    }

    async fn publish(
        &mut self,
        channel: &ChannelName,
        payload: &ChatPayload,
    ) -> Result<(), TerminalError> {
        self.client.publish(channel, payload.to_value());
        Ok(())
    }

    async fn send_signal(
        &mut self,
        channel: &ChannelName,
        payload: &SignalPayload,
    ) -> Result<(), TerminalError> {
        self.client.signal(channel, payload.to_value());
        Ok(())
    }

    async fn fetch_history(
        &mut self,
        channel: &ChannelName,
        limit: usize,
    ) -> Result<(), TerminalError> {
        let items = self.client.history(channel, limit);
        self.completed_fetches
            .push_back(ReconcilerEvent::HistoryLoaded { channel: channel.clone(), items });
        Ok(())
    }

    async fn here_now(&mut self, pattern: &Pattern) -> Result<Vec<UserId>, TerminalError> {
        Ok(self.client.here_now(pattern))
    }

    fn render(&mut self, model: &ReadModel) -> Result<(), TerminalError> {
        let input = &self.input;
        self.terminal.draw(|frame| {
            ui::render(frame, model, input);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        self.client.unsubscribe_all();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.client.unsubscribe_all();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
