//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the runtime from specific I/O
//! implementations: the terminal frontend provides crossterm/ratatui I/O
//! backed by a service client, while tests provide scripted drivers. The
//! generic [`crate::Runtime`] handles all orchestration either way.

use std::future::Future;

use parlor_core::{ChannelName, ChatPayload, Pattern, SignalPayload, UserId};

use crate::{ReadModel, ReconcilerEvent};

/// Abstracts service and frontend I/O for the application runtime.
///
/// Service calls mirror the hosted messaging client's surface: publishes
/// and signals are fire-and-forget, history fetches only *start* a fetch
/// (results arrive later as [`ReconcilerEvent::HistoryLoaded`] through
/// [`poll_event`](Driver::poll_event), carrying the channel tag they were
/// requested with), and here-now takes a one-shot occupancy snapshot.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for the next input event.
    ///
    /// Returns `None` when no event is ready; the runtime polls again.
    fn poll_event(
        &mut self,
    ) -> impl Future<Output = Result<Option<ReconcilerEvent>, Self::Error>> + Send;

    /// Publish a chat message. Fire-and-forget; no local retry.
    fn publish(
        &mut self,
        channel: &ChannelName,
        payload: &ChatPayload,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Send a lightweight signal.
    fn send_signal(
        &mut self,
        channel: &ChannelName,
        payload: &SignalPayload,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Start a history fetch for a channel.
    ///
    /// Completion is delivered through `poll_event` tagged with `channel`.
    fn fetch_history(
        &mut self,
        channel: &ChannelName,
        limit: usize,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Snapshot the users currently present under a pattern.
    fn here_now(
        &mut self,
        pattern: &Pattern,
    ) -> impl Future<Output = Result<Vec<UserId>, Self::Error>> + Send;

    /// Render the read model.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails; render errors are fatal.
    fn render(&mut self, model: &ReadModel) -> Result<(), Self::Error>;

    /// Tear down subscriptions and release resources.
    fn stop(&mut self);
}
