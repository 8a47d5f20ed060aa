//! Reconciler side-effects and intents.
//!
//! Instructions produced by the [`crate::Reconciler`] for the runtime to
//! execute. Publishes are fire-and-forget; history fetches carry the
//! channel tag their results must still match on arrival.

use parlor_core::{ChannelName, ChatPayload, SignalPayload};

/// Actions produced by the reconciler state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilerAction {
    /// Render the current read model.
    Render,

    /// Quit the application.
    Quit,

    /// Publish a chat message. No local retry on failure.
    Publish {
        /// Target channel.
        channel: ChannelName,
        /// Message body.
        payload: ChatPayload,
    },

    /// Send a lightweight signal (typing indicator).
    SendSignal {
        /// Target channel.
        channel: ChannelName,
        /// Signal body.
        payload: SignalPayload,
    },

    /// Start a history fetch for a channel.
    ///
    /// Results come back as [`crate::ReconcilerEvent::HistoryLoaded`]
    /// tagged with the same channel.
    FetchHistory {
        /// Channel to fetch, and the tag for the eventual result.
        channel: ChannelName,
        /// Maximum entries to fetch.
        limit: usize,
    },
}
