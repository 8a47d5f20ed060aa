//! Reconciler input events.
//!
//! Every input — service delivery or local user intent — arrives through
//! this one enum and is consumed sequentially, preserving single-threaded
//! ordering without depending on any runtime's callback mechanism.

use parlor_core::{ChannelName, UserId};
use parlor_pubsub::{HistoryItem, MessageEnvelope, PresenceEnvelope, SignalEnvelope};

/// Events processed by the [`crate::Reconciler`] state machine.
#[derive(Debug, Clone)]
pub enum ReconcilerEvent {
    /// A chat message arrived on a subscribed channel.
    Message(MessageEnvelope),

    /// A signal (typing indicator) arrived.
    Signal(SignalEnvelope),

    /// A presence notification arrived.
    Presence(PresenceEnvelope),

    /// A history fetch completed.
    ///
    /// `channel` is the tag the fetch was requested for; batches whose tag
    /// no longer matches the active channel are discarded.
    HistoryLoaded {
        /// Channel the fetch was requested for.
        channel: ChannelName,
        /// Fetched entries, oldest first.
        items: Vec<HistoryItem>,
    },

    /// Startup here-now snapshot of currently present users.
    OccupancySeed {
        /// Present user ids.
        users: Vec<UserId>,
    },

    /// The local user selected a channel to view.
    SelectChannel(ChannelName),

    /// The local user opened a direct chat with a roster contact.
    OpenDirectChat(UserId),

    /// The local user cycled to the next channel in display order.
    CycleChannel,

    /// The local user submitted the message input.
    SubmitMessage(String),

    /// The local user typed in the message input.
    InputActivity,

    /// Explicit removal of a user (logout flows, distinct from leave).
    RemoveUser(UserId),

    /// The frontend needs a redraw (resize, input edits).
    Refresh,

    /// Periodic tick for typing-indicator expiry and signal throttling.
    Tick,

    /// The local user asked to quit.
    Quit,
}
