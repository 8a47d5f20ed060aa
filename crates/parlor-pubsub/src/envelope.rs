//! Event envelopes delivered by the messaging service.
//!
//! Subscribers receive three event families: messages (persisted chat
//! traffic), signals (lightweight, non-persisted), and presence
//! notifications. Payloads stay raw JSON here; decoding happens per item at
//! the consumer so one malformed payload never poisons a batch.

use parlor_core::{ChannelName, Timetoken, UserId};
use serde_json::Value;

/// A message delivered on a subscribed channel.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEnvelope {
    /// Channel the message was published on.
    pub channel: ChannelName,
    /// Publishing client.
    pub publisher: UserId,
    /// Service-assigned publish timestamp.
    pub timetoken: Timetoken,
    /// Raw message body.
    pub payload: Value,
}

/// A signal delivered on a subscribed channel.
///
/// Signals are not persisted and never appear in history.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEnvelope {
    /// Channel the signal was sent on.
    pub channel: ChannelName,
    /// Sending client.
    pub publisher: UserId,
    /// Raw signal body.
    pub payload: Value,
}

/// Presence notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceAction {
    /// A single user came online.
    Join,
    /// A single user went offline.
    Leave,
    /// Periodic occupancy summary, optionally carrying joined/left deltas.
    ///
    /// The service switches from per-event join/leave to interval summaries
    /// once occupancy exceeds its announce threshold; consumers handle both
    /// modes uniformly.
    Interval,
}

/// A presence notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEnvelope {
    /// Notification kind.
    pub action: PresenceAction,
    /// The affected user, for `Join`/`Leave`.
    pub user: Option<UserId>,
    /// Users that joined since the last interval, for `Interval`.
    pub joined: Vec<UserId>,
    /// Users that left since the last interval, for `Interval`.
    pub left: Vec<UserId>,
    /// Channel occupancy after the change.
    pub occupancy: usize,
}

impl PresenceEnvelope {
    /// A single-user join notification.
    pub fn join(user: UserId, occupancy: usize) -> Self {
        Self {
            action: PresenceAction::Join,
            user: Some(user),
            joined: Vec::new(),
            left: Vec::new(),
            occupancy,
        }
    }

    /// A single-user leave notification.
    pub fn leave(user: UserId, occupancy: usize) -> Self {
        Self {
            action: PresenceAction::Leave,
            user: Some(user),
            joined: Vec::new(),
            left: Vec::new(),
            occupancy,
        }
    }

    /// An interval summary carrying deltas since the previous interval.
    pub fn interval(joined: Vec<UserId>, left: Vec<UserId>, occupancy: usize) -> Self {
        Self { action: PresenceAction::Interval, user: None, joined, left, occupancy }
    }

    /// Whether this is an interval with no deltas (pure heartbeat).
    pub fn is_heartbeat(&self) -> bool {
        self.action == PresenceAction::Interval && self.joined.is_empty() && self.left.is_empty()
    }
}

/// An entry returned by a history fetch, oldest first within a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryItem {
    /// Publishing client.
    pub publisher: UserId,
    /// Service-assigned publish timestamp.
    pub timetoken: Timetoken,
    /// Raw message body.
    pub payload: Value,
}

/// The union of events a subscriber receives.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEvent {
    /// A chat message arrived.
    Message(MessageEnvelope),
    /// A signal arrived.
    Signal(SignalEnvelope),
    /// A presence notification arrived.
    Presence(PresenceEnvelope),
}
