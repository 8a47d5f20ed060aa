//! Messaging-service surface for Parlor
//!
//! The external pub/sub service owns delivery, durability, and presence
//! computation. This crate defines the event envelopes the service
//! delivers to subscribers, plus [`Loopback`], a single-process broker with
//! the same observable behavior — wildcard subscriptions, presence events
//! with interval-mode batching, bounded per-channel history, and here-now
//! occupancy snapshots. The demo binary and the integration tests run
//! against the loopback; a hosted-service client would implement the same
//! driver seam in production.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod envelope;
mod loopback;

pub use envelope::{
    HistoryItem, MessageEnvelope, PresenceAction, PresenceEnvelope, ServiceEvent, SignalEnvelope,
};
pub use loopback::{Loopback, LoopbackClient, LoopbackConfig};
