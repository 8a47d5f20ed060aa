//! Core types for Parlor
//!
//! Channel naming, user identity, service timestamps, and wire payload types
//! shared by every layer. Nothing in this crate performs I/O; the external
//! messaging service owns the protocol, and these types only describe the
//! identifiers and payloads it carries.
//!
//! # Components
//!
//! - [`ChannelName`] / [`Pattern`]: structured channel identifiers and the
//!   wildcard patterns used for subscriptions
//! - [`UserId`]: service-visible client identity
//! - [`Directory`]: display metadata lookup collaborator
//! - [`Timetoken`]: the service's 100 ns publish timestamps
//! - [`ChatPayload`] / [`SignalPayload`]: JSON message and signal bodies

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod channel;
mod directory;
mod error;
mod payload;
mod timetoken;
mod user;

pub use channel::{ChannelName, Namespace, Pattern};
pub use directory::{Directory, StaticDirectory};
pub use error::{ChannelParseError, PayloadError};
pub use payload::{ChatPayload, SignalPayload};
pub use timetoken::Timetoken;
pub use user::UserId;
