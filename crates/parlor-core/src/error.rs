//! Error types for Parlor core.
//!
//! Strongly-typed errors per concern: channel identifier parsing and wire
//! payload decoding. Malformed payloads are skipped per item by consumers,
//! never fatal to a batch.

use thiserror::Error;

/// Errors from parsing or constructing channel identifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelParseError {
    /// Identifier does not start with a known namespace prefix.
    #[error("unknown channel namespace in {0:?}")]
    UnknownNamespace(String),

    /// Group name or participant id is empty.
    #[error("empty segment in channel identifier {0:?}")]
    EmptySegment(String),

    /// Direct channel is missing the participant separator.
    #[error("direct channel {0:?} is missing the '~' separator")]
    MissingSeparator(String),

    /// Direct channel participants must be two distinct users.
    #[error("direct channel participants must differ")]
    IdenticalParticipants,
}

/// Errors from decoding wire payloads.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// Payload JSON does not match the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Payload parsed but declares a kind this client does not understand.
    #[error("unsupported payload kind {0:?}")]
    UnsupportedKind(String),
}
