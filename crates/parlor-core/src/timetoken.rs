//! Service publish timestamps.

use serde::{Deserialize, Serialize};

/// Ticks per millisecond in the service's timestamp format.
const TICKS_PER_MILLI: u64 = 10_000;

/// A publish timestamp assigned by the external service.
///
/// Expressed in 100-nanosecond units since the Unix epoch. Timetokens order
/// messages within a channel; conversion to milliseconds is only for
/// display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetoken(u64);

impl Timetoken {
    /// Wrap a raw timetoken value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw 100 ns tick count.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Build a timetoken from Unix milliseconds.
    pub const fn from_unix_millis(millis: u64) -> Self {
        Self(millis * TICKS_PER_MILLI)
    }

    /// The timestamp in Unix milliseconds, truncated.
    pub const fn as_unix_millis(self) -> u64 {
        self.0 / TICKS_PER_MILLI
    }
}
