//! Fuzz payload decoding: arbitrary JSON must either decode into a typed
//! payload or fail with a typed error, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parlor_core::{ChatPayload, SignalPayload};

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Ok(payload) = ChatPayload::from_value(&value) {
        let _ = payload.to_value();
    }
    if let Ok(signal) = SignalPayload::from_value(&value) {
        let _ = signal.is_typing();
    }
});
