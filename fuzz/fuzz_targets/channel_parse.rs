//! Fuzz the channel-name parser: parsing must never panic, and any
//! successfully parsed identifier must survive a format/parse round trip.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parlor_core::ChannelName;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(channel) = input.parse::<ChannelName>() {
        let wire = channel.to_string();
        let reparsed = wire.parse::<ChannelName>();
        assert_eq!(reparsed.as_ref(), Ok(&channel));
    }
});
