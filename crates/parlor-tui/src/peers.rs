//! Simulated remote peers for demo mode.
//!
//! Without a hosted keyset there is nobody to talk to, so demo mode
//! spawns a handful of scripted users against the loopback broker. Each
//! peer subscribes with presence, chats in the public group at randomized
//! intervals (typing signal first, then the message), occasionally sends
//! the local user a direct message, and sometimes drops offline for a
//! while. This exercises every reconciler path: presence, unread badges,
//! typing indicators, and history.

use std::time::Duration;

use parlor_core::{ChannelName, ChatPayload, Namespace, Pattern, SignalPayload, UserId};
use parlor_pubsub::Loopback;
use rand::Rng;
use tokio::task::JoinHandle;

/// Lines the peers chat with.
const LINES: &[&str] = &[
    "morning all",
    "anyone looked at the deploy yet?",
    "coffee run in five",
    "that fixed it, thanks",
    "can someone review my change?",
    "lunch?",
    "the build is green again",
    "same issue on my side",
    "works for me now",
    "see you tomorrow",
];

/// Lines the peers open direct chats with.
const DM_LINES: &[&str] = &[
    "hey, got a minute?",
    "did you see my last message in the group?",
    "thanks again for earlier",
];

/// First peer id; consecutive peers count up from here.
const FIRST_PEER_ID: u64 = 101;

/// Spawn `count` scripted peers against the broker.
///
/// `dm_partner` is the local user the peers occasionally direct-message.
/// The returned handles keep running until aborted or the runtime exits.
pub fn spawn(broker: &Loopback, count: usize, dm_partner: UserId) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|i| {
            let broker = broker.clone();
            let partner = dm_partner.clone();
            let id = UserId::new((FIRST_PEER_ID + i as u64).to_string());
            tokio::spawn(run_peer(broker, id, partner))
        })
        .collect()
}

async fn run_peer(broker: Loopback, id: UserId, partner: UserId) {
    let client = broker.attach(id.clone());
    let patterns =
        [Pattern::Namespace(Namespace::Public), Pattern::Namespace(Namespace::Direct)];
    client.subscribe(&patterns, true);
    tracing::debug!(peer = %id, "peer online");

    let global = ChannelName::public("global");
    loop {
        let delay = rand::rng().random_range(4..12);
        tokio::time::sleep(Duration::from_secs(delay)).await;

        let roll: u32 = rand::rng().random_range(0..100);
        if roll < 70 {
            // Typing first, then the message, like a real client.
            client.signal(&global, SignalPayload::typing().to_value());
            tokio::time::sleep(Duration::from_millis(900)).await;
            let line = LINES[rand::rng().random_range(0..LINES.len())];
            client.publish(&global, ChatPayload::new(line).to_value());
        } else if roll < 85 {
            if let Ok(dm) = ChannelName::direct(id.clone(), partner.clone()) {
                let line = DM_LINES[rand::rng().random_range(0..DM_LINES.len())];
                client.publish(&dm, ChatPayload::new(line).to_value());
            }
        } else {
            // Drop offline for a while, then come back.
            client.unsubscribe_all();
            tracing::debug!(peer = %id, "peer offline");
            let away = rand::rng().random_range(6..20);
            tokio::time::sleep(Duration::from_secs(away)).await;
            client.subscribe(&patterns, true);
            tracing::debug!(peer = %id, "peer back online");
        }
    }
}
