//! Property-based tests for the reconciler state machine.
//!
//! Invariants are checked under arbitrary event sequences: presence always
//! reflects the last event mentioning a user, and the active channel's
//! unread counter never leaves zero.

use parlor_app::{GroupInfo, Presence, Reconciler, ReconcilerAction, ReconcilerEvent, Session};
use parlor_core::{ChannelName, StaticDirectory, Timetoken, UserId};
use parlor_pubsub::{MessageEnvelope, PresenceEnvelope};
use proptest::prelude::*;
use serde_json::json;

/// The local user for every generated run.
const ME: &str = "5";

fn reconciler() -> Reconciler {
    let directory = StaticDirectory::new();
    let session = Session::open(UserId::new(ME), &directory);
    let groups = vec![
        GroupInfo {
            channel: ChannelName::public("global"),
            name: "Online Users".to_owned(),
            info: None,
        },
        GroupInfo { channel: ChannelName::public("other"), name: "Other".to_owned(), info: None },
    ];
    Reconciler::new(session, Box::new(directory), groups, &[])
}

fn user_strategy() -> impl Strategy<Value = UserId> {
    (1u8..10).prop_map(|n| UserId::new(n.to_string()))
}

fn channel_strategy() -> impl Strategy<Value = ChannelName> {
    prop_oneof![
        Just(ChannelName::public("global")),
        Just(ChannelName::public("other")),
        Just(ChannelName::public("hallway")),
    ]
}

fn message_event(channel: ChannelName, publisher: UserId) -> ReconcilerEvent {
    ReconcilerEvent::Message(MessageEnvelope {
        channel,
        publisher,
        timetoken: Timetoken::from_raw(1),
        payload: json!({"content": {"type": "chat", "text": "x"}}),
    })
}

fn event_strategy() -> impl Strategy<Value = ReconcilerEvent> {
    prop_oneof![
        3 => user_strategy().prop_map(|u| ReconcilerEvent::Presence(PresenceEnvelope::join(u, 1))),
        3 => user_strategy().prop_map(|u| ReconcilerEvent::Presence(PresenceEnvelope::leave(u, 1))),
        2 => (
            prop::collection::vec(user_strategy(), 0..3),
            prop::collection::vec(user_strategy(), 0..3),
        )
            .prop_map(|(joined, left)| {
                ReconcilerEvent::Presence(PresenceEnvelope::interval(joined, left, 5))
            }),
        3 => (channel_strategy(), user_strategy())
            .prop_map(|(c, u)| message_event(c, u)),
        2 => channel_strategy().prop_map(ReconcilerEvent::SelectChannel),
        1 => Just(ReconcilerEvent::Tick),
        1 => user_strategy().prop_map(ReconcilerEvent::RemoveUser),
    ]
}

/// Expected presence after an event sequence: last mention wins, our own
/// id is never tracked, interval deltas apply joins before leaves.
fn expected_presence(events: &[ReconcilerEvent]) -> std::collections::HashMap<UserId, Presence> {
    let mut expected = std::collections::HashMap::new();
    let me = UserId::new(ME);
    for event in events {
        match event {
            ReconcilerEvent::Presence(p) => {
                let mut mark = |user: &UserId, presence: Presence| {
                    if *user != me {
                        expected.insert(user.clone(), presence);
                    }
                };
                if let Some(user) = &p.user {
                    match p.action {
                        parlor_pubsub::PresenceAction::Join => mark(user, Presence::Online),
                        parlor_pubsub::PresenceAction::Leave => mark(user, Presence::Offline),
                        parlor_pubsub::PresenceAction::Interval => {},
                    }
                }
                for user in &p.joined {
                    mark(user, Presence::Online);
                }
                for user in &p.left {
                    mark(user, Presence::Offline);
                }
            },
            ReconcilerEvent::RemoveUser(user) => {
                expected.remove(user);
            },
            _ => {},
        }
    }
    expected
}

proptest! {
    /// Presence equals the action of the last join/leave event mentioning
    /// each id; heartbeats with no sub-lists change nothing.
    #[test]
    fn prop_presence_matches_last_event(
        events in prop::collection::vec(event_strategy(), 0..60)
    ) {
        let mut r = reconciler();
        for event in &events {
            let _ = r.handle(event.clone());
        }

        for (user, presence) in expected_presence(&events) {
            prop_assert_eq!(r.presence(&user), Some(presence), "user {}", user);
        }
    }

    /// The active channel's unread counter is zero after every event.
    #[test]
    fn prop_active_channel_unread_is_always_zero(
        events in prop::collection::vec(event_strategy(), 0..60)
    ) {
        let mut r = reconciler();
        for event in events {
            let _ = r.handle(event.clone());
            if let Some(active) = r.active_channel() {
                let active = active.clone();
                prop_assert_eq!(
                    r.unread(&active), 0,
                    "unread nonzero on active channel after {:?}", event
                );
            }
        }
    }

    /// Selecting a channel emits exactly one history fetch, tagged with
    /// that channel.
    #[test]
    fn prop_select_emits_one_tagged_fetch(
        warmup in prop::collection::vec(event_strategy(), 0..20),
        channel in channel_strategy()
    ) {
        let mut r = reconciler();
        for event in warmup {
            let _ = r.handle(event);
        }

        let actions = r.handle(ReconcilerEvent::SelectChannel(channel.clone()));
        let fetches: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                ReconcilerAction::FetchHistory { channel, .. } => Some(channel.clone()),
                _ => None,
            })
            .collect();
        prop_assert_eq!(fetches, vec![channel]);
    }
}
