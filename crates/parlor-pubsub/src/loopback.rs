//! In-memory pub/sub broker.
//!
//! A single-process stand-in for the hosted service, behaviorally matched
//! where the client can observe it: publishes fan out to every subscriber
//! whose patterns cover the channel (the publisher included), history is
//! bounded per channel, and presence switches from per-event join/leave
//! notifications to batched interval summaries once occupancy exceeds the
//! announce threshold.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;
use parlor_core::{ChannelName, Pattern, Timetoken, UserId};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    HistoryItem, MessageEnvelope, PresenceEnvelope, ServiceEvent, SignalEnvelope,
};

/// Broker tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct LoopbackConfig {
    /// Occupancy threshold beyond which presence switches to interval mode.
    pub announce_max: usize,
    /// Maximum messages retained per channel.
    pub history_cap: usize,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self { announce_max: 20, history_cap: 100 }
    }
}

struct Subscriber {
    patterns: Vec<Pattern>,
    with_presence: bool,
    present: bool,
    tx: mpsc::UnboundedSender<ServiceEvent>,
}

struct BrokerState {
    config: LoopbackConfig,
    clients: HashMap<UserId, Subscriber>,
    history: HashMap<ChannelName, Vec<HistoryItem>>,
    last_timetoken: u64,
    pending_joined: Vec<UserId>,
    pending_left: Vec<UserId>,
}

impl BrokerState {
    fn occupancy(&self) -> usize {
        self.clients.values().filter(|c| c.present).count()
    }

    fn next_timetoken(&mut self) -> Timetoken {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        let candidate = Timetoken::from_unix_millis(now).raw();
        self.last_timetoken = candidate.max(self.last_timetoken + 1);
        Timetoken::from_raw(self.last_timetoken)
    }

    fn fan_out_message(&self, channel: &ChannelName, event: &ServiceEvent) {
        for sub in self.clients.values() {
            if sub.patterns.iter().any(|p| p.matches(channel)) {
                let _ = sub.tx.send(event.clone());
            }
        }
    }

    fn fan_out_presence(&self, envelope: PresenceEnvelope) {
        for sub in self.clients.values() {
            if sub.with_presence {
                let _ = sub.tx.send(ServiceEvent::Presence(envelope.clone()));
            }
        }
    }

    /// Announce one user's arrival or departure, honoring the announce
    /// threshold: at or below it, notify per event; above it, accumulate
    /// into the next interval summary.
    fn announce(&mut self, user: UserId, joined: bool) {
        let occupancy = self.occupancy();
        if occupancy <= self.config.announce_max {
            let envelope = if joined {
                PresenceEnvelope::join(user, occupancy)
            } else {
                PresenceEnvelope::leave(user, occupancy)
            };
            self.fan_out_presence(envelope);
        } else if joined {
            self.pending_joined.push(user);
        } else {
            // A join still pending cancels out instead of reporting both.
            if let Some(pos) = self.pending_joined.iter().position(|u| *u == user) {
                self.pending_joined.remove(pos);
            } else {
                self.pending_left.push(user);
            }
        }
    }
}

/// Single-process pub/sub broker.
///
/// Cheap to clone; all clones share state. Attach one [`LoopbackClient`]
/// per simulated endpoint.
#[derive(Clone)]
pub struct Loopback {
    state: Arc<Mutex<BrokerState>>,
}

impl Loopback {
    /// Create a broker with the given configuration.
    pub fn new(config: LoopbackConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(BrokerState {
                config,
                clients: HashMap::new(),
                history: HashMap::new(),
                last_timetoken: 0,
                pending_joined: Vec::new(),
                pending_left: Vec::new(),
            })),
        }
    }

    /// Attach a client endpoint.
    ///
    /// Re-attaching an id replaces the previous endpoint; its event queue
    /// closes.
    pub fn attach(&self, id: UserId) -> LoopbackClient {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        state.clients.insert(
            id.clone(),
            Subscriber { patterns: Vec::new(), with_presence: false, present: false, tx },
        );
        LoopbackClient { id, broker: self.clone(), events: rx }
    }

    /// Flush interval-mode presence.
    ///
    /// Emits one interval summary to presence subscribers whenever deltas
    /// are pending, or a pure heartbeat when occupancy sits above the
    /// announce threshold with no changes. Call periodically, the way the
    /// hosted service ticks its interval announcements.
    pub fn tick(&self) {
        let mut state = self.state.lock();
        let joined = std::mem::take(&mut state.pending_joined);
        let left = std::mem::take(&mut state.pending_left);
        let occupancy = state.occupancy();
        if joined.is_empty() && left.is_empty() && occupancy <= state.config.announce_max {
            return;
        }
        state.fan_out_presence(PresenceEnvelope::interval(joined, left, occupancy));
    }

    fn detach(&self, id: &UserId) {
        let mut state = self.state.lock();
        let was_present = state.clients.remove(id).is_some_and(|c| c.present);
        if was_present {
            tracing::debug!(user = %id, "client detached");
            state.announce(id.clone(), false);
        }
    }
}

/// A client endpoint attached to a [`Loopback`] broker.
pub struct LoopbackClient {
    id: UserId,
    broker: Loopback,
    events: mpsc::UnboundedReceiver<ServiceEvent>,
}

impl LoopbackClient {
    /// This endpoint's user id.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Subscribe to a set of channel patterns.
    ///
    /// The first subscription marks this client present and announces its
    /// join; later calls only replace the pattern set. `with_presence`
    /// opts in to receiving presence notifications.
    pub fn subscribe(&self, patterns: &[Pattern], with_presence: bool) {
        let mut state = self.broker.state.lock();
        let newly_present = match state.clients.get_mut(&self.id) {
            Some(sub) => {
                sub.patterns = patterns.to_vec();
                sub.with_presence = with_presence;
                !std::mem::replace(&mut sub.present, true)
            },
            None => return,
        };
        if newly_present {
            state.announce(self.id.clone(), true);
        }
    }

    /// Publish a message. Fire-and-forget; the message is appended to the
    /// channel's history and delivered to every matching subscriber,
    /// including this one.
    pub fn publish(&self, channel: &ChannelName, payload: Value) -> Timetoken {
        let mut state = self.broker.state.lock();
        let timetoken = state.next_timetoken();
        let cap = state.config.history_cap;
        let log = state.history.entry(channel.clone()).or_default();
        log.push(HistoryItem { publisher: self.id.clone(), timetoken, payload: payload.clone() });
        if log.len() > cap {
            let excess = log.len() - cap;
            log.drain(..excess);
        }
        state.fan_out_message(
            channel,
            &ServiceEvent::Message(MessageEnvelope {
                channel: channel.clone(),
                publisher: self.id.clone(),
                timetoken,
                payload,
            }),
        );
        timetoken
    }

    /// Send a signal. Delivered like a message but never persisted.
    pub fn signal(&self, channel: &ChannelName, payload: Value) {
        let state = self.broker.state.lock();
        state.fan_out_message(
            channel,
            &ServiceEvent::Signal(SignalEnvelope {
                channel: channel.clone(),
                publisher: self.id.clone(),
                payload,
            }),
        );
    }

    /// Fetch the most recent `max` messages on a channel, oldest first.
    pub fn history(&self, channel: &ChannelName, max: usize) -> Vec<HistoryItem> {
        let state = self.broker.state.lock();
        state.history.get(channel).map_or_else(Vec::new, |log| {
            let start = log.len().saturating_sub(max);
            log[start..].to_vec()
        })
    }

    /// Snapshot of present users whose subscriptions overlap the pattern.
    pub fn here_now(&self, pattern: &Pattern) -> Vec<UserId> {
        let state = self.broker.state.lock();
        let mut users: Vec<UserId> = state
            .clients
            .iter()
            .filter(|(_, sub)| sub.present && sub.patterns.iter().any(|p| overlaps(p, pattern)))
            .map(|(id, _)| id.clone())
            .collect();
        users.sort_unstable();
        users
    }

    /// Drop all subscriptions and announce departure.
    pub fn unsubscribe_all(&self) {
        let mut state = self.broker.state.lock();
        let was_present = match state.clients.get_mut(&self.id) {
            Some(sub) => {
                sub.patterns.clear();
                std::mem::replace(&mut sub.present, false)
            },
            None => false,
        };
        if was_present {
            state.announce(self.id.clone(), false);
        }
    }

    /// Wait for the next event.
    pub async fn recv(&mut self) -> Option<ServiceEvent> {
        self.events.recv().await
    }

    /// Take the next event if one is queued.
    pub fn try_recv(&mut self) -> Option<ServiceEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for LoopbackClient {
    fn drop(&mut self) {
        self.broker.detach(&self.id);
    }
}

/// Whether two patterns can cover a common channel.
fn overlaps(a: &Pattern, b: &Pattern) -> bool {
    match (a, b) {
        (Pattern::Exact(x), Pattern::Exact(y)) => x == y,
        (Pattern::Exact(c), Pattern::Namespace(ns))
        | (Pattern::Namespace(ns), Pattern::Exact(c)) => c.namespace() == *ns,
        (Pattern::Namespace(x), Pattern::Namespace(y)) => x == y,
    }
}

#[cfg(test)]
mod tests {
    use parlor_core::Namespace;
    use serde_json::json;

    use super::*;
    use crate::PresenceAction;

    fn public_all() -> Vec<Pattern> {
        vec![Pattern::Namespace(Namespace::Public), Pattern::Namespace(Namespace::Direct)]
    }

    fn drain(client: &mut LoopbackClient) -> Vec<ServiceEvent> {
        let mut events = Vec::new();
        while let Some(event) = client.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn publish_reaches_matching_subscribers_and_echoes() {
        let broker = Loopback::new(LoopbackConfig::default());
        let mut alice = broker.attach(UserId::new("1"));
        let mut bob = broker.attach(UserId::new("2"));
        alice.subscribe(&public_all(), false);
        bob.subscribe(&public_all(), false);

        let channel = ChannelName::public("global");
        alice.publish(&channel, json!({"content": {"type": "chat", "text": "hi"}}));

        let to_bob = drain(&mut bob);
        assert!(matches!(&to_bob[..], [ServiceEvent::Message(m)] if m.channel == channel));
        // Publisher hears its own message back, as the hosted service does.
        let to_alice = drain(&mut alice);
        assert!(matches!(&to_alice[..], [ServiceEvent::Message(m)] if m.publisher == UserId::new("1")));
    }

    #[test]
    fn signals_are_not_persisted() {
        let broker = Loopback::new(LoopbackConfig::default());
        let mut alice = broker.attach(UserId::new("1"));
        alice.subscribe(&public_all(), false);

        let channel = ChannelName::public("global");
        alice.signal(&channel, json!({"type": "typing"}));
        alice.publish(&channel, json!({"content": {"type": "chat", "text": "hi"}}));

        assert_eq!(alice.history(&channel, 30).len(), 1);
        assert_eq!(drain(&mut alice).len(), 2);
    }

    #[test]
    fn history_is_capped_and_oldest_first() {
        let broker = Loopback::new(LoopbackConfig { announce_max: 20, history_cap: 3 });
        let alice = broker.attach(UserId::new("1"));
        let channel = ChannelName::public("global");
        for i in 0..5 {
            alice.publish(&channel, json!({"n": i}));
        }

        let items = alice.history(&channel, 30);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].payload, json!({"n": 2}));
        assert_eq!(items[2].payload, json!({"n": 4}));
        assert!(items[0].timetoken < items[2].timetoken);

        assert_eq!(alice.history(&channel, 2).len(), 2);
    }

    #[test]
    fn joins_announce_per_event_below_threshold() {
        let broker = Loopback::new(LoopbackConfig::default());
        let mut alice = broker.attach(UserId::new("1"));
        alice.subscribe(&public_all(), true);

        let bob = broker.attach(UserId::new("2"));
        bob.subscribe(&public_all(), false);

        let events = drain(&mut alice);
        let joins: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ServiceEvent::Presence(p) if p.action == PresenceAction::Join => p.user.clone(),
                _ => None,
            })
            .collect();
        assert!(joins.contains(&UserId::new("2")));
    }

    #[test]
    fn interval_mode_batches_deltas_above_threshold() {
        let broker = Loopback::new(LoopbackConfig { announce_max: 1, history_cap: 100 });
        let mut alice = broker.attach(UserId::new("1"));
        alice.subscribe(&public_all(), true);
        // Alice's own join was announced per event at occupancy 1.
        drain(&mut alice);

        // Every join past the threshold batches into the next interval.
        let bob = broker.attach(UserId::new("2"));
        bob.subscribe(&public_all(), false);
        let carol = broker.attach(UserId::new("3"));
        carol.subscribe(&public_all(), false);

        let immediate = drain(&mut alice);
        assert!(immediate.is_empty());

        broker.tick();
        let events = drain(&mut alice);
        assert!(matches!(
            &events[..],
            [ServiceEvent::Presence(p)]
                if p.action == PresenceAction::Interval
                    && p.joined.contains(&UserId::new("2"))
                    && p.joined.contains(&UserId::new("3"))
                    && p.left.is_empty()
        ));

        // No changes since the last interval: a pure heartbeat.
        broker.tick();
        let events = drain(&mut alice);
        assert!(matches!(&events[..], [ServiceEvent::Presence(p)] if p.is_heartbeat()));
    }

    #[test]
    fn unsubscribe_announces_leave() {
        let broker = Loopback::new(LoopbackConfig::default());
        let mut alice = broker.attach(UserId::new("1"));
        alice.subscribe(&public_all(), true);
        let bob = broker.attach(UserId::new("2"));
        bob.subscribe(&public_all(), false);
        drain(&mut alice);

        bob.unsubscribe_all();
        let events = drain(&mut alice);
        assert!(matches!(
            &events[..],
            [ServiceEvent::Presence(p)]
                if p.action == PresenceAction::Leave && p.user == Some(UserId::new("2"))
        ));
    }

    #[test]
    fn here_now_reports_overlapping_present_clients() {
        let broker = Loopback::new(LoopbackConfig::default());
        let alice = broker.attach(UserId::new("1"));
        alice.subscribe(&public_all(), true);
        let bob = broker.attach(UserId::new("2"));
        bob.subscribe(&public_all(), false);
        // Attached but never subscribed: not present.
        let _carol = broker.attach(UserId::new("3"));

        let here = alice.here_now(&Pattern::Namespace(Namespace::Public));
        assert_eq!(here, vec![UserId::new("1"), UserId::new("2")]);

        assert!(alice.here_now(&Pattern::Namespace(Namespace::Private)).is_empty());
    }

    #[tokio::test]
    async fn recv_delivers_queued_events() {
        let broker = Loopback::new(LoopbackConfig::default());
        let mut alice = broker.attach(UserId::new("1"));
        alice.subscribe(&public_all(), false);
        alice.publish(&ChannelName::public("global"), json!({"x": 1}));

        let event = alice.recv().await;
        assert!(matches!(event, Some(ServiceEvent::Message(_))));
    }
}
