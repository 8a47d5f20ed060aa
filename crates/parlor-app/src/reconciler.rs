//! The Local Presence & Unread-State Reconciler.
//!
//! A pure state machine that reconciles the service's asynchronous event
//! stream — messages, signals, presence — with local view selection. No
//! I/O: inputs arrive as [`ReconcilerEvent`]s, outputs leave as
//! [`ReconcilerAction`]s, and rendering consumes [`ReadModel`] snapshots.
//!
//! # Invariants
//!
//! - The active channel's unread counter is always 0.
//! - A user's presence reflects the most recently received join/leave
//!   event mentioning them; interval heartbeats change nothing.
//! - A history batch is applied only while its tag equals the active
//!   channel; stale batches are discarded wholesale.
//! - No malformed payload ever halts processing of subsequent events.

use std::collections::HashMap;

use parlor_core::{ChannelName, ChatPayload, Directory, SignalPayload, Timetoken, UserId};
use parlor_pubsub::{
    HistoryItem, MessageEnvelope, PresenceAction, PresenceEnvelope, SignalEnvelope,
};

use crate::{
    ReconcilerAction, ReconcilerEvent,
    state::{
        GroupInfo, GroupRow, PLACEHOLDER_AVATAR, Presence, ReadModel, RemoteUser, RosterRow,
        Session, TranscriptEntry, placeholder_name,
    },
};

/// Most recent history entries fetched on channel switch.
const HISTORY_FETCH_LIMIT: usize = 30;

/// Most messages kept in the active channel's transcript.
const TRANSCRIPT_CAP: usize = 50;

/// Ticks a remote typing indicator stays lit after its last signal.
const TYPING_TTL_TICKS: u32 = 10;

/// Ticks between outbound typing signals while the local user types.
const TYPING_COOLDOWN_TICKS: u32 = 6;

/// The reconciler state machine.
pub struct Reconciler {
    session: Session,
    directory: Box<dyn Directory + Send>,
    groups: Vec<GroupInfo>,
    roster: HashMap<UserId, RemoteUser>,
    unread: HashMap<ChannelName, u32>,
    active: Option<ChannelName>,
    transcript: Vec<TranscriptEntry>,
    /// Remote typers per channel, each with remaining ticks to live.
    typing: HashMap<ChannelName, HashMap<UserId, u32>>,
    /// Ticks until the next outbound typing signal may be sent.
    signal_cooldown: u32,
    status: Option<String>,
}

impl Reconciler {
    /// Create a reconciler for a session.
    ///
    /// `groups` are the predefined group channels offered at startup;
    /// `contacts` seed the roster with known users that have not produced
    /// presence events yet (shown with [`Presence::Unknown`]).
    pub fn new(
        session: Session,
        directory: Box<dyn Directory + Send>,
        groups: Vec<GroupInfo>,
        contacts: &[UserId],
    ) -> Self {
        let mut reconciler = Self {
            session,
            directory,
            groups,
            roster: HashMap::new(),
            unread: HashMap::new(),
            active: None,
            transcript: Vec::new(),
            typing: HashMap::new(),
            signal_cooldown: 0,
            status: None,
        };
        for id in contacts {
            reconciler.seed_contact(id.clone());
        }
        reconciler
    }

    /// Process one event and return the actions it produced.
    pub fn handle(&mut self, event: ReconcilerEvent) -> Vec<ReconcilerAction> {
        match event {
            ReconcilerEvent::Message(envelope) => self.on_message(envelope),
            ReconcilerEvent::Signal(envelope) => self.on_signal(&envelope),
            ReconcilerEvent::Presence(envelope) => self.on_presence(envelope),
            ReconcilerEvent::HistoryLoaded { channel, items } => self.on_history(&channel, items),
            ReconcilerEvent::OccupancySeed { users } => self.on_occupancy_seed(users),
            ReconcilerEvent::SelectChannel(channel) => self.select_channel(channel),
            ReconcilerEvent::OpenDirectChat(peer) => self.open_direct_chat(peer),
            ReconcilerEvent::CycleChannel => self.cycle_channel(),
            ReconcilerEvent::SubmitMessage(text) => self.submit_message(&text),
            ReconcilerEvent::InputActivity => self.on_input_activity(),
            ReconcilerEvent::RemoveUser(id) => self.remove_user(&id),
            ReconcilerEvent::Refresh => vec![ReconcilerAction::Render],
            ReconcilerEvent::Tick => self.on_tick(),
            ReconcilerEvent::Quit => vec![ReconcilerAction::Quit],
        }
    }

    fn on_message(&mut self, envelope: MessageEnvelope) -> Vec<ReconcilerAction> {
        if Some(&envelope.channel) != self.active.as_ref() {
            // Not currently viewed: bump the unread badge and nothing else.
            *self.unread.entry(envelope.channel).or_insert(0) += 1;
            return vec![ReconcilerAction::Render];
        }

        let payload = match ChatPayload::from_value(&envelope.payload) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(channel = %envelope.channel, %error, "skipping malformed message");
                return vec![];
            },
        };

        // A delivered message supersedes its sender's typing indicator.
        if let Some(typers) = self.typing.get_mut(&envelope.channel) {
            typers.remove(&envelope.publisher);
        }

        self.push_entry(envelope.publisher, envelope.timetoken, payload.text().to_owned());
        vec![ReconcilerAction::Render]
    }

    fn on_signal(&mut self, envelope: &SignalEnvelope) -> Vec<ReconcilerAction> {
        let payload = match SignalPayload::from_value(&envelope.payload) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(channel = %envelope.channel, %error, "skipping malformed signal");
                return vec![];
            },
        };
        if !payload.is_typing() || envelope.publisher == self.session.user_id {
            return vec![];
        }

        self.typing
            .entry(envelope.channel.clone())
            .or_default()
            .insert(envelope.publisher.clone(), TYPING_TTL_TICKS);

        if Some(&envelope.channel) == self.active.as_ref() {
            vec![ReconcilerAction::Render]
        } else {
            vec![]
        }
    }

    fn on_presence(&mut self, envelope: PresenceEnvelope) -> Vec<ReconcilerAction> {
        let changed = match envelope.action {
            PresenceAction::Join => {
                envelope.user.is_some_and(|user| self.apply_presence(user, Presence::Online))
            },
            PresenceAction::Leave => {
                envelope.user.is_some_and(|user| self.apply_presence(user, Presence::Offline))
            },
            PresenceAction::Interval => {
                // Deltas apply exactly like join/leave batches; an interval
                // with neither list is a pure heartbeat.
                let mut changed = false;
                for user in envelope.joined {
                    changed |= self.apply_presence(user, Presence::Online);
                }
                for user in envelope.left {
                    changed |= self.apply_presence(user, Presence::Offline);
                }
                changed
            },
        };

        if changed { vec![ReconcilerAction::Render] } else { vec![] }
    }

    fn on_history(&mut self, channel: &ChannelName, items: Vec<HistoryItem>) -> Vec<ReconcilerAction> {
        if Some(channel) != self.active.as_ref() {
            // The user switched away while the fetch was in flight. There is
            // no cancellation; dropping the mismatched batch is the guard.
            tracing::debug!(%channel, "discarding stale history batch");
            return vec![];
        }

        self.transcript.clear();
        for item in items {
            match ChatPayload::from_value(&item.payload) {
                Ok(payload) => {
                    self.push_entry(item.publisher, item.timetoken, payload.text().to_owned());
                },
                Err(error) => {
                    tracing::warn!(%channel, %error, "skipping malformed history entry");
                },
            }
        }
        vec![ReconcilerAction::Render]
    }

    fn on_occupancy_seed(&mut self, users: Vec<UserId>) -> Vec<ReconcilerAction> {
        let mut changed = false;
        for user in users {
            changed |= self.apply_presence(user, Presence::Online);
        }
        if changed { vec![ReconcilerAction::Render] } else { vec![] }
    }

    fn select_channel(&mut self, channel: ChannelName) -> Vec<ReconcilerAction> {
        self.active = Some(channel.clone());
        self.unread.insert(channel.clone(), 0);
        self.transcript.clear();
        self.status = None;
        vec![
            ReconcilerAction::FetchHistory { channel, limit: HISTORY_FETCH_LIMIT },
            ReconcilerAction::Render,
        ]
    }

    fn open_direct_chat(&mut self, peer: UserId) -> Vec<ReconcilerAction> {
        match ChannelName::direct(self.session.user_id.clone(), peer) {
            Ok(channel) => self.select_channel(channel),
            Err(error) => {
                self.status = Some(error.to_string());
                vec![ReconcilerAction::Render]
            },
        }
    }

    fn cycle_channel(&mut self) -> Vec<ReconcilerAction> {
        let channels = self.channel_order();
        let Some(first) = channels.first() else {
            return vec![];
        };

        let next = self
            .active
            .as_ref()
            .and_then(|active| channels.iter().position(|c| c == active))
            .and_then(|idx| channels.get(idx + 1))
            .unwrap_or(first)
            .clone();
        self.select_channel(next)
    }

    fn submit_message(&mut self, text: &str) -> Vec<ReconcilerAction> {
        let text = text.trim();
        if text.is_empty() {
            return vec![];
        }
        let Some(channel) = self.active.clone() else {
            self.status = Some("select a channel first".to_owned());
            return vec![ReconcilerAction::Render];
        };

        // Sending clears the throttle so the next draft signals promptly.
        self.signal_cooldown = 0;
        vec![
            ReconcilerAction::Publish { channel, payload: ChatPayload::new(text) },
            ReconcilerAction::Render,
        ]
    }

    fn on_input_activity(&mut self) -> Vec<ReconcilerAction> {
        if let Some(channel) = self.active.clone()
            && self.signal_cooldown == 0
        {
            self.signal_cooldown = TYPING_COOLDOWN_TICKS;
            return vec![
                ReconcilerAction::SendSignal { channel, payload: SignalPayload::typing() },
                ReconcilerAction::Render,
            ];
        }
        vec![ReconcilerAction::Render]
    }

    fn remove_user(&mut self, id: &UserId) -> Vec<ReconcilerAction> {
        let removed = self.roster.remove(id).is_some();
        for typers in self.typing.values_mut() {
            typers.remove(id);
        }
        if removed { vec![ReconcilerAction::Render] } else { vec![] }
    }

    fn on_tick(&mut self) -> Vec<ReconcilerAction> {
        self.signal_cooldown = self.signal_cooldown.saturating_sub(1);

        let mut active_changed = false;
        for (channel, typers) in &mut self.typing {
            let before = typers.len();
            typers.retain(|_, ttl| {
                *ttl = ttl.saturating_sub(1);
                *ttl > 0
            });
            if typers.len() != before && Some(channel) == self.active.as_ref() {
                active_changed = true;
            }
        }

        if active_changed { vec![ReconcilerAction::Render] } else { vec![] }
    }

    /// Apply one presence observation; returns whether state changed.
    ///
    /// Join creates missing roster entries; leave marks entries offline but
    /// never evicts (the user stays remembered). Our own id is ignored.
    fn apply_presence(&mut self, id: UserId, presence: Presence) -> bool {
        if id == self.session.user_id {
            return false;
        }
        if let Some(user) = self.roster.get_mut(&id) {
            if user.presence == presence {
                return false;
            }
            user.presence = presence;
            return true;
        }

        let display_name =
            self.directory.display_name(&id).unwrap_or_else(|| placeholder_name(&id));
        let avatar = self.directory.avatar(&id).unwrap_or_else(|| PLACEHOLDER_AVATAR.to_owned());
        self.roster.insert(id.clone(), RemoteUser { id, display_name, avatar, presence });
        true
    }

    fn seed_contact(&mut self, id: UserId) {
        if id == self.session.user_id || self.roster.contains_key(&id) {
            return;
        }
        let display_name =
            self.directory.display_name(&id).unwrap_or_else(|| placeholder_name(&id));
        let avatar = self.directory.avatar(&id).unwrap_or_else(|| PLACEHOLDER_AVATAR.to_owned());
        self.roster
            .insert(id.clone(), RemoteUser { id, display_name, avatar, presence: Presence::Unknown });
    }

    fn push_entry(&mut self, sender: UserId, timetoken: Timetoken, text: String) {
        let own = sender == self.session.user_id;
        let sender_name = if own {
            self.session.display_name.clone()
        } else {
            self.roster.get(&sender).map_or_else(
                || self.directory.display_name(&sender).unwrap_or_else(|| placeholder_name(&sender)),
                |user| user.display_name.clone(),
            )
        };
        self.transcript.push(TranscriptEntry { sender, sender_name, text, timetoken, own });
        if self.transcript.len() > TRANSCRIPT_CAP {
            let excess = self.transcript.len() - TRANSCRIPT_CAP;
            self.transcript.drain(..excess);
        }
    }

    /// Roster users in display order (by name, then id).
    fn sorted_roster(&self) -> Vec<&RemoteUser> {
        let mut users: Vec<&RemoteUser> = self.roster.values().collect();
        users.sort_by(|a, b| a.display_name.cmp(&b.display_name).then(a.id.cmp(&b.id)));
        users
    }

    /// All selectable channels in display order: groups, then direct chats.
    fn channel_order(&self) -> Vec<ChannelName> {
        let mut channels: Vec<ChannelName> =
            self.groups.iter().map(|g| g.channel.clone()).collect();
        for user in self.sorted_roster() {
            if let Ok(channel) =
                ChannelName::direct(self.session.user_id.clone(), user.id.clone())
            {
                channels.push(channel);
            }
        }
        channels
    }

    /// The channel the client opens on launch (first predefined group).
    pub fn launch_channel(&self) -> Option<ChannelName> {
        self.groups.first().map(|g| g.channel.clone())
    }

    /// The local session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Currently active channel, if any.
    pub fn active_channel(&self) -> Option<&ChannelName> {
        self.active.as_ref()
    }

    /// Unread count for a channel (0 if never incremented).
    pub fn unread(&self, channel: &ChannelName) -> u32 {
        self.unread.get(channel).copied().unwrap_or(0)
    }

    /// Presence of a roster user, `None` if not known.
    pub fn presence(&self, id: &UserId) -> Option<Presence> {
        self.roster.get(id).map(|user| user.presence)
    }

    /// The active channel's transcript, oldest first.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Build the immutable snapshot rendering consumes.
    pub fn snapshot(&self) -> ReadModel {
        let groups = self
            .groups
            .iter()
            .map(|g| GroupRow {
                channel: g.channel.clone(),
                name: g.name.clone(),
                info: g.info.clone(),
                unread: self.unread(&g.channel),
                active: Some(&g.channel) == self.active.as_ref(),
            })
            .collect();

        let roster = self
            .sorted_roster()
            .into_iter()
            .filter_map(|user| {
                let channel =
                    ChannelName::direct(self.session.user_id.clone(), user.id.clone()).ok()?;
                Some(RosterRow {
                    unread: self.unread(&channel),
                    active: Some(&channel) == self.active.as_ref(),
                    user: user.clone(),
                    channel,
                })
            })
            .collect();

        let typing = self.active.as_ref().map_or_else(Vec::new, |channel| {
            let mut names: Vec<String> = self
                .typing
                .get(channel)
                .map(|typers| typers.keys().map(|id| self.typer_name(id)).collect())
                .unwrap_or_default();
            names.sort_unstable();
            names
        });

        ReadModel {
            me: self.session.clone(),
            heading: self.heading(),
            groups,
            roster,
            active_channel: self.active.clone(),
            transcript: self.transcript.clone(),
            typing,
            status: self.status.clone(),
        }
    }

    fn heading(&self) -> String {
        match &self.active {
            None => String::new(),
            Some(channel @ (ChannelName::Public(name) | ChannelName::Private(name))) => self
                .groups
                .iter()
                .find(|g| &g.channel == channel)
                .map_or_else(|| name.clone(), |g| g.name.clone()),
            Some(channel @ ChannelName::Direct(..)) => {
                let peer_name = channel
                    .direct_peer(&self.session.user_id)
                    .map_or_else(|| "unknown".to_owned(), |peer| self.typer_name(peer));
                format!("1:1 with {peer_name}")
            },
        }
    }

    fn typer_name(&self, id: &UserId) -> String {
        self.roster.get(id).map_or_else(
            || self.directory.display_name(id).unwrap_or_else(|| placeholder_name(id)),
            |user| user.display_name.clone(),
        )
    }
}
