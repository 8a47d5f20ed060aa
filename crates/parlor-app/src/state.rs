//! Observable application state types.
//!
//! Data structures representing the client's current view of the world:
//! who is known, who is online, what is unread, and what the active channel
//! shows. [`ReadModel`] is the immutable snapshot handed to rendering after
//! every mutation; drawing is a pure function of it.

use parlor_core::{ChannelName, Directory, Timetoken, UserId};

/// Avatar reference used when the directory does not know a user.
pub(crate) const PLACEHOLDER_AVATAR: &str = "img/avatar/placeholder.png";

/// Display name used when the directory does not know a user.
pub(crate) fn placeholder_name(id: &UserId) -> String {
    format!("user-{id}")
}

/// Presence status of a remote user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Known to the roster but never observed by a presence event.
    Unknown,
    /// Most recent presence event mentioning the user was a join.
    Online,
    /// Most recent presence event mentioning the user was a leave.
    Offline,
}

/// A remote user known to the roster.
///
/// Created on first observation (presence join or seeded contact), updated
/// in place on presence transitions, removed only by explicit removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    /// Service-visible id.
    pub id: UserId,
    /// Resolved display name, or a placeholder on directory miss.
    pub display_name: String,
    /// Resolved avatar reference, or a placeholder on directory miss.
    pub avatar: String,
    /// Current presence status.
    pub presence: Presence,
}

/// The local user's session context.
///
/// Created on login, dropped on disconnect. Owning this here keeps
/// "who am I" out of global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Our own service-visible id.
    pub user_id: UserId,
    /// Our resolved display name.
    pub display_name: String,
    /// Our resolved avatar reference.
    pub avatar: String,
}

impl Session {
    /// Open a session for the given id, resolving display metadata through
    /// the directory with placeholder fallback.
    pub fn open(user_id: UserId, directory: &dyn Directory) -> Self {
        let display_name =
            directory.display_name(&user_id).unwrap_or_else(|| placeholder_name(&user_id));
        let avatar = directory.avatar(&user_id).unwrap_or_else(|| PLACEHOLDER_AVATAR.to_owned());
        Self { user_id, display_name, avatar }
    }
}

/// A predefined group channel the client offers at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    /// The group's channel.
    pub channel: ChannelName,
    /// Display name for the sidebar.
    pub name: String,
    /// Optional descriptive line.
    pub info: Option<String>,
}

/// One rendered message in the active channel's transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    /// Sending user.
    pub sender: UserId,
    /// Sender's display name at render time.
    pub sender_name: String,
    /// Message text.
    pub text: String,
    /// Service publish timestamp.
    pub timetoken: Timetoken,
    /// Whether the local user sent it.
    pub own: bool,
}

/// Sidebar row for a predefined group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    /// The group's channel.
    pub channel: ChannelName,
    /// Display name.
    pub name: String,
    /// Optional descriptive line.
    pub info: Option<String>,
    /// Unread message count.
    pub unread: u32,
    /// Whether this is the active channel.
    pub active: bool,
}

/// Sidebar row for a direct-message contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    /// The remote user.
    pub user: RemoteUser,
    /// The shared direct channel with the local user.
    pub channel: ChannelName,
    /// Unread message count on that channel.
    pub unread: u32,
    /// Whether that channel is active.
    pub active: bool,
}

/// Immutable snapshot of everything rendering needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadModel {
    /// The local user.
    pub me: Session,
    /// Heading for the active conversation.
    pub heading: String,
    /// Predefined groups, in configured order.
    pub groups: Vec<GroupRow>,
    /// Direct-message contacts, sorted for display.
    pub roster: Vec<RosterRow>,
    /// The active channel, if one is selected.
    pub active_channel: Option<ChannelName>,
    /// Messages of the active channel, oldest first.
    pub transcript: Vec<TranscriptEntry>,
    /// Display names currently typing in the active channel.
    pub typing: Vec<String>,
    /// Transient status line.
    pub status: Option<String>,
}
