//! Channel identifiers and subscription patterns.
//!
//! Channels are wire-visible strings partitioned by a naming convention the
//! external service routes on: `Public.<name>` and `Private.<name>` for
//! groups, `DM.<lowerId>~<higherId>` for direct-message pairs. This module
//! replaces ad hoc string surgery with a parser/formatter pair: parsing any
//! formatted identifier yields the value back unchanged.

use std::{fmt, str::FromStr};

use crate::{ChannelParseError, UserId};

/// Separator between the two participants of a direct channel.
const DIRECT_SEPARATOR: char = '~';

/// Separator between a namespace prefix and the channel-specific remainder.
const NAMESPACE_SEPARATOR: char = '.';

/// The namespace a channel identifier lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Public group channels (`Public.<name>`).
    Public,
    /// Private group channels (`Private.<name>`).
    Private,
    /// Direct-message channels (`DM.<lowerId>~<higherId>`).
    Direct,
}

impl Namespace {
    /// The wire prefix for this namespace, without the trailing separator.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
            Self::Direct => "DM",
        }
    }
}

/// A structured channel identifier.
///
/// `Display` produces the exact wire form; [`FromStr`] parses it back.
/// Direct channels keep their participants in lexicographic order, so both
/// sides of a conversation compute the identical identifier independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelName {
    /// Public group channel.
    Public(String),
    /// Private group channel.
    Private(String),
    /// Direct-message channel between two users, lower id first.
    Direct(UserId, UserId),
}

impl ChannelName {
    /// Create a public group channel.
    pub fn public(name: impl Into<String>) -> Self {
        Self::Public(name.into())
    }

    /// Create a private group channel.
    pub fn private(name: impl Into<String>) -> Self {
        Self::Private(name.into())
    }

    /// Create the direct channel shared by two users.
    ///
    /// Order-independent: `direct(a, b)` and `direct(b, a)` yield the same
    /// channel. This is what lets both participants subscribe to one shared
    /// channel without negotiation.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelParseError::IdenticalParticipants`] if both ids are
    /// the same user.
    pub fn direct(a: UserId, b: UserId) -> Result<Self, ChannelParseError> {
        if a == b {
            return Err(ChannelParseError::IdenticalParticipants);
        }
        if a < b { Ok(Self::Direct(a, b)) } else { Ok(Self::Direct(b, a)) }
    }

    /// The namespace this channel lives in.
    pub fn namespace(&self) -> Namespace {
        match self {
            Self::Public(_) => Namespace::Public,
            Self::Private(_) => Namespace::Private,
            Self::Direct(..) => Namespace::Direct,
        }
    }

    /// For a direct channel, the participant that is not `me`.
    ///
    /// `None` for group channels and for direct channels `me` is not part
    /// of.
    pub fn direct_peer(&self, me: &UserId) -> Option<&UserId> {
        match self {
            Self::Direct(a, b) if a == me => Some(b),
            Self::Direct(a, b) if b == me => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public(name) => write!(f, "Public.{name}"),
            Self::Private(name) => write!(f, "Private.{name}"),
            Self::Direct(a, b) => write!(f, "DM.{a}~{b}"),
        }
    }
}

impl FromStr for ChannelName {
    type Err = ChannelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, rest) = s
            .split_once(NAMESPACE_SEPARATOR)
            .ok_or_else(|| ChannelParseError::UnknownNamespace(s.to_owned()))?;

        match prefix {
            "Public" | "Private" => {
                if rest.is_empty() {
                    return Err(ChannelParseError::EmptySegment(s.to_owned()));
                }
                if prefix == "Public" {
                    Ok(Self::Public(rest.to_owned()))
                } else {
                    Ok(Self::Private(rest.to_owned()))
                }
            },
            "DM" => {
                let (a, b) = rest
                    .split_once(DIRECT_SEPARATOR)
                    .ok_or_else(|| ChannelParseError::MissingSeparator(s.to_owned()))?;
                if a.is_empty() || b.is_empty() {
                    return Err(ChannelParseError::EmptySegment(s.to_owned()));
                }
                // Normalize rather than reject unordered participants: a
                // peer that formatted the pair backwards still routes to the
                // shared channel.
                Self::direct(UserId::new(a), UserId::new(b))
            },
            _ => Err(ChannelParseError::UnknownNamespace(s.to_owned())),
        }
    }
}

/// A subscription pattern, as accepted by the service's subscribe and
/// here-now calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Matches exactly one channel.
    Exact(ChannelName),
    /// Matches every channel in a namespace (`Public.*` wildcard form).
    Namespace(Namespace),
}

impl Pattern {
    /// Whether a channel falls under this pattern.
    pub fn matches(&self, channel: &ChannelName) -> bool {
        match self {
            Self::Exact(exact) => exact == channel,
            Self::Namespace(ns) => channel.namespace() == *ns,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(channel) => channel.fmt(f),
            Self::Namespace(ns) => write!(f, "{}.*", ns.prefix()),
        }
    }
}

impl FromStr for Pattern {
    type Err = ChannelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Public.*" => Ok(Self::Namespace(Namespace::Public)),
            "Private.*" => Ok(Self::Namespace(Namespace::Private)),
            "DM.*" => Ok(Self::Namespace(Namespace::Direct)),
            other => other.parse().map(Self::Exact),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn direct_is_commutative() {
        let a = UserId::new("5");
        let b = UserId::new("9");
        assert_eq!(
            ChannelName::direct(a.clone(), b.clone()),
            ChannelName::direct(b.clone(), a.clone())
        );
        assert_eq!(
            ChannelName::direct(a, b).map(|c| c.to_string()),
            Ok("DM.5~9".to_owned())
        );
    }

    #[test]
    fn direct_rejects_identical_participants() {
        assert_eq!(
            ChannelName::direct(UserId::new("7"), UserId::new("7")),
            Err(ChannelParseError::IdenticalParticipants)
        );
    }

    #[test]
    fn parse_normalizes_unordered_direct() {
        let parsed: Result<ChannelName, _> = "DM.9~5".parse();
        assert_eq!(parsed.map(|c| c.to_string()), Ok("DM.5~9".to_owned()));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(matches!(
            "global".parse::<ChannelName>(),
            Err(ChannelParseError::UnknownNamespace(_))
        ));
        assert!(matches!(
            "Team.global".parse::<ChannelName>(),
            Err(ChannelParseError::UnknownNamespace(_))
        ));
        assert!(matches!(
            "Public.".parse::<ChannelName>(),
            Err(ChannelParseError::EmptySegment(_))
        ));
        assert!(matches!(
            "DM.12".parse::<ChannelName>(),
            Err(ChannelParseError::MissingSeparator(_))
        ));
        assert!(matches!(
            "DM.12~".parse::<ChannelName>(),
            Err(ChannelParseError::EmptySegment(_))
        ));
    }

    #[test]
    fn patterns_match_their_namespace() {
        let global = ChannelName::public("global");
        let dm = ChannelName::Direct(UserId::new("1"), UserId::new("2"));

        let public_all = Pattern::Namespace(Namespace::Public);
        assert!(public_all.matches(&global));
        assert!(!public_all.matches(&dm));

        let exact = Pattern::Exact(global.clone());
        assert!(exact.matches(&global));
        assert!(!exact.matches(&ChannelName::public("other")));
    }

    #[test]
    fn pattern_wire_forms() {
        assert_eq!(Pattern::Namespace(Namespace::Public).to_string(), "Public.*");
        assert_eq!(Pattern::Namespace(Namespace::Direct).to_string(), "DM.*");
        assert_eq!("DM.*".parse::<Pattern>(), Ok(Pattern::Namespace(Namespace::Direct)));
        assert_eq!(
            "Private.ops".parse::<Pattern>(),
            Ok(Pattern::Exact(ChannelName::private("ops")))
        );
    }

    /// Ids as the service hands them out: no separator characters.
    fn id_strategy() -> impl Strategy<Value = UserId> {
        "[A-Za-z0-9_-]{1,12}".prop_map(UserId::new)
    }

    fn channel_strategy() -> impl Strategy<Value = ChannelName> {
        prop_oneof![
            "[A-Za-z0-9_-]{1,16}".prop_map(ChannelName::public),
            "[A-Za-z0-9_-]{1,16}".prop_map(ChannelName::private),
            (id_strategy(), id_strategy())
                .prop_filter("distinct participants", |(a, b)| a != b)
                .prop_map(|(a, b)| {
                    if a < b { ChannelName::Direct(a, b) } else { ChannelName::Direct(b, a) }
                }),
        ]
    }

    proptest! {
        #[test]
        fn prop_parse_format_round_trip(channel in channel_strategy()) {
            let wire = channel.to_string();
            prop_assert_eq!(wire.parse::<ChannelName>(), Ok(channel));
        }

        #[test]
        fn prop_direct_commutative(a in id_strategy(), b in id_strategy()) {
            prop_assume!(a != b);
            prop_assert_eq!(
                ChannelName::direct(a.clone(), b.clone()),
                ChannelName::direct(b, a)
            );
        }
    }
}
