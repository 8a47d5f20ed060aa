//! User directory collaborator.
//!
//! Display metadata (names, avatars) lives outside the messaging service.
//! Lookups are pure functions of the user id; a miss never fails the caller,
//! who substitutes placeholder data instead.

use crate::UserId;

/// Resolves display metadata for user ids.
///
/// Implementations must be deterministic per id. `None` means the id is not
/// known to the directory; callers render placeholders rather than failing.
pub trait Directory {
    /// Human-readable display name for a user.
    fn display_name(&self, id: &UserId) -> Option<String>;

    /// Avatar image reference for a user.
    fn avatar(&self, id: &UserId) -> Option<String>;
}

/// Names assigned round-robin by numeric id.
const NAMES: &[&str] = &[
    "Ada", "Bram", "Chandra", "Dot", "Emeka", "Freya", "Goran", "Hana", "Iris", "Jonas", "Kira",
    "Lars", "Mina", "Noor", "Otis", "Priya",
];

/// Avatar references assigned round-robin by numeric id.
const AVATARS: &[&str] = &[
    "img/avatar/a-01.png",
    "img/avatar/a-02.png",
    "img/avatar/a-03.png",
    "img/avatar/a-04.png",
    "img/avatar/a-05.png",
    "img/avatar/a-06.png",
    "img/avatar/a-07.png",
    "img/avatar/a-08.png",
];

/// Built-in directory resolving numeric ids modulo fixed tables.
///
/// Stands in for a real identity provider: any numeric id resolves to a
/// stable name/avatar pair, and non-numeric ids are unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDirectory;

impl StaticDirectory {
    /// Create the directory.
    pub fn new() -> Self {
        Self
    }

    fn index(id: &UserId, len: usize) -> Option<usize> {
        let numeric: u64 = id.as_str().parse().ok()?;
        Some((numeric % len as u64) as usize)
    }
}

impl Directory for StaticDirectory {
    fn display_name(&self, id: &UserId) -> Option<String> {
        Self::index(id, NAMES.len()).map(|i| NAMES[i].to_owned())
    }

    fn avatar(&self, id: &UserId) -> Option<String> {
        Self::index(id, AVATARS.len()).map(|i| AVATARS[i].to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_resolve_deterministically() {
        let dir = StaticDirectory::new();
        let id = UserId::new("5");
        assert_eq!(dir.display_name(&id), dir.display_name(&id));
        assert_eq!(dir.display_name(&id), Some("Freya".to_owned()));
        assert!(dir.avatar(&id).is_some());
    }

    #[test]
    fn ids_wrap_modulo_table_size() {
        let dir = StaticDirectory::new();
        let a = dir.display_name(&UserId::new("3"));
        let b = dir.display_name(&UserId::new("19"));
        assert_eq!(a, b);
    }

    #[test]
    fn non_numeric_ids_are_unknown() {
        let dir = StaticDirectory::new();
        assert_eq!(dir.display_name(&UserId::new("mallory")), None);
        assert_eq!(dir.avatar(&UserId::new("mallory")), None);
    }
}
