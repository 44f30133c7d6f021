//! Stream addressing and the append precondition.
//!
//! Every household owns exactly two streams: the household stream (creation,
//! invites, membership) and the chores stream (every chore of the household,
//! shared). A [`StreamKey`] is the textual address the event log files facts
//! under; [`stream_key`] is the only way to build one.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::HouseholdId;

/// The aggregate kind a stream belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum StreamKind {
    /// Household creation, invites and the member roster.
    Household,
    /// All chores of one household (definitions, assignments, completions).
    Chores,
}

impl StreamKind {
    /// Prefix used in the textual stream key.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Household => "household",
            Self::Chores => "chores",
        }
    }
}

/// Address of one append-only stream in the event log.
///
/// Keys have the form `<kind>-<household uuid>`. The prefix never contains
/// a `-` and the UUID is fixed-width, so distinct `(kind, household)` pairs
/// always render to distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StreamKey(String);

impl StreamKey {
    /// The key as stored in the log.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the stream key for `(kind, household)`.
pub fn stream_key(kind: StreamKind, household_id: HouseholdId) -> StreamKey {
    StreamKey(format!("{}-{}", kind.prefix(), household_id.into_inner().hyphenated()))
}

/// Precondition checked by the log before appending a fact.
///
/// The version of a stream is the number of facts it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedVersion {
    /// The stream must be empty. Guarantees at most one creation fact.
    NoStream,
    /// No precondition.
    Any,
    /// The stream must currently hold exactly this many facts.
    Exact(u64),
}

impl ExpectedVersion {
    /// Whether a stream currently holding `current` facts satisfies this
    /// precondition.
    pub const fn admits(self, current: u64) -> bool {
        match self {
            Self::NoStream => current == 0,
            Self::Any => true,
            Self::Exact(n) => current == n,
        }
    }
}

impl core::fmt::Display for ExpectedVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoStream => f.write_str("no stream"),
            Self::Any => f.write_str("any"),
            Self::Exact(n) => write!(f, "exactly {n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic() {
        let id = HouseholdId::new();
        assert_eq!(
            stream_key(StreamKind::Household, id),
            stream_key(StreamKind::Household, id)
        );
    }

    #[test]
    fn household_and_chore_streams_never_collide() {
        let id = HouseholdId::new();
        assert_ne!(
            stream_key(StreamKind::Household, id),
            stream_key(StreamKind::Chores, id)
        );
    }

    #[test]
    fn different_households_never_collide() {
        let a = HouseholdId::new();
        let b = HouseholdId::new();
        for kind in [StreamKind::Household, StreamKind::Chores] {
            assert_ne!(stream_key(kind, a), stream_key(kind, b));
        }
    }

    #[test]
    fn key_format() {
        let id = HouseholdId::from(uuid::Uuid::nil());
        assert_eq!(
            stream_key(StreamKind::Chores, id).as_str(),
            "chores-00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn expected_version_admits() {
        assert!(ExpectedVersion::NoStream.admits(0));
        assert!(!ExpectedVersion::NoStream.admits(1));
        assert!(ExpectedVersion::Any.admits(0));
        assert!(ExpectedVersion::Any.admits(42));
        assert!(ExpectedVersion::Exact(3).admits(3));
        assert!(!ExpectedVersion::Exact(3).admits(2));
    }
}
