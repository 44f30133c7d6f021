//! Read views produced by folding streams.
//!
//! None of these are persisted (except [`ActivityEntry`], which lives in the
//! rebuildable activity read model). They are recomputed from the log on
//! every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ChoreId, HouseholdId, InviteId, MemberId};

/// Household identity as established by its creation fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HouseholdView {
    /// The household.
    pub id: HouseholdId,
    /// Display name.
    pub name: String,
    /// Opaque pin credential. Never serialized to clients.
    #[serde(skip_serializing)]
    pub pin_credential: String,
}

/// Who is responsible for a chore right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Assignment {
    /// Named assignees (empty when assigned to everyone).
    pub member_ids: Vec<MemberId>,
    /// Every member is responsible.
    pub assign_to_all: bool,
    /// Who made the assignment.
    pub assigned_by: Option<MemberId>,
}

/// A chore with its live assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChoreView {
    /// The chore.
    pub id: ChoreId,
    /// Owning household.
    pub household_id: HouseholdId,
    /// Name shown in lists.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
    /// Current assignment, if the chore was ever assigned.
    pub assignment: Option<Assignment>,
}

/// One completion of a chore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CompletionView {
    /// The chore.
    pub chore_id: ChoreId,
    /// Who completed it.
    pub member_id: MemberId,
    /// When.
    pub completed_at: DateTime<Utc>,
}

/// The household's currently valid invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InviteView {
    /// The invite.
    pub invite_id: InviteId,
    /// Household it admits to.
    pub household_id: HouseholdId,
    /// Shareable link.
    pub link: String,
}

/// A member on the household roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemberView {
    /// The member.
    pub id: MemberId,
    /// Household the member belongs to.
    pub household_id: HouseholdId,
    /// Current nickname.
    pub nickname: String,
    /// Current status line.
    pub status: Option<String>,
}

/// A denormalized, human-readable record of a past fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActivityEntry {
    /// Household the fact belongs to.
    pub household_id: HouseholdId,
    /// Order in which the rebuild produced this entry (0-based).
    pub sequence: u64,
    /// `snake_case` fact type (see `DomainEvent::event_type`).
    pub kind: String,
    /// Sentence describing what happened.
    pub description: String,
    /// Member the fact is about, if any.
    pub member_id: Option<MemberId>,
    /// Chore the fact is about, if any.
    pub chore_id: Option<ChoreId>,
    /// When the log recorded the fact.
    pub occurred_at: DateTime<Utc>,
}
