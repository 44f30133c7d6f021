//! The event catalog.
//!
//! [`DomainEvent`] is the closed set of facts the system can record. Each
//! variant carries only what its reducers need. Facts are never edited once
//! appended; corrections are new facts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ChoreId, HouseholdId, InviteId, MemberId};
use crate::stream::{StreamKey, StreamKind};

/// An immutable domain fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type")]
#[ts(export, export_to = "bindings/")]
pub enum DomainEvent {
    /// A household came into existence.
    HouseholdCreated {
        /// The new household.
        household_id: HouseholdId,
        /// Display name chosen at creation.
        name: String,
        /// Opaque salted pin hash (see the access module in `hearth-core`).
        pin_credential: String,
    },
    /// A fresh invite link replaced whatever invite was current.
    InviteGenerated {
        /// Household the invite admits to.
        household_id: HouseholdId,
        /// The invite.
        invite_id: InviteId,
        /// Shareable link.
        link: String,
    },
    /// A chore was added to the household's catalog.
    ChoreCreated {
        /// The chore.
        chore_id: ChoreId,
        /// Owning household.
        household_id: HouseholdId,
        /// Name shown in lists.
        display_name: String,
        /// Free-form description.
        description: String,
    },
    /// A chore's assignment was replaced.
    ChoreAssigned {
        /// The chore.
        chore_id: ChoreId,
        /// Owning household.
        household_id: HouseholdId,
        /// Assignees, when not assigned to everyone.
        member_ids: Option<Vec<MemberId>>,
        /// Whether every member is responsible.
        assign_to_all: bool,
        /// Who made the assignment, if known.
        assigned_by: Option<MemberId>,
    },
    /// A member finished a chore.
    ChoreCompleted {
        /// The chore.
        chore_id: ChoreId,
        /// Owning household.
        household_id: HouseholdId,
        /// Who did it.
        member_id: MemberId,
        /// When it was done (caller-supplied or receipt time).
        completed_at: DateTime<Utc>,
    },
    /// A member joined the household.
    MemberJoinedHousehold {
        /// The new member.
        member_id: MemberId,
        /// Initial nickname.
        nickname: String,
    },
    /// A member picked a new nickname.
    MemberNicknameChanged {
        /// The member.
        member_id: MemberId,
        /// Replacement nickname.
        new_nickname: String,
    },
    /// A member set or cleared their status line.
    MemberStatusChanged {
        /// The member.
        member_id: MemberId,
        /// New status; `None` clears it.
        status: Option<String>,
    },
    /// A member left or was removed.
    MemberRemoved {
        /// The member.
        member_id: MemberId,
    },
}

impl DomainEvent {
    /// Stable `snake_case` name of the variant, used as the storage column.
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::HouseholdCreated { .. } => "household_created",
            Self::InviteGenerated { .. } => "invite_generated",
            Self::ChoreCreated { .. } => "chore_created",
            Self::ChoreAssigned { .. } => "chore_assigned",
            Self::ChoreCompleted { .. } => "chore_completed",
            Self::MemberJoinedHousehold { .. } => "member_joined_household",
            Self::MemberNicknameChanged { .. } => "member_nickname_changed",
            Self::MemberStatusChanged { .. } => "member_status_changed",
            Self::MemberRemoved { .. } => "member_removed",
        }
    }

    /// The kind of stream this fact belongs on.
    pub const fn stream_kind(&self) -> StreamKind {
        match self {
            Self::HouseholdCreated { .. }
            | Self::InviteGenerated { .. }
            | Self::MemberJoinedHousehold { .. }
            | Self::MemberNicknameChanged { .. }
            | Self::MemberStatusChanged { .. }
            | Self::MemberRemoved { .. } => StreamKind::Household,
            Self::ChoreCreated { .. }
            | Self::ChoreAssigned { .. }
            | Self::ChoreCompleted { .. } => StreamKind::Chores,
        }
    }
}

/// A fact as stored in the log, with its position in the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Stream the fact was appended to.
    pub stream: StreamKey,
    /// 1-based position within the stream (the stream version after append).
    pub position: u64,
    /// Wall-clock time the log accepted the fact.
    pub recorded_at: DateTime<Utc>,
    /// The fact itself.
    pub event: DomainEvent,
}
