//! Household activity feed.
//!
//! The feed is the one materialized read model. [`ActivityReadModel::rebuild`]
//! replays a household's two streams from the beginning, turns every fact
//! into exactly one [`ActivityEntry`], and replaces the stored feed in one
//! step. Readers see either the old feed or the new one, never a mix.
//! Appends do not touch the feed; it is only as fresh as the last rebuild.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use hearth_db::{ActivityStore, EventLog};
use hearth_types::{
    stream_key, ActivityEntry, ChoreId, DomainEvent, HouseholdId, MemberId, RecordedEvent,
    StreamKind,
};
use tracing::{debug, info};

use crate::error::CoreError;

/// Placeholder for a member whose nickname never appears in the log.
const UNKNOWN_MEMBER: &str = "Someone";

/// Placeholder for a chore whose creation never appears in the log.
const UNKNOWN_CHORE: &str = "a chore";

/// Rebuilds and serves the activity feed of each household.
#[derive(Debug, Clone)]
pub struct ActivityReadModel {
    log: Arc<EventLog>,
    store: Arc<ActivityStore>,
}

impl ActivityReadModel {
    /// Read model over `log`, publishing into `store`.
    pub const fn new(log: Arc<EventLog>, store: Arc<ActivityStore>) -> Self {
        Self { log, store }
    }

    /// Recompute the feed of `household_id` from scratch and publish it.
    ///
    /// Returns the number of facts folded, which equals the number of
    /// entries published.
    pub async fn rebuild(&self, household_id: HouseholdId) -> Result<usize, CoreError> {
        let household = self
            .log
            .load(&stream_key(StreamKind::Household, household_id))
            .await?;
        let chores = self
            .log
            .load(&stream_key(StreamKind::Chores, household_id))
            .await?;

        let entries = describe_history(household_id, &household, &chores);
        let count = entries.len();
        self.store.replace(household_id, entries).await?;

        info!(%household_id, count, "activity feed rebuilt");
        Ok(count)
    }

    /// Published feed of `household_id`, newest first, restricted to the
    /// last `days` days and at most `limit` entries. A household that was
    /// never rebuilt has an empty feed.
    pub async fn get_activities(
        &self,
        household_id: HouseholdId,
        days: Option<u32>,
        limit: Option<usize>,
    ) -> Result<Vec<ActivityEntry>, CoreError> {
        let entries = self.store.get(household_id).await?;
        Ok(window(entries, days, limit, Utc::now()))
    }
}

/// Restrict newest-first `entries` to those that occurred within `days` of
/// `now`, then keep at most `limit`.
pub fn window(
    mut entries: Vec<ActivityEntry>,
    days: Option<u32>,
    limit: Option<usize>,
    now: DateTime<Utc>,
) -> Vec<ActivityEntry> {
    // A window reaching past the representable range keeps everything.
    if let Some(cutoff) = days
        .and_then(|d| TimeDelta::try_days(i64::from(d)))
        .and_then(|span| now.checked_sub_signed(span))
    {
        entries.retain(|e| e.occurred_at >= cutoff);
    }
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

/// Turn the full history of a household into feed entries.
///
/// Each stream keeps its append order. The two are interleaved by recording
/// time, household stream first on ties, and numbered in that order. Names
/// are resolved from the same replay: a member is called by the nickname
/// they had when the fact was recorded, falling back to their last known
/// nickname.
pub fn describe_history(
    household_id: HouseholdId,
    household: &[RecordedEvent],
    chores: &[RecordedEvent],
) -> Vec<ActivityEntry> {
    let merged = interleave(household, chores);

    let mut names = Names::from_history(&merged);
    let mut entries = Vec::with_capacity(merged.len());
    for (sequence, recorded) in (0_u64..).zip(merged) {
        entries.push(names.entry(household_id, sequence, recorded));
    }
    debug!(%household_id, facts = entries.len(), "activity replay complete");
    entries
}

/// Merge two streams without reordering either one. Recording times are
/// only compared between the heads of the two streams.
fn interleave<'a>(
    household: &'a [RecordedEvent],
    chores: &'a [RecordedEvent],
) -> Vec<&'a RecordedEvent> {
    let by_position = |stream: &'a [RecordedEvent]| {
        let mut facts: Vec<&RecordedEvent> = stream.iter().collect();
        facts.sort_by_key(|r| r.position);
        facts
    };
    let mut left = by_position(household).into_iter().peekable();
    let mut right = by_position(chores).into_iter().peekable();

    let mut merged = Vec::with_capacity(household.len().saturating_add(chores.len()));
    loop {
        let next = match (left.peek(), right.peek()) {
            (Some(h), Some(c)) if c.recorded_at < h.recorded_at => right.next(),
            (Some(_), _) => left.next(),
            (None, Some(_)) => right.next(),
            (None, None) => break,
        };
        merged.extend(next);
    }
    merged
}

/// Name resolution while replaying.
#[derive(Debug, Default)]
struct Names {
    chores: BTreeMap<ChoreId, String>,
    /// Nickname as of the fact being described.
    current: BTreeMap<MemberId, String>,
    /// Last nickname seen anywhere in the history.
    last_known: BTreeMap<MemberId, String>,
}

impl Names {
    fn from_history(history: &[&RecordedEvent]) -> Self {
        let mut names = Self::default();
        for recorded in history {
            match &recorded.event {
                DomainEvent::ChoreCreated {
                    chore_id,
                    display_name,
                    ..
                } => {
                    names
                        .chores
                        .entry(*chore_id)
                        .or_insert_with(|| display_name.clone());
                }
                DomainEvent::MemberJoinedHousehold {
                    member_id,
                    nickname,
                } => {
                    names.last_known.insert(*member_id, nickname.clone());
                }
                DomainEvent::MemberNicknameChanged {
                    member_id,
                    new_nickname,
                } => {
                    names.last_known.insert(*member_id, new_nickname.clone());
                }
                DomainEvent::HouseholdCreated { .. }
                | DomainEvent::InviteGenerated { .. }
                | DomainEvent::ChoreAssigned { .. }
                | DomainEvent::ChoreCompleted { .. }
                | DomainEvent::MemberStatusChanged { .. }
                | DomainEvent::MemberRemoved { .. } => {}
            }
        }
        names
    }

    fn member(&self, id: MemberId) -> &str {
        self.current
            .get(&id)
            .or_else(|| self.last_known.get(&id))
            .map_or(UNKNOWN_MEMBER, String::as_str)
    }

    fn chore(&self, id: ChoreId) -> &str {
        self.chores.get(&id).map_or(UNKNOWN_CHORE, String::as_str)
    }

    fn entry(
        &mut self,
        household_id: HouseholdId,
        sequence: u64,
        recorded: &RecordedEvent,
    ) -> ActivityEntry {
        let (description, member_id, chore_id) = match &recorded.event {
            DomainEvent::HouseholdCreated { name, .. } => {
                (format!("Household \"{name}\" was created"), None, None)
            }
            DomainEvent::InviteGenerated { .. } => {
                (String::from("A new invite link was generated"), None, None)
            }
            DomainEvent::ChoreCreated {
                chore_id,
                display_name,
                ..
            } => (
                format!("Chore \"{display_name}\" was added"),
                None,
                Some(*chore_id),
            ),
            DomainEvent::ChoreAssigned {
                chore_id,
                member_ids,
                assign_to_all,
                assigned_by,
                ..
            } => (
                self.describe_assignment(*chore_id, member_ids.as_deref(), *assign_to_all, *assigned_by),
                *assigned_by,
                Some(*chore_id),
            ),
            DomainEvent::ChoreCompleted {
                chore_id,
                member_id,
                ..
            } => (
                format!(
                    "{} completed \"{}\"",
                    self.member(*member_id),
                    self.chore(*chore_id)
                ),
                Some(*member_id),
                Some(*chore_id),
            ),
            DomainEvent::MemberJoinedHousehold {
                member_id,
                nickname,
            } => {
                self.current.insert(*member_id, nickname.clone());
                (
                    format!("{nickname} joined the household"),
                    Some(*member_id),
                    None,
                )
            }
            DomainEvent::MemberNicknameChanged {
                member_id,
                new_nickname,
            } => {
                let description =
                    format!("{} is now known as {new_nickname}", self.member(*member_id));
                self.current.insert(*member_id, new_nickname.clone());
                (description, Some(*member_id), None)
            }
            DomainEvent::MemberStatusChanged { member_id, status } => {
                let who = self.member(*member_id);
                let description = match status {
                    Some(status) => format!("{who} set their status to \"{status}\""),
                    None => format!("{who} cleared their status"),
                };
                (description, Some(*member_id), None)
            }
            DomainEvent::MemberRemoved { member_id } => (
                format!("{} left the household", self.member(*member_id)),
                Some(*member_id),
                None,
            ),
        };

        ActivityEntry {
            household_id,
            sequence,
            kind: recorded.event.event_type().to_owned(),
            description,
            member_id,
            chore_id,
            occurred_at: recorded.recorded_at,
        }
    }

    fn describe_assignment(
        &self,
        chore_id: ChoreId,
        member_ids: Option<&[MemberId]>,
        assign_to_all: bool,
        assigned_by: Option<MemberId>,
    ) -> String {
        let chore = self.chore(chore_id);
        let mut description = if assign_to_all {
            format!("\"{chore}\" was assigned to everyone")
        } else {
            let assignees: Vec<&str> = member_ids
                .unwrap_or_default()
                .iter()
                .map(|id| self.member(*id))
                .collect();
            if assignees.is_empty() {
                format!("\"{chore}\" was unassigned")
            } else {
                format!("\"{chore}\" was assigned to {}", assignees.join(", "))
            }
        };
        if let Some(by) = assigned_by {
            description.push_str(" by ");
            description.push_str(self.member(by));
        }
        description
    }
}
