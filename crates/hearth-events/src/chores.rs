//! Chore catalog, live assignment and completion history.
//!
//! Display fields come from the first `ChoreCreated` per chore id. The
//! assignment is whatever the last `ChoreAssigned` for that id said,
//! decided by log position alone: embedded timestamps play no part.

use std::collections::BTreeMap;

use hearth_types::{Assignment, ChoreId, ChoreView, CompletionView, DomainEvent};

use crate::fold;

#[derive(Default)]
struct Catalog {
    /// Chores in order of first creation.
    chores: Vec<ChoreView>,
    /// Latest assignment per chore id, by log position.
    assignments: BTreeMap<ChoreId, Assignment>,
}

impl Catalog {
    fn apply(mut self, event: &DomainEvent) -> Self {
        match event {
            DomainEvent::ChoreCreated {
                chore_id,
                household_id,
                display_name,
                description,
            } => {
                if !self.chores.iter().any(|c| c.id == *chore_id) {
                    self.chores.push(ChoreView {
                        id: *chore_id,
                        household_id: *household_id,
                        display_name: display_name.clone(),
                        description: description.clone(),
                        assignment: None,
                    });
                }
            }
            DomainEvent::ChoreAssigned {
                chore_id,
                member_ids,
                assign_to_all,
                assigned_by,
                ..
            } => {
                self.assignments.insert(
                    *chore_id,
                    Assignment {
                        member_ids: member_ids.clone().unwrap_or_default(),
                        assign_to_all: *assign_to_all,
                        assigned_by: *assigned_by,
                    },
                );
            }
            DomainEvent::HouseholdCreated { .. }
            | DomainEvent::InviteGenerated { .. }
            | DomainEvent::ChoreCompleted { .. }
            | DomainEvent::MemberJoinedHousehold { .. }
            | DomainEvent::MemberNicknameChanged { .. }
            | DomainEvent::MemberStatusChanged { .. }
            | DomainEvent::MemberRemoved { .. } => {}
        }
        self
    }

    fn finish(self) -> Vec<ChoreView> {
        let Self {
            mut chores,
            mut assignments,
        } = self;
        for chore in &mut chores {
            chore.assignment = assignments.remove(&chore.id);
        }
        chores
    }
}

/// Fold a chores stream into the catalog, each chore carrying its current
/// assignment. Chores are listed in order of creation.
pub fn chores<'a, I>(events: I) -> Vec<ChoreView>
where
    I: IntoIterator<Item = &'a DomainEvent>,
{
    fold(events, Catalog::default(), Catalog::apply).finish()
}

/// Completions of `chore_id`, newest `completed_at` first.
///
/// Completions with equal timestamps keep their append order. Since the
/// timestamp is supplied by the caller, this order can differ from the log.
pub fn chore_history<'a, I>(chore_id: ChoreId, events: I) -> Vec<CompletionView>
where
    I: IntoIterator<Item = &'a DomainEvent>,
{
    let mut history = fold(events, Vec::new(), |mut acc: Vec<CompletionView>, event| {
        match event {
            DomainEvent::ChoreCompleted {
                chore_id: id,
                member_id,
                completed_at,
                ..
            } if *id == chore_id => acc.push(CompletionView {
                chore_id: *id,
                member_id: *member_id,
                completed_at: *completed_at,
            }),
            DomainEvent::ChoreCompleted { .. }
            | DomainEvent::HouseholdCreated { .. }
            | DomainEvent::InviteGenerated { .. }
            | DomainEvent::ChoreCreated { .. }
            | DomainEvent::ChoreAssigned { .. }
            | DomainEvent::MemberJoinedHousehold { .. }
            | DomainEvent::MemberNicknameChanged { .. }
            | DomainEvent::MemberStatusChanged { .. }
            | DomainEvent::MemberRemoved { .. } => {}
        }
        acc
    });
    // Stable sort: ties stay in append order.
    history.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    history
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use hearth_types::{HouseholdId, MemberId};

    use super::*;

    fn created(household: HouseholdId, chore: ChoreId, name: &str) -> DomainEvent {
        DomainEvent::ChoreCreated {
            chore_id: chore,
            household_id: household,
            display_name: name.to_owned(),
            description: String::new(),
        }
    }

    fn assigned(household: HouseholdId, chore: ChoreId, member: MemberId) -> DomainEvent {
        DomainEvent::ChoreAssigned {
            chore_id: chore,
            household_id: household,
            member_ids: Some(vec![member]),
            assign_to_all: false,
            assigned_by: None,
        }
    }

    fn completed(
        household: HouseholdId,
        chore: ChoreId,
        member: MemberId,
        at: chrono::DateTime<Utc>,
    ) -> DomainEvent {
        DomainEvent::ChoreCompleted {
            chore_id: chore,
            household_id: household,
            member_id: member,
            completed_at: at,
        }
    }

    #[test]
    fn empty_stream_has_no_chores() {
        let events: Vec<DomainEvent> = Vec::new();
        assert!(chores(&events).is_empty());
    }

    #[test]
    fn last_assignment_wins_by_position() {
        let h = HouseholdId::new();
        let x = ChoreId::new();
        let a = MemberId::new();
        let b = MemberId::new();
        let events = vec![created(h, x, "Dishes"), assigned(h, x, a), assigned(h, x, b)];

        let catalog = chores(&events);
        assert_eq!(catalog.len(), 1);
        let assignment = catalog.first().and_then(|c| c.assignment.clone());
        assert_eq!(assignment.map(|a| a.member_ids), Some(vec![b]));
    }

    #[test]
    fn first_creation_defines_display_fields() {
        let h = HouseholdId::new();
        let x = ChoreId::new();
        let events = vec![created(h, x, "Dishes"), created(h, x, "Laundry")];
        let catalog = chores(&events);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.first().map(|c| c.display_name.as_str()), Some("Dishes"));
    }

    #[test]
    fn assign_to_all_without_member_list() {
        let h = HouseholdId::new();
        let x = ChoreId::new();
        let by = MemberId::new();
        let events = vec![
            created(h, x, "Trash"),
            DomainEvent::ChoreAssigned {
                chore_id: x,
                household_id: h,
                member_ids: None,
                assign_to_all: true,
                assigned_by: Some(by),
            },
        ];
        let assignment = chores(&events).first().and_then(|c| c.assignment.clone());
        assert_eq!(
            assignment,
            Some(Assignment {
                member_ids: Vec::new(),
                assign_to_all: true,
                assigned_by: Some(by),
            })
        );
    }

    #[test]
    fn catalog_keeps_creation_order() {
        let h = HouseholdId::new();
        let first = ChoreId::new();
        let second = ChoreId::new();
        let events = vec![created(h, second, "B"), created(h, first, "A")];
        let ids: Vec<ChoreId> = chores(&events).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn history_is_descending_by_timestamp_not_append_order() {
        let h = HouseholdId::new();
        let x = ChoreId::new();
        let m = MemberId::new();
        let t1 = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).single().unwrap_or_default();
        let t2 = t1 + Duration::hours(3);
        let events = vec![completed(h, x, m, t2), completed(h, x, m, t1)];

        let stamps: Vec<_> = chore_history(x, &events).iter().map(|c| c.completed_at).collect();
        assert_eq!(stamps, vec![t2, t1]);

        let reversed = vec![completed(h, x, m, t1), completed(h, x, m, t2)];
        let stamps: Vec<_> = chore_history(x, &reversed).iter().map(|c| c.completed_at).collect();
        assert_eq!(stamps, vec![t2, t1]);
    }

    #[test]
    fn history_ties_keep_append_order() {
        let h = HouseholdId::new();
        let x = ChoreId::new();
        let first = MemberId::new();
        let second = MemberId::new();
        let t = Utc::now();
        let events = vec![completed(h, x, first, t), completed(h, x, second, t)];
        let who: Vec<_> = chore_history(x, &events).iter().map(|c| c.member_id).collect();
        assert_eq!(who, vec![first, second]);
    }

    #[test]
    fn history_filters_by_chore() {
        let h = HouseholdId::new();
        let x = ChoreId::new();
        let y = ChoreId::new();
        let m = MemberId::new();
        let events = vec![completed(h, x, m, Utc::now()), completed(h, y, m, Utc::now())];
        assert_eq!(chore_history(x, &events).len(), 1);
        assert!(chore_history(ChoreId::new(), &events).is_empty());
    }
}
