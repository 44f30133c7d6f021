//! The member roster.
//!
//! Facts are applied strictly in append order. A join inserts, a removal
//! deletes, and nickname or status changes only touch members currently on
//! the roster. A change for anyone else is a silent no-op, which keeps
//! replay safe when facts reference members the roster no longer holds.

use hearth_types::{DomainEvent, HouseholdId, MemberId, MemberView};

use crate::fold;

/// Members of one household in order of joining.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    household_id: HouseholdId,
    members: Vec<MemberView>,
}

impl Roster {
    /// Empty roster for `household_id`.
    pub const fn new(household_id: HouseholdId) -> Self {
        Self {
            household_id,
            members: Vec::new(),
        }
    }

    /// Apply one fact.
    #[must_use]
    pub fn apply(mut self, event: &DomainEvent) -> Self {
        match event {
            DomainEvent::MemberJoinedHousehold {
                member_id,
                nickname,
            } => {
                // A repeated join resets the entry rather than duplicating it.
                self.members.retain(|m| m.id != *member_id);
                self.members.push(MemberView {
                    id: *member_id,
                    household_id: self.household_id,
                    nickname: nickname.clone(),
                    status: None,
                });
            }
            DomainEvent::MemberNicknameChanged {
                member_id,
                new_nickname,
            } => {
                if let Some(member) = self.find_mut(*member_id) {
                    member.nickname.clone_from(new_nickname);
                }
            }
            DomainEvent::MemberStatusChanged { member_id, status } => {
                if let Some(member) = self.find_mut(*member_id) {
                    member.status.clone_from(status);
                }
            }
            DomainEvent::MemberRemoved { member_id } => {
                self.members.retain(|m| m.id != *member_id);
            }
            DomainEvent::HouseholdCreated { .. }
            | DomainEvent::InviteGenerated { .. }
            | DomainEvent::ChoreCreated { .. }
            | DomainEvent::ChoreAssigned { .. }
            | DomainEvent::ChoreCompleted { .. } => {}
        }
        self
    }

    /// Look up a member currently on the roster.
    pub fn get(&self, member_id: MemberId) -> Option<&MemberView> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// Whether `member_id` is currently on the roster.
    pub fn contains(&self, member_id: MemberId) -> bool {
        self.get(member_id).is_some()
    }

    /// Number of members.
    pub const fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nobody is on the roster.
    pub const fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Consume the roster into its member list.
    pub fn into_members(self) -> Vec<MemberView> {
        self.members
    }

    fn find_mut(&mut self, member_id: MemberId) -> Option<&mut MemberView> {
        self.members.iter_mut().find(|m| m.id == member_id)
    }
}

/// Fold a household stream into its roster.
pub fn members<'a, I>(household_id: HouseholdId, events: I) -> Roster
where
    I: IntoIterator<Item = &'a DomainEvent>,
{
    fold(events, Roster::new(household_id), Roster::apply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(id: MemberId, nickname: &str) -> DomainEvent {
        DomainEvent::MemberJoinedHousehold {
            member_id: id,
            nickname: nickname.to_owned(),
        }
    }

    #[test]
    fn empty_stream_has_no_members() {
        let events: Vec<DomainEvent> = Vec::new();
        assert!(members(HouseholdId::new(), &events).is_empty());
    }

    #[test]
    fn removal_after_join_removes() {
        let h = HouseholdId::new();
        let m = MemberId::new();
        let events = vec![joined(m, "Ann"), DomainEvent::MemberRemoved { member_id: m }];
        assert!(!members(h, &events).contains(m));
    }

    #[test]
    fn nickname_change_for_unknown_member_is_noop() {
        let h = HouseholdId::new();
        let m = MemberId::new();
        let events = vec![joined(m, "Ann")];
        let before = members(h, &events);

        let mut with_stray = events;
        with_stray.push(DomainEvent::MemberNicknameChanged {
            member_id: MemberId::new(),
            new_nickname: String::from("Ghost"),
        });
        assert_eq!(members(h, &with_stray), before);
    }

    #[test]
    fn stray_facts_after_removal_do_not_resurrect() {
        let h = HouseholdId::new();
        let m = MemberId::new();
        let events = vec![
            joined(m, "Ann"),
            DomainEvent::MemberRemoved { member_id: m },
            DomainEvent::MemberNicknameChanged {
                member_id: m,
                new_nickname: String::from("Annie"),
            },
            DomainEvent::MemberStatusChanged {
                member_id: m,
                status: Some(String::from("away")),
            },
        ];
        assert!(members(h, &events).is_empty());
    }

    #[test]
    fn changes_apply_in_order() {
        let h = HouseholdId::new();
        let m = MemberId::new();
        let events = vec![
            joined(m, "Ann"),
            DomainEvent::MemberNicknameChanged {
                member_id: m,
                new_nickname: String::from("Annie"),
            },
            DomainEvent::MemberStatusChanged {
                member_id: m,
                status: Some(String::from("on holiday")),
            },
            DomainEvent::MemberNicknameChanged {
                member_id: m,
                new_nickname: String::from("A"),
            },
        ];
        let roster = members(h, &events);
        let member = roster.get(m);
        assert_eq!(member.map(|v| v.nickname.as_str()), Some("A"));
        assert_eq!(member.and_then(|v| v.status.as_deref()), Some("on holiday"));
        assert_eq!(member.map(|v| v.household_id), Some(h));
    }
}
