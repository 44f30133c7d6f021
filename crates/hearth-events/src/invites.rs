//! The currently valid invite.
//!
//! Only the most recently appended invite is valid. Generating a new one
//! invalidates the previous one without any explicit revocation fact.

use hearth_types::{DomainEvent, InviteView};

use crate::fold;

/// Fold the household stream into its current invite, if any.
pub fn current_invite<'a, I>(events: I) -> Option<InviteView>
where
    I: IntoIterator<Item = &'a DomainEvent>,
{
    fold(events, None, |current, event| match event {
        DomainEvent::InviteGenerated {
            household_id,
            invite_id,
            link,
        } => Some(InviteView {
            invite_id: *invite_id,
            household_id: *household_id,
            link: link.clone(),
        }),
        DomainEvent::HouseholdCreated { .. }
        | DomainEvent::ChoreCreated { .. }
        | DomainEvent::ChoreAssigned { .. }
        | DomainEvent::ChoreCompleted { .. }
        | DomainEvent::MemberJoinedHousehold { .. }
        | DomainEvent::MemberNicknameChanged { .. }
        | DomainEvent::MemberStatusChanged { .. }
        | DomainEvent::MemberRemoved { .. } => current,
    })
}

#[cfg(test)]
mod tests {
    use hearth_types::{HouseholdId, InviteId};

    use super::*;

    fn invite(household: HouseholdId, id: InviteId) -> DomainEvent {
        DomainEvent::InviteGenerated {
            household_id: household,
            invite_id: id,
            link: format!("https://example.test/join/{id}"),
        }
    }

    #[test]
    fn no_invite_on_empty_stream() {
        let events: Vec<DomainEvent> = Vec::new();
        assert!(current_invite(&events).is_none());
    }

    #[test]
    fn newest_invite_replaces_older() {
        let h = HouseholdId::new();
        let old = InviteId::new();
        let new = InviteId::new();
        let events = vec![invite(h, old), invite(h, new)];
        assert_eq!(current_invite(&events).map(|i| i.invite_id), Some(new));
    }
}
