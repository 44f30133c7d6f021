//! Household identity.
//!
//! The first `HouseholdCreated` fact defines the household. The log refuses
//! a second one, but if one ever slipped in it is ignored.

use hearth_types::{DomainEvent, HouseholdView};

use crate::fold;

/// Name reported for a household whose stream holds no creation fact.
pub const UNKNOWN_HOUSEHOLD_NAME: &str = "Unknown";

/// Fold the household stream into its identity, or `None` if it was never
/// created.
pub fn household<'a, I>(events: I) -> Option<HouseholdView>
where
    I: IntoIterator<Item = &'a DomainEvent>,
{
    fold(events, None, |state: Option<HouseholdView>, event| match event {
        DomainEvent::HouseholdCreated {
            household_id,
            name,
            pin_credential,
        } if state.is_none() => Some(HouseholdView {
            id: *household_id,
            name: name.clone(),
            pin_credential: pin_credential.clone(),
        }),
        DomainEvent::HouseholdCreated { .. }
        | DomainEvent::InviteGenerated { .. }
        | DomainEvent::ChoreCreated { .. }
        | DomainEvent::ChoreAssigned { .. }
        | DomainEvent::ChoreCompleted { .. }
        | DomainEvent::MemberJoinedHousehold { .. }
        | DomainEvent::MemberNicknameChanged { .. }
        | DomainEvent::MemberStatusChanged { .. }
        | DomainEvent::MemberRemoved { .. } => state,
    })
}

/// Household name, or [`UNKNOWN_HOUSEHOLD_NAME`] when the stream is empty.
pub fn household_display_name<'a, I>(events: I) -> String
where
    I: IntoIterator<Item = &'a DomainEvent>,
{
    household(events).map_or_else(|| UNKNOWN_HOUSEHOLD_NAME.to_owned(), |h| h.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_types::{HouseholdId, MemberId};

    fn created(id: HouseholdId, name: &str) -> DomainEvent {
        DomainEvent::HouseholdCreated {
            household_id: id,
            name: name.to_owned(),
            pin_credential: String::from("cred"),
        }
    }

    #[test]
    fn empty_stream_is_unknown() {
        let events: Vec<DomainEvent> = Vec::new();
        assert!(household(&events).is_none());
        assert_eq!(household_display_name(&events), "Unknown");
    }

    #[test]
    fn first_creation_wins() {
        let id = HouseholdId::new();
        let events = vec![
            created(id, "Smiths"),
            DomainEvent::MemberJoinedHousehold {
                member_id: MemberId::new(),
                nickname: String::from("Ann"),
            },
            created(id, "Joneses"),
        ];
        let view = household(&events);
        assert_eq!(view.as_ref().map(|h| h.name.as_str()), Some("Smiths"));
        assert_eq!(view.map(|h| h.id), Some(id));
    }
}
