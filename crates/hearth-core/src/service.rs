//! Commands and queries over household streams.
//!
//! Every command resolves one stream key, validates its input, builds
//! exactly one fact and appends it. Household creation appends with
//! [`ExpectedVersion::NoStream`]; everything else appends with
//! [`ExpectedVersion::Any`], so concurrent writers to the same stream are
//! ordered by the log and resolved by the projections' last-wins rules.
//! Every query loads a stream and folds it; nothing is cached.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hearth_db::{ActivityStore, EventLog};
use hearth_events::facts;
use hearth_types::{
    stream_key, ActivityEntry, Assignment, ChoreId, ChoreView, CompletionView, DomainEvent,
    ExpectedVersion, HouseholdId, InviteId, InviteView, MemberId, MemberView, RecordedEvent,
    StreamKind,
};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::access::{validate_pin, PinHasher};
use crate::activity::ActivityReadModel;
use crate::error::CoreError;
use crate::notify::{Notification, Notifier};

/// Result of creating a household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedHousehold {
    /// Identifier of the new household.
    pub id: HouseholdId,
    /// Its name.
    pub name: String,
}

/// Builds shareable invite links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteLinks {
    base_url: String,
}

impl InviteLinks {
    /// Links rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Link for joining `household_id` with `invite_id`.
    pub fn link(&self, household_id: HouseholdId, invite_id: InviteId) -> String {
        format!(
            "{}?household={household_id}&invite={invite_id}",
            self.base_url
        )
    }
}

/// The household command and query service.
///
/// Holds its collaborators explicitly; clone the surrounding [`Arc`] to
/// share it between request handlers.
#[derive(Debug)]
pub struct HouseholdService {
    log: Arc<EventLog>,
    activity: ActivityReadModel,
    notifier: Notifier,
    pins: PinHasher,
    invites: InviteLinks,
}

impl HouseholdService {
    /// Service appending to `log`, materializing activity into
    /// `activities`, and announcing appends through `notifier`.
    pub fn new(
        log: Arc<EventLog>,
        activities: Arc<ActivityStore>,
        notifier: Notifier,
        pins: PinHasher,
        invites: InviteLinks,
    ) -> Self {
        let activity = ActivityReadModel::new(Arc::clone(&log), activities);
        Self {
            log,
            activity,
            notifier,
            pins,
            invites,
        }
    }

    /// Service over fresh in-memory storage.
    pub fn in_memory(pins: PinHasher, invites: InviteLinks) -> Self {
        Self::new(
            Arc::new(EventLog::in_memory()),
            Arc::new(ActivityStore::in_memory()),
            Notifier::default(),
            pins,
            invites,
        )
    }

    /// Subscribe to notifications for appends made from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    // ---------------------------------------------------------------
    // Household
    // ---------------------------------------------------------------

    /// Create household `household_id` guarded by `pin`.
    ///
    /// Fails with [`CoreError::Conflict`] if the household already exists;
    /// the existing household is left untouched.
    pub async fn create_household(
        &self,
        household_id: HouseholdId,
        name: &str,
        pin: &str,
    ) -> Result<CreatedHousehold, CoreError> {
        let name = required("name", name)?;
        validate_pin(pin)?;
        let pin_credential = self.hash_pin(pin).await?;

        self.append(
            household_id,
            DomainEvent::HouseholdCreated {
                household_id,
                name: name.clone(),
                pin_credential,
            },
            ExpectedVersion::NoStream,
        )
        .await?;

        info!(%household_id, "household created");
        Ok(CreatedHousehold {
            id: household_id,
            name,
        })
    }

    /// Name of `household_id` if `pin` matches its credential.
    ///
    /// A wrong pin and a missing household both yield `None` at the same
    /// cost, so callers cannot tell them apart.
    pub async fn access_household(
        &self,
        household_id: HouseholdId,
        pin: &str,
    ) -> Result<Option<String>, CoreError> {
        let events = self.load(StreamKind::Household, household_id).await?;
        let household = hearth_events::household(facts(&events));

        let pins = self.pins;
        let pin = pin.to_owned();
        let credential = household.as_ref().map(|h| h.pin_credential.clone());
        let verified = tokio::task::spawn_blocking(move || match credential {
            Some(credential) => pins.verify(&pin, &credential),
            None => pins.verify_nothing(&pin),
        })
        .await
        .map_err(|e| CoreError::Hashing(e.to_string()))?;

        if verified {
            info!(%household_id, "household access granted");
            Ok(household.map(|h| h.name))
        } else {
            warn!(%household_id, "household access denied");
            Ok(None)
        }
    }

    /// Name of `household_id`, or `None` if it was never created.
    pub async fn household_name(
        &self,
        household_id: HouseholdId,
    ) -> Result<Option<String>, CoreError> {
        let events = self.load(StreamKind::Household, household_id).await?;
        Ok(hearth_events::household(facts(&events)).map(|h| h.name))
    }

    // ---------------------------------------------------------------
    // Invites
    // ---------------------------------------------------------------

    /// Issue a new invite, invalidating any earlier one.
    pub async fn generate_invite(
        &self,
        household_id: HouseholdId,
    ) -> Result<InviteView, CoreError> {
        let invite_id = InviteId::new();
        let link = self.invites.link(household_id, invite_id);

        self.append(
            household_id,
            DomainEvent::InviteGenerated {
                household_id,
                invite_id,
                link: link.clone(),
            },
            ExpectedVersion::Any,
        )
        .await?;

        info!(%household_id, %invite_id, "invite generated");
        Ok(InviteView {
            invite_id,
            household_id,
            link,
        })
    }

    /// The invite currently valid for `household_id`, if any.
    pub async fn current_invite(
        &self,
        household_id: HouseholdId,
    ) -> Result<Option<InviteView>, CoreError> {
        let events = self.load(StreamKind::Household, household_id).await?;
        Ok(hearth_events::current_invite(facts(&events)))
    }

    // ---------------------------------------------------------------
    // Chores
    // ---------------------------------------------------------------

    /// Add a chore to `household_id`.
    pub async fn add_chore(
        &self,
        household_id: HouseholdId,
        display_name: &str,
        description: &str,
    ) -> Result<ChoreView, CoreError> {
        let display_name = required("display name", display_name)?;
        let description = description.trim().to_owned();
        let chore_id = ChoreId::new();

        self.append(
            household_id,
            DomainEvent::ChoreCreated {
                chore_id,
                household_id,
                display_name: display_name.clone(),
                description: description.clone(),
            },
            ExpectedVersion::Any,
        )
        .await?;

        info!(%household_id, %chore_id, "chore added");
        Ok(ChoreView {
            id: chore_id,
            household_id,
            display_name,
            description,
            assignment: None,
        })
    }

    /// Replace the assignment of `chore_id`.
    ///
    /// With `assign_to_all` set the member list is ignored. An empty list
    /// without `assign_to_all` unassigns the chore.
    pub async fn assign_chore(
        &self,
        household_id: HouseholdId,
        chore_id: ChoreId,
        assignment: Assignment,
    ) -> Result<Assignment, CoreError> {
        let Assignment {
            member_ids,
            assign_to_all,
            assigned_by,
        } = assignment;
        let member_ids = if assign_to_all { Vec::new() } else { member_ids };

        self.append(
            household_id,
            DomainEvent::ChoreAssigned {
                chore_id,
                household_id,
                member_ids: (!assign_to_all).then(|| member_ids.clone()),
                assign_to_all,
                assigned_by,
            },
            ExpectedVersion::Any,
        )
        .await?;

        info!(%household_id, %chore_id, assign_to_all, assignees = member_ids.len(), "chore assigned");
        Ok(Assignment {
            member_ids,
            assign_to_all,
            assigned_by,
        })
    }

    /// Record that `member_id` completed `chore_id`.
    ///
    /// `completed_at` defaults to now. A timestamp in the future is clamped
    /// to now.
    pub async fn complete_chore(
        &self,
        household_id: HouseholdId,
        chore_id: ChoreId,
        member_id: MemberId,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<CompletionView, CoreError> {
        let now = Utc::now();
        let completed_at = match completed_at {
            Some(at) if at > now => {
                warn!(%household_id, %chore_id, requested = %at, "future completion time clamped");
                now
            }
            Some(at) => at,
            None => now,
        };

        self.append(
            household_id,
            DomainEvent::ChoreCompleted {
                chore_id,
                household_id,
                member_id,
                completed_at,
            },
            ExpectedVersion::Any,
        )
        .await?;

        info!(%household_id, %chore_id, %member_id, "chore completed");
        Ok(CompletionView {
            chore_id,
            member_id,
            completed_at,
        })
    }

    /// Chores of `household_id` with their live assignment, in creation
    /// order.
    pub async fn list_chores(&self, household_id: HouseholdId) -> Result<Vec<ChoreView>, CoreError> {
        let events = self.load(StreamKind::Chores, household_id).await?;
        Ok(hearth_events::chores(facts(&events)))
    }

    /// Completions of `chore_id`, most recent first.
    pub async fn chore_history(
        &self,
        household_id: HouseholdId,
        chore_id: ChoreId,
    ) -> Result<Vec<CompletionView>, CoreError> {
        let events = self.load(StreamKind::Chores, household_id).await?;
        Ok(hearth_events::chore_history(chore_id, facts(&events)))
    }

    // ---------------------------------------------------------------
    // Members
    // ---------------------------------------------------------------

    /// Join `household_id` using its current invite.
    ///
    /// Fails with [`CoreError::StaleInvite`] if `invite_id` is not the
    /// household's most recent invite.
    pub async fn join_household(
        &self,
        household_id: HouseholdId,
        invite_id: InviteId,
        nickname: &str,
    ) -> Result<MemberView, CoreError> {
        let nickname = required("nickname", nickname)?;
        let events = self.load(StreamKind::Household, household_id).await?;
        let current = hearth_events::current_invite(facts(&events));
        if current.is_none_or(|invite| invite.invite_id != invite_id) {
            warn!(%household_id, %invite_id, "join with stale invite rejected");
            return Err(CoreError::StaleInvite);
        }

        let member_id = MemberId::new();
        self.append(
            household_id,
            DomainEvent::MemberJoinedHousehold {
                member_id,
                nickname: nickname.clone(),
            },
            ExpectedVersion::Any,
        )
        .await?;

        info!(%household_id, %member_id, "member joined");
        Ok(MemberView {
            id: member_id,
            household_id,
            nickname,
            status: None,
        })
    }

    /// Rename a member. Renaming someone not on the roster has no effect.
    pub async fn change_nickname(
        &self,
        household_id: HouseholdId,
        member_id: MemberId,
        new_nickname: &str,
    ) -> Result<(), CoreError> {
        let new_nickname = required("nickname", new_nickname)?;
        self.append(
            household_id,
            DomainEvent::MemberNicknameChanged {
                member_id,
                new_nickname,
            },
            ExpectedVersion::Any,
        )
        .await?;
        info!(%household_id, %member_id, "nickname changed");
        Ok(())
    }

    /// Set or clear a member's status. A blank status clears it.
    pub async fn change_status(
        &self,
        household_id: HouseholdId,
        member_id: MemberId,
        status: Option<&str>,
    ) -> Result<(), CoreError> {
        let status = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        self.append(
            household_id,
            DomainEvent::MemberStatusChanged { member_id, status },
            ExpectedVersion::Any,
        )
        .await?;
        info!(%household_id, %member_id, "status changed");
        Ok(())
    }

    /// Remove a member from the roster.
    pub async fn remove_member(
        &self,
        household_id: HouseholdId,
        member_id: MemberId,
    ) -> Result<(), CoreError> {
        self.append(
            household_id,
            DomainEvent::MemberRemoved { member_id },
            ExpectedVersion::Any,
        )
        .await?;
        info!(%household_id, %member_id, "member removed");
        Ok(())
    }

    /// Current members of `household_id` in order of joining.
    pub async fn list_members(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<MemberView>, CoreError> {
        let events = self.load(StreamKind::Household, household_id).await?;
        Ok(hearth_events::members(household_id, facts(&events)).into_members())
    }

    // ---------------------------------------------------------------
    // Activity
    // ---------------------------------------------------------------

    /// Rebuild the activity feed of `household_id`; returns the number of
    /// facts folded.
    pub async fn rebuild_activities(&self, household_id: HouseholdId) -> Result<usize, CoreError> {
        self.activity.rebuild(household_id).await
    }

    /// Published activity of `household_id`, newest first.
    pub async fn get_activities(
        &self,
        household_id: HouseholdId,
        days: Option<u32>,
        limit: Option<usize>,
    ) -> Result<Vec<ActivityEntry>, CoreError> {
        self.activity.get_activities(household_id, days, limit).await
    }

    // ---------------------------------------------------------------
    // Plumbing
    // ---------------------------------------------------------------

    async fn load(
        &self,
        kind: StreamKind,
        household_id: HouseholdId,
    ) -> Result<Vec<RecordedEvent>, CoreError> {
        Ok(self.log.load(&stream_key(kind, household_id)).await?)
    }

    /// Append `event` to the stream it belongs to, then announce it.
    async fn append(
        &self,
        household_id: HouseholdId,
        event: DomainEvent,
        expected: ExpectedVersion,
    ) -> Result<RecordedEvent, CoreError> {
        let stream = stream_key(event.stream_kind(), household_id);
        let recorded = self
            .log
            .append(&stream, event, expected)
            .await
            .inspect_err(|e| warn!(%stream, %expected, error = %e, "append rejected"))?;
        self.notifier.publish(household_id, &recorded.event);
        Ok(recorded)
    }

    async fn hash_pin(&self, pin: &str) -> Result<String, CoreError> {
        let pins = self.pins;
        let pin = pin.to_owned();
        tokio::task::spawn_blocking(move || pins.create_credential(&pin))
            .await
            .map_err(|e| CoreError::Hashing(e.to_string()))
    }
}

/// Trimmed `value`, or [`CoreError::InvalidInput`] naming `field` if blank.
fn required(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CoreError::InvalidInput(format!("{field} must not be empty")))
    } else {
        Ok(trimmed.to_owned())
    }
}
