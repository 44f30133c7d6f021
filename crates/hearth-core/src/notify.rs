//! Best-effort change notifications.
//!
//! After a successful append the service publishes a [`Notification`] on a
//! broadcast channel. Delivery is fire-and-forget: with no subscribers the
//! message is dropped, and a subscriber that falls behind by more than the
//! channel capacity receives [`broadcast::error::RecvError::Lagged`] and
//! skips to the newest message. Nothing ever waits on a notification.
//!
//! There is one channel for every household. Subscribers filter by
//! [`Notification::household_id`], but capacity is shared, so a burst from
//! one busy household can make a subscriber to a quiet household lag and
//! skip messages, including some for its own household. Clients that
//! care re-read the views after a lag.

use hearth_types::{DomainEvent, HouseholdId};
use serde::Serialize;
use tokio::sync::broadcast;

/// Default capacity of the notification channel.
pub const NOTIFICATION_CAPACITY: usize = 256;

/// What changed, for clients that do not want to inspect the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A chore was added.
    ChoreCreated,
    /// A chore's assignment changed.
    ChoreAssigned,
    /// A chore was completed.
    ChoreCompleted,
    /// A member joined.
    MemberJoined,
    /// A member was removed.
    MemberRemoved,
    /// A member's status changed.
    MemberStatusChanged,
    /// A member's nickname changed.
    MemberNicknameChanged,
}

impl NotificationKind {
    /// Kind announced for `event`, or `None` for facts that are not
    /// broadcast (household creation and invite generation).
    pub const fn for_event(event: &DomainEvent) -> Option<Self> {
        match event {
            DomainEvent::HouseholdCreated { .. } | DomainEvent::InviteGenerated { .. } => None,
            DomainEvent::ChoreCreated { .. } => Some(Self::ChoreCreated),
            DomainEvent::ChoreAssigned { .. } => Some(Self::ChoreAssigned),
            DomainEvent::ChoreCompleted { .. } => Some(Self::ChoreCompleted),
            DomainEvent::MemberJoinedHousehold { .. } => Some(Self::MemberJoined),
            DomainEvent::MemberNicknameChanged { .. } => Some(Self::MemberNicknameChanged),
            DomainEvent::MemberStatusChanged { .. } => Some(Self::MemberStatusChanged),
            DomainEvent::MemberRemoved { .. } => Some(Self::MemberRemoved),
        }
    }
}

/// A change pushed to real-time clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Household the fact belongs to.
    pub household_id: HouseholdId,
    /// Coarse change kind.
    pub kind: NotificationKind,
    /// The appended fact.
    pub event: DomainEvent,
}

/// Sending half of the notification channel.
///
/// Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    /// A channel holding up to `capacity` undelivered notifications per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to every notification published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Announce `event` for `household_id`.
    ///
    /// Returns the number of subscribers reached. Facts that are not
    /// broadcast, and sends with nobody listening, return 0.
    pub fn publish(&self, household_id: HouseholdId, event: &DomainEvent) -> usize {
        let Some(kind) = NotificationKind::for_event(event) else {
            return 0;
        };
        let notification = Notification {
            household_id,
            kind,
            event: event.clone(),
        };
        // send only fails when there are no receivers.
        let reached = self.tx.send(notification).unwrap_or(0);
        tracing::debug!(%household_id, ?kind, reached, "notification published");
        reached
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(NOTIFICATION_CAPACITY)
    }
}
