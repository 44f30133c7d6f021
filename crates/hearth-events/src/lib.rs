//! Projection engine for Hearth.
//!
//! Every read view is a pure left fold over the ordered facts of one
//! stream. Nothing here caches state or touches I/O: folding the same
//! prefix always yields the same view, so any view can be recomputed from
//! the log at any time.
//!
//! Reducers match [`DomainEvent`] exhaustively. Adding a variant to the
//! catalog is a compile error here until every projection decides what the
//! new fact means to it.
//!
//! # Modules
//!
//! - [`household`] -- household identity and name
//! - [`chores`] -- chore catalog with live assignment, completion history
//! - [`invites`] -- the currently valid invite
//! - [`members`] -- the member roster

pub mod chores;
pub mod household;
pub mod invites;
pub mod members;

use hearth_types::{DomainEvent, RecordedEvent};

pub use chores::{chore_history, chores};
pub use household::{household, household_display_name, UNKNOWN_HOUSEHOLD_NAME};
pub use invites::current_invite;
pub use members::{members, Roster};

/// Fold `events` into a view, starting from `initial`.
///
/// `reducer` sees facts strictly in append order.
pub fn fold<'a, I, S, F>(events: I, initial: S, reducer: F) -> S
where
    I: IntoIterator<Item = &'a DomainEvent>,
    F: FnMut(S, &'a DomainEvent) -> S,
{
    events.into_iter().fold(initial, reducer)
}

/// Strip log envelopes, keeping append order.
pub fn facts(recorded: &[RecordedEvent]) -> impl Iterator<Item = &DomainEvent> {
    recorded.iter().map(|r| &r.event)
}
