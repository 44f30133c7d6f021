//! Shared type definitions for Hearth.
//!
//! This crate is the single source of truth for identifiers, stream
//! addresses, the event catalog and the read views. Wire types flow
//! downstream to `TypeScript` via `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`stream`] -- Stream addressing and the expected-version precondition
//! - [`events`] -- The closed catalog of domain facts
//! - [`views`] -- Read views produced by the projection engine

pub mod events;
pub mod ids;
pub mod stream;
pub mod views;

// Re-export all public types at crate root for convenience.
pub use events::{DomainEvent, RecordedEvent};
pub use ids::{ChoreId, HouseholdId, InviteId, MemberId};
pub use stream::{stream_key, ExpectedVersion, StreamKey, StreamKind};
pub use views::{
    ActivityEntry, Assignment, ChoreView, CompletionView, HouseholdView, InviteView, MemberView,
};
