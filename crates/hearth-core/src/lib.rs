//! Command and query layer for Hearth.
//!
//! [`HouseholdService`] turns validated commands into single appended
//! facts and answers queries by folding streams through `hearth-events`.
//! Pin credentials, the activity feed and change notifications live here
//! too, alongside the configuration every binary loads.
//!
//! # Modules
//!
//! - [`service`] -- the household command and query service
//! - [`access`] -- pin credential creation and verification
//! - [`activity`] -- the materialized activity feed
//! - [`notify`] -- post-append broadcast notifications
//! - [`config`] -- `hearth-config.yaml` loading into typed structs
//! - [`error`] -- service errors

pub mod access;
pub mod activity;
pub mod config;
pub mod error;
pub mod notify;
pub mod service;

pub use access::{create_pin_credential, validate_pin, verify_pin, PinHasher};
pub use activity::ActivityReadModel;
pub use config::{ConfigError, HearthConfig};
pub use error::CoreError;
pub use notify::{Notification, NotificationKind, Notifier};
pub use service::{CreatedHousehold, HouseholdService, InviteLinks};
