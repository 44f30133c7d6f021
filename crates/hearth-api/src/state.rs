//! Shared application state for the API server.
//!
//! [`AppState`] is wrapped in [`Arc`] and injected via Axum's `State`
//! extractor. It holds the household service and the defaults applied to
//! activity queries that omit `days` or `limit`.

use std::sync::Arc;

use hearth_core::config::ActivityConfig;
use hearth_core::{HouseholdService, Notification};
use tokio::sync::broadcast;

/// Shared state for all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The household command and query service.
    pub service: Arc<HouseholdService>,
    /// Defaults for activity queries.
    pub activity_defaults: ActivityConfig,
}

impl AppState {
    /// State serving `service` with unbounded activity queries.
    pub fn new(service: Arc<HouseholdService>) -> Self {
        Self {
            service,
            activity_defaults: ActivityConfig::default(),
        }
    }

    /// Apply `defaults` to activity queries that leave parameters unset.
    #[must_use]
    pub fn with_activity_defaults(mut self, defaults: ActivityConfig) -> Self {
        self.activity_defaults = defaults;
        self
    }

    /// Subscribe to notifications for every household.
    ///
    /// Callers filter by household themselves.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.service.subscribe()
    }
}
