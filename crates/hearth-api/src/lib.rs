//! HTTP API for Hearth.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** for every household command and query
//! - **`WebSocket` endpoint** (`/households/{id}/ws`) streaming change
//!   notifications for one household via [`tokio::sync::broadcast`]
//! - **Health probe** (`/health`)
//!
//! Handlers are thin: they parse identifiers and bodies, call
//! [`hearth_core::HouseholdService`], and map [`hearth_core::CoreError`]
//! onto status codes through [`ApiError`].

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
