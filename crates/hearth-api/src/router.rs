//! Axum router construction for the Hearth API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS and request tracing enabled.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// See [`handlers`] for the route table. CORS allows any origin so the
/// browser client can be served from anywhere.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Households
        .route("/households", post(handlers::create_household))
        .route("/households/{id}", get(handlers::household_name))
        .route("/households/{id}/access", post(handlers::access_household))
        // Chores
        .route(
            "/households/{id}/chores",
            get(handlers::list_chores).post(handlers::add_chore),
        )
        .route(
            "/households/{id}/chores/{chore_id}/assign",
            post(handlers::assign_chore),
        )
        .route(
            "/households/{id}/chores/{chore_id}/complete",
            post(handlers::complete_chore),
        )
        .route(
            "/households/{id}/chores/{chore_id}/history",
            get(handlers::chore_history),
        )
        // Invites
        .route(
            "/households/{id}/invite",
            get(handlers::current_invite).post(handlers::generate_invite),
        )
        // Members
        .route(
            "/households/{id}/members",
            get(handlers::list_members).post(handlers::join_household),
        )
        .route(
            "/households/{id}/members/{member_id}",
            axum::routing::delete(handlers::remove_member),
        )
        .route(
            "/households/{id}/members/{member_id}/nickname",
            put(handlers::change_nickname),
        )
        .route(
            "/households/{id}/members/{member_id}/status",
            put(handlers::change_status),
        )
        // Activity
        .route("/households/{id}/activities", get(handlers::get_activities))
        .route(
            "/households/{id}/activities/rebuild",
            post(handlers::rebuild_activities),
        )
        // WebSocket
        .route("/households/{id}/ws", get(ws::ws_household))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
