//! `WebSocket` handler for real-time household notifications.
//!
//! Clients connect to `GET /households/{id}/ws` and receive a JSON-encoded
//! [`Notification`](hearth_core::Notification) for every append to that
//! household, as a text frame. Notifications for other households are
//! dropped server-side.
//!
//! If a client falls behind, lagged messages are silently skipped and the
//! client resumes from the most recent notification.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use hearth_types::HouseholdId;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming notifications for one household.
///
/// # Route
///
/// `GET /households/{id}/ws`
pub async fn ws_household(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let household_id = parse_id::<HouseholdId>(&id_str)?;
    Ok(ws.on_upgrade(move |socket| handle_ws(socket, state, household_id)))
}

/// Handle the `WebSocket` lifecycle: subscribe to the notification
/// channel and forward matching notifications as text frames.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, household_id: HouseholdId) {
    debug!(%household_id, "WebSocket client connected");

    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(notification) if notification.household_id == household_id => {
                        let json = match serde_json::to_string(&notification) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("Failed to serialize notification: {e}");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!(%household_id, "WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(n)) => {
                        debug!(%household_id, skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Notification channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%household_id, "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%household_id, "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    // Clients have nothing to say.
                    Some(Ok(Message::Text(_) | Message::Binary(_) | Message::Pong(_))) => {}
                }
            }
        }
    }
}
