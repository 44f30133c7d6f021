//! REST API endpoint handlers.
//!
//! Handlers parse path identifiers and JSON bodies, call the
//! [`HouseholdService`](hearth_core::HouseholdService) held in
//! [`AppState`], and map the result onto a status code.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `POST` | `/households` | Create a household |
//! | `GET` | `/households/{id}` | Household name (or `"Unknown"`) |
//! | `POST` | `/households/{id}/access` | Verify a pin |
//! | `GET` `POST` | `/households/{id}/chores` | List or add chores |
//! | `POST` | `/households/{id}/chores/{chore_id}/assign` | Assign a chore |
//! | `POST` | `/households/{id}/chores/{chore_id}/complete` | Complete a chore |
//! | `GET` | `/households/{id}/chores/{chore_id}/history` | Completion history |
//! | `GET` `POST` | `/households/{id}/invite` | Current invite or a new one |
//! | `GET` `POST` | `/households/{id}/members` | List members or join |
//! | `PUT` | `/households/{id}/members/{member_id}/nickname` | Rename a member |
//! | `PUT` | `/households/{id}/members/{member_id}/status` | Set a status |
//! | `DELETE` | `/households/{id}/members/{member_id}` | Remove a member |
//! | `GET` | `/households/{id}/activities` | Activity feed |
//! | `POST` | `/households/{id}/activities/rebuild` | Rebuild the feed |

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use hearth_events::UNKNOWN_HOUSEHOLD_NAME;
use hearth_types::{Assignment, ChoreId, HouseholdId, InviteId, MemberId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Body of `POST /households`.
#[derive(Debug, Deserialize)]
pub struct CreateHouseholdRequest {
    /// Client-chosen identifier; generated when absent.
    pub id: Option<HouseholdId>,
    /// Household name.
    pub name: String,
    /// Numeric pin, 4 to 12 digits.
    pub pin: String,
}

/// Body of `POST /households/{id}/access`.
#[derive(Debug, Deserialize)]
pub struct AccessRequest {
    /// Pin to verify.
    pub pin: String,
}

/// Household identity returned by name lookups and access.
#[derive(Debug, Serialize)]
pub struct HouseholdNameResponse {
    /// Household identifier.
    pub id: HouseholdId,
    /// Household name.
    pub name: String,
}

/// Body of `POST /households/{id}/chores`.
#[derive(Debug, Deserialize)]
pub struct AddChoreRequest {
    /// Short name shown in lists.
    pub display_name: String,
    /// Free-form details.
    #[serde(default)]
    pub description: String,
}

/// Body of `POST /households/{id}/chores/{chore_id}/assign`.
#[derive(Debug, Deserialize)]
pub struct AssignChoreRequest {
    /// Assignees; ignored when `assign_to_all` is set.
    #[serde(default)]
    pub member_ids: Vec<MemberId>,
    /// Assign to every member.
    #[serde(default)]
    pub assign_to_all: bool,
    /// Member making the assignment.
    pub assigned_by: Option<MemberId>,
}

/// Body of `POST /households/{id}/chores/{chore_id}/complete`.
#[derive(Debug, Deserialize)]
pub struct CompleteChoreRequest {
    /// Member who did the chore.
    pub member_id: MemberId,
    /// When it was done; defaults to now.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Body of `POST /households/{id}/members`.
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    /// The household's current invite.
    pub invite_id: InviteId,
    /// Nickname to join under.
    pub nickname: String,
}

/// Body of `PUT /households/{id}/members/{member_id}/nickname`.
#[derive(Debug, Deserialize)]
pub struct NicknameRequest {
    /// New nickname.
    pub nickname: String,
}

/// Body of `PUT /households/{id}/members/{member_id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// New status; `null` or blank clears it.
    pub status: Option<String>,
}

/// Query parameters for `GET /households/{id}/activities`.
#[derive(Debug, Default, Deserialize)]
pub struct ActivitiesQuery {
    /// Only entries from the last `days` days.
    pub days: Option<u32>,
    /// At most `limit` entries.
    pub limit: Option<usize>,
}

/// Response of `POST /households/{id}/activities/rebuild`.
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    /// Number of facts folded into the feed.
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Households
// ---------------------------------------------------------------------------

/// Create a household.
pub async fn create_household(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateHouseholdRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let id = body.id.unwrap_or_default();
    let created = state
        .service
        .create_household(id, &body.name, &body.pin)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Verify a pin and reveal the household name.
///
/// Every failure, including a malformed identifier, is the same 401.
pub async fn access_household(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    payload: Result<Json<AccessRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let (Ok(id), Ok(Json(body))) = (id_str.parse::<HouseholdId>(), payload) else {
        return Err(ApiError::Unauthorized);
    };
    let name = state
        .service
        .access_household(id, &body.pin)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(HouseholdNameResponse { id, name }))
}

/// Household name, or `"Unknown"` if it was never created.
pub async fn household_name(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    let name = state
        .service
        .household_name(id)
        .await?
        .unwrap_or_else(|| UNKNOWN_HOUSEHOLD_NAME.to_owned());
    Ok(Json(HouseholdNameResponse { id, name }))
}

// ---------------------------------------------------------------------------
// Chores
// ---------------------------------------------------------------------------

/// Add a chore.
pub async fn add_chore(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    payload: Result<Json<AddChoreRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    let Json(body) = payload?;
    let chore = state
        .service
        .add_chore(id, &body.display_name, &body.description)
        .await?;
    Ok((StatusCode::CREATED, Json(chore)))
}

/// List chores with their live assignment.
pub async fn list_chores(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    Ok(Json(state.service.list_chores(id).await?))
}

/// Replace a chore's assignment.
pub async fn assign_chore(
    State(state): State<Arc<AppState>>,
    Path((id_str, chore_str)): Path<(String, String)>,
    payload: Result<Json<AssignChoreRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    let chore_id = parse_id::<ChoreId>(&chore_str)?;
    let Json(body) = payload?;
    let assignment = state
        .service
        .assign_chore(
            id,
            chore_id,
            Assignment {
                member_ids: body.member_ids,
                assign_to_all: body.assign_to_all,
                assigned_by: body.assigned_by,
            },
        )
        .await?;
    Ok(Json(assignment))
}

/// Record a completion.
pub async fn complete_chore(
    State(state): State<Arc<AppState>>,
    Path((id_str, chore_str)): Path<(String, String)>,
    payload: Result<Json<CompleteChoreRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    let chore_id = parse_id::<ChoreId>(&chore_str)?;
    let Json(body) = payload?;
    let receipt = state
        .service
        .complete_chore(id, chore_id, body.member_id, body.completed_at)
        .await?;
    Ok(Json(receipt))
}

/// Completion history, most recent first.
pub async fn chore_history(
    State(state): State<Arc<AppState>>,
    Path((id_str, chore_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    let chore_id = parse_id::<ChoreId>(&chore_str)?;
    Ok(Json(state.service.chore_history(id, chore_id).await?))
}

// ---------------------------------------------------------------------------
// Invites
// ---------------------------------------------------------------------------

/// Issue a new invite.
pub async fn generate_invite(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    Ok(Json(state.service.generate_invite(id).await?))
}

/// The current invite, or 404.
pub async fn current_invite(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    let invite = state
        .service
        .current_invite(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no invite for household {id}")))?;
    Ok(Json(invite))
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// Current members in order of joining.
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    Ok(Json(state.service.list_members(id).await?))
}

/// Join with the current invite.
pub async fn join_household(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    payload: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    let Json(body) = payload?;
    let member = state
        .service
        .join_household(id, body.invite_id, &body.nickname)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Rename a member.
pub async fn change_nickname(
    State(state): State<Arc<AppState>>,
    Path((id_str, member_str)): Path<(String, String)>,
    payload: Result<Json<NicknameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    let member_id = parse_id::<MemberId>(&member_str)?;
    let Json(body) = payload?;
    state
        .service
        .change_nickname(id, member_id, &body.nickname)
        .await?;
    Ok(StatusCode::OK)
}

/// Set or clear a member's status.
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    Path((id_str, member_str)): Path<(String, String)>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    let member_id = parse_id::<MemberId>(&member_str)?;
    let Json(body) = payload?;
    state
        .service
        .change_status(id, member_id, body.status.as_deref())
        .await?;
    Ok(StatusCode::OK)
}

/// Remove a member.
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Path((id_str, member_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    let member_id = parse_id::<MemberId>(&member_str)?;
    state.service.remove_member(id, member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// Published activity feed, newest first.
pub async fn get_activities(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    let days = params.days.or(state.activity_defaults.default_days);
    let limit = params.limit.or(state.activity_defaults.default_limit);
    Ok(Json(state.service.get_activities(id, days, limit).await?))
}

/// Rebuild the activity feed from the log.
pub async fn rebuild_activities(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id::<HouseholdId>(&id_str)?;
    let count = state.service.rebuild_activities(id).await?;
    Ok(Json(RebuildResponse { count }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a typed identifier from a path segment.
pub(crate) fn parse_id<T: From<Uuid>>(s: &str) -> Result<T, ApiError> {
    s.parse::<Uuid>()
        .map(T::from)
        .map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}
