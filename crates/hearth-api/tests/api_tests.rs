//! Integration tests for the Hearth API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Each test builds a fresh in-memory service.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use hearth_api::router::build_router;
use hearth_api::state::AppState;
use hearth_core::config::ActivityConfig;
use hearth_core::{HouseholdService, InviteLinks, PinHasher};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn make_router() -> Router {
    make_router_with(ActivityConfig::default())
}

fn make_router_with(defaults: ActivityConfig) -> Router {
    let service = HouseholdService::in_memory(
        PinHasher::new(1_000),
        InviteLinks::new("http://localhost:8080/join"),
    );
    let state = AppState::new(Arc::new(service)).with_activity_defaults(defaults);
    build_router(Arc::new(state))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send one request; returns status and parsed body (`Null` when empty).
async fn send(router: &Router, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_smiths(router: &Router) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/households",
        Some(json!({ "name": "Smiths", "pin": "1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Smiths");
    body["id"].as_str().unwrap().to_owned()
}

async fn join(router: &Router, id: &str, nickname: &str) -> String {
    let (_, invite) = send(router, Method::POST, &format!("/households/{id}/invite"), None).await;
    let (status, member) = send(
        router,
        Method::POST,
        &format!("/households/{id}/members"),
        Some(json!({ "invite_id": invite["invite_id"], "nickname": nickname })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    member["id"].as_str().unwrap().to_owned()
}

// =========================================================================
// Health
// =========================================================================

#[tokio::test]
async fn test_health() {
    let router = make_router();
    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
}

// =========================================================================
// Households and access
// =========================================================================

#[tokio::test]
async fn test_create_and_access_household() {
    let router = make_router();
    let id = create_smiths(&router).await;

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/households/{id}/access"),
        Some(json!({ "pin": "1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Smiths");

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/households/{id}/access"),
        Some(json!({ "pin": "4321" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("name").is_none());
}

#[tokio::test]
async fn test_access_failures_are_uniform() {
    let router = make_router();
    let id = create_smiths(&router).await;

    let (_, wrong_pin) = send(
        &router,
        Method::POST,
        &format!("/households/{id}/access"),
        Some(json!({ "pin": "0000" })),
    )
    .await;
    let (missing_status, missing) = send(
        &router,
        Method::POST,
        &format!("/households/{}/access", Uuid::new_v4()),
        Some(json!({ "pin": "1234" })),
    )
    .await;
    let (malformed_status, malformed) = send(
        &router,
        Method::POST,
        "/households/not-a-uuid/access",
        Some(json!({ "pin": "1234" })),
    )
    .await;

    assert_eq!(missing_status, StatusCode::UNAUTHORIZED);
    assert_eq!(malformed_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pin, missing);
    assert_eq!(wrong_pin, malformed);
}

#[tokio::test]
async fn test_duplicate_household_conflicts() {
    let router = make_router();
    let id = Uuid::new_v4().to_string();
    let body = json!({ "id": id, "name": "Smiths", "pin": "1234" });

    let (first, _) = send(&router, Method::POST, "/households", Some(body.clone())).await;
    let (second, _) = send(
        &router,
        Method::POST,
        "/households",
        Some(json!({ "id": id, "name": "Joneses", "pin": "1234" })),
    )
    .await;
    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);

    let (_, name) = send(&router, Method::GET, &format!("/households/{id}"), None).await;
    assert_eq!(name["name"], "Smiths");
}

#[tokio::test]
async fn test_invalid_household_input() {
    let router = make_router();
    for body in [
        json!({ "name": "", "pin": "1234" }),
        json!({ "name": "Smiths", "pin": "12" }),
        json!({ "name": "Smiths" }),
    ] {
        let (status, error) = send(&router, Method::POST, "/households", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["status"], 400);
    }
}

#[tokio::test]
async fn test_unknown_household_name() {
    let router = make_router();
    let (status, body) = send(
        &router,
        Method::GET,
        &format!("/households/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Unknown");
}

#[tokio::test]
async fn test_malformed_uuid_is_bad_request() {
    let router = make_router();
    let (status, body) = send(&router, Method::GET, "/households/nope/chores", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

// =========================================================================
// Chores
// =========================================================================

#[tokio::test]
async fn test_chore_flow() {
    let router = make_router();
    let id = create_smiths(&router).await;
    let ann = join(&router, &id, "Ann").await;
    let bob = join(&router, &id, "Bob").await;

    let (status, chore) = send(
        &router,
        Method::POST,
        &format!("/households/{id}/chores"),
        Some(json!({ "display_name": "Dishes", "description": "After dinner" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let chore_id = chore["id"].as_str().unwrap().to_owned();

    for member in [&ann, &bob] {
        let (status, _) = send(
            &router,
            Method::POST,
            &format!("/households/{id}/chores/{chore_id}/assign"),
            Some(json!({ "member_ids": [member] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, chores) = send(&router, Method::GET, &format!("/households/{id}/chores"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chores.as_array().unwrap().len(), 1);
    assert_eq!(chores[0]["assignment"]["member_ids"], json!([bob]));

    for at in ["2026-01-01T08:00:00Z", "2026-01-02T08:00:00Z"] {
        let (status, receipt) = send(
            &router,
            Method::POST,
            &format!("/households/{id}/chores/{chore_id}/complete"),
            Some(json!({ "member_id": ann, "completed_at": at })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(receipt["chore_id"], chore_id.as_str());
    }

    let (status, history) = send(
        &router,
        Method::GET,
        &format!("/households/{id}/chores/{chore_id}/history"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history[0]["completed_at"], "2026-01-02T08:00:00Z");
    assert_eq!(history[1]["completed_at"], "2026-01-01T08:00:00Z");
}

#[tokio::test]
async fn test_add_chore_requires_name() {
    let router = make_router();
    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/households/{}/chores", Uuid::new_v4()),
        Some(json!({ "display_name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =========================================================================
// Invites and members
// =========================================================================

#[tokio::test]
async fn test_invite_lifecycle() {
    let router = make_router();
    let id = create_smiths(&router).await;

    let (status, _) = send(&router, Method::GET, &format!("/households/{id}/invite"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, old) = send(&router, Method::POST, &format!("/households/{id}/invite"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, new) = send(&router, Method::POST, &format!("/households/{id}/invite"), None).await;

    let (status, current) = send(&router, Method::GET, &format!("/households/{id}/invite"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current, new);

    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/households/{id}/members"),
        Some(json!({ "invite_id": old["invite_id"], "nickname": "Ann" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_member_commands() {
    let router = make_router();
    let id = create_smiths(&router).await;
    let ann = join(&router, &id, "Ann").await;
    let bob = join(&router, &id, "Bob").await;

    let (status, _) = send(
        &router,
        Method::PUT,
        &format!("/households/{id}/members/{ann}/nickname"),
        Some(json!({ "nickname": "Annie" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        Method::PUT,
        &format!("/households/{id}/members/{bob}/status"),
        Some(json!({ "status": "away" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        Method::PUT,
        &format!("/households/{id}/members/{bob}/nickname"),
        Some(json!({ "nickname": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, members) = send(&router, Method::GET, &format!("/households/{id}/members"), None).await;
    assert_eq!(members[0]["nickname"], "Annie");
    assert_eq!(members[1]["status"], "away");

    let (status, body) = send(
        &router,
        Method::DELETE,
        &format!("/households/{id}/members/{ann}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, members) = send(&router, Method::GET, &format!("/households/{id}/members"), None).await;
    assert_eq!(members.as_array().unwrap().len(), 1);
    assert_eq!(members[0]["id"], bob.as_str());
}

// =========================================================================
// Activity
// =========================================================================

#[tokio::test]
async fn test_rebuild_then_get_activities() {
    let router = make_router();
    let id = create_smiths(&router).await;
    join(&router, &id, "Ann").await;

    let (status, rebuilt) = send(
        &router,
        Method::POST,
        &format!("/households/{id}/activities/rebuild"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Creation, invite, join.
    assert_eq!(rebuilt["count"], 3);

    let (status, activities) = send(
        &router,
        Method::GET,
        &format!("/households/{id}/activities"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(activities.as_array().unwrap().len(), 3);
    assert_eq!(activities[0]["description"], "Ann joined the household");

    let (_, limited) = send(
        &router,
        Method::GET,
        &format!("/households/{id}/activities?limit=1&days=7"),
        None,
    )
    .await;
    assert_eq!(limited.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_activity_defaults_apply() {
    let router = make_router_with(ActivityConfig {
        default_days: None,
        default_limit: Some(2),
    });
    let id = create_smiths(&router).await;
    join(&router, &id, "Ann").await;
    send(
        &router,
        Method::POST,
        &format!("/households/{id}/activities/rebuild"),
        None,
    )
    .await;

    let (_, defaulted) = send(&router, Method::GET, &format!("/households/{id}/activities"), None).await;
    assert_eq!(defaulted.as_array().unwrap().len(), 2);

    let (_, explicit) = send(
        &router,
        Method::GET,
        &format!("/households/{id}/activities?limit=10"),
        None,
    )
    .await;
    assert_eq!(explicit.as_array().unwrap().len(), 3);
}
