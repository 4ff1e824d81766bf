//! Terraform Cloud Provider Tests
//!
//! These tests run the HTTP provider against a local stub of the Terraform
//! Cloud API and verify:
//! - The request path selects organization vs team tokens
//! - The trust anchor is sent as a bearer token
//! - Non-success statuses surface as upstream errors with the detail preserved
//! - Deleting an absent token is not an error

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tfsecrets_core::{RoleScope, UpstreamConfig};
use tfsecrets_upstream::{
    providers::TerraformCloudProvider, TokenProvider, TokenRequest, UpstreamError,
};

const TRUST_ANCHOR: &str = "tfc-abc";

// =============================================================================
// Test Helpers
// =============================================================================

#[derive(Default)]
struct StubState {
    /// (method, path) pairs seen by the stub
    seen: Mutex<Vec<(String, String)>>,
    counter: Mutex<u32>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TRUST_ANCHOR))
        .unwrap_or(false)
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"errors": [{"status": "401", "title": "unauthorized"}]})),
    )
        .into_response()
}

fn minted(state: &StubState, prefix: &str) -> axum::response::Response {
    let mut counter = state.counter.lock().unwrap();
    *counter += 1;
    Json(json!({
        "data": {
            "id": format!("at-{}{}", prefix, counter),
            "type": "authentication-tokens",
            "attributes": {
                "token": format!("{}{}.atlasv1.secret", prefix, counter)
            }
        }
    }))
    .into_response()
}

async fn create_org_token(
    State(state): State<Arc<StubState>>,
    Path(org): Path<String>,
    headers: HeaderMap,
) -> axum::response::Response {
    state
        .seen
        .lock()
        .unwrap()
        .push(("POST".into(), format!("organizations/{}", org)));
    if !authorized(&headers) {
        return unauthorized();
    }
    if org == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"errors": [{"status": "404", "title": "not found", "detail": "organization missing"}]})),
        )
            .into_response();
    }
    minted(&state, "org")
}

async fn delete_org_token(
    State(state): State<Arc<StubState>>,
    Path(org): Path<String>,
    headers: HeaderMap,
) -> axum::response::Response {
    state
        .seen
        .lock()
        .unwrap()
        .push(("DELETE".into(), format!("organizations/{}", org)));
    if !authorized(&headers) {
        return unauthorized();
    }
    if org == "missing" {
        return StatusCode::NOT_FOUND.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn create_team_token(
    State(state): State<Arc<StubState>>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
) -> axum::response::Response {
    state
        .seen
        .lock()
        .unwrap()
        .push(("POST".into(), format!("teams/{}", team_id)));
    if !authorized(&headers) {
        return unauthorized();
    }
    minted(&state, "team")
}

async fn slow_token() -> axum::response::Response {
    tokio::time::sleep(Duration::from_secs(5)).await;
    StatusCode::OK.into_response()
}

async fn spawn_stub() -> (String, Arc<StubState>) {
    let state = Arc::new(StubState::default());
    let app = Router::new()
        .route(
            "/api/v2/organizations/{org}/authentication-token",
            post(create_org_token).delete(delete_org_token),
        )
        .route(
            "/api/v2/teams/{team_id}/authentication-token",
            post(create_team_token),
        )
        .route("/slow/api/v2/organizations/{org}/authentication-token", post(slow_token))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

fn request(address: &str, token: &str, scope: RoleScope) -> TokenRequest {
    let config = UpstreamConfig::new(token, Some(address.to_string())).unwrap();
    TokenRequest::new(&config, scope)
}

fn org(name: &str) -> RoleScope {
    RoleScope::Organization {
        organization: name.into(),
    }
}

// =============================================================================
// Issuance
// =============================================================================

#[tokio::test]
async fn test_organization_token_minted() {
    let (address, state) = spawn_stub().await;
    let provider = TerraformCloudProvider::new(Duration::from_secs(5)).unwrap();

    let minted = provider
        .create_token(&request(&address, TRUST_ANCHOR, org("acme")))
        .await
        .unwrap();

    assert_eq!(minted.token, "org1.atlasv1.secret");
    assert_eq!(minted.token_id.as_deref(), Some("at-org1"));
    assert_eq!(minted.organization, "acme");
    assert_eq!(minted.team_id, None);

    let seen = state.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![("POST".to_string(), "organizations/acme".to_string())]);
}

#[tokio::test]
async fn test_team_token_uses_team_path() {
    let (address, state) = spawn_stub().await;
    let provider = TerraformCloudProvider::new(Duration::from_secs(5)).unwrap();

    let scope = RoleScope::Team {
        organization: "acme".into(),
        team_id: "team-1".into(),
    };
    let minted = provider
        .create_token(&request(&address, TRUST_ANCHOR, scope))
        .await
        .unwrap();

    assert!(minted.token.starts_with("team"));
    assert_eq!(minted.team_id.as_deref(), Some("team-1"));

    let seen = state.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![("POST".to_string(), "teams/team-1".to_string())]);
}

#[tokio::test]
async fn test_each_call_mints_a_new_token() {
    let (address, _state) = spawn_stub().await;
    let provider = TerraformCloudProvider::new(Duration::from_secs(5)).unwrap();
    let req = request(&address, TRUST_ANCHOR, org("acme"));

    let first = provider.create_token(&req).await.unwrap();
    let second = provider.create_token(&req).await.unwrap();
    assert_ne!(first.token, second.token);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_wrong_trust_anchor_is_upstream_error() {
    let (address, _state) = spawn_stub().await;
    let provider = TerraformCloudProvider::new(Duration::from_secs(5)).unwrap();

    let result = provider
        .create_token(&request(&address, "tfc-wrong", org("acme")))
        .await;

    match result {
        Err(UpstreamError::Status { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "unauthorized");
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found_detail_preserved() {
    let (address, _state) = spawn_stub().await;
    let provider = TerraformCloudProvider::new(Duration::from_secs(5)).unwrap();

    let err = provider
        .create_token(&request(&address, TRUST_ANCHOR, org("missing")))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("organization missing"));
}

#[tokio::test]
async fn test_timeout_surfaces_as_timeout() {
    let (address, _state) = spawn_stub().await;
    let provider = TerraformCloudProvider::new(Duration::from_millis(200)).unwrap();

    let result = provider
        .create_token(&request(&format!("{}/slow", address), TRUST_ANCHOR, org("acme")))
        .await;

    assert!(matches!(result, Err(UpstreamError::Timeout(_))));
}

#[tokio::test]
async fn test_unreachable_upstream_is_http_error() {
    // Bind and immediately drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = TerraformCloudProvider::new(Duration::from_secs(2)).unwrap();
    let result = provider
        .create_token(&request(&format!("http://{}", addr), TRUST_ANCHOR, org("acme")))
        .await;

    assert!(matches!(result, Err(UpstreamError::Http(_))));
}

// =============================================================================
// Revocation
// =============================================================================

#[tokio::test]
async fn test_revoke_deletes_token() {
    let (address, state) = spawn_stub().await;
    let provider = TerraformCloudProvider::new(Duration::from_secs(5)).unwrap();

    provider
        .revoke_token(&request(&address, TRUST_ANCHOR, org("acme")))
        .await
        .unwrap();

    let seen = state.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![("DELETE".to_string(), "organizations/acme".to_string())]);
}

#[tokio::test]
async fn test_revoke_absent_token_is_ok() {
    let (address, _state) = spawn_stub().await;
    let provider = TerraformCloudProvider::new(Duration::from_secs(5)).unwrap();

    let result = provider
        .revoke_token(&request(&address, TRUST_ANCHOR, org("missing")))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_revoke_unauthorized_is_error() {
    let (address, _state) = spawn_stub().await;
    let provider = TerraformCloudProvider::new(Duration::from_secs(5)).unwrap();

    let result = provider
        .revoke_token(&request(&address, "tfc-wrong", org("acme")))
        .await;
    assert!(matches!(result, Err(UpstreamError::Status { status: 401, .. })));
}
