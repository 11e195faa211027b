// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use qr_hunt::config::Config;
use qr_hunt::db::{FirestoreDb, HuntStore, MemoryDb};
use qr_hunt::middleware::auth::create_jwt;
use qr_hunt::models::Attendee;
use qr_hunt::routes::create_router;
use qr_hunt::services::identity::{create_platform_token, PlatformClaims};
use qr_hunt::services::JwtIdentityProvider;
use qr_hunt::AppState;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by the in-memory store.
/// Returns the router, the shared state and a handle on the store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, MemoryDb) {
    let config = Config::test_default();
    let db = MemoryDb::new();
    let identity = Arc::new(JwtIdentityProvider::new(
        &config.platform_token_secret,
        &config.jwt_signing_key,
    ));

    let state = Arc::new(AppState::new(config, Arc::new(db.clone()), identity));
    (create_router(state.clone()), state, db)
}

/// Unique ID for test isolation.
#[allow(dead_code)]
pub fn unique_id(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

/// Mint an event platform token for a user.
#[allow(dead_code)]
pub fn platform_token(state: &AppState, user_id: &str, first: &str, organizer: bool) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = PlatformClaims {
        sub: user_id.to_string(),
        exp: now + 3600,
        first_name: first.to_string(),
        last_name: "Tester".to_string(),
        email: Some(format!("{}@example.com", user_id)),
        title: None,
        company: Some("Example Corp".to_string()),
        image: None,
        organizer,
    };
    create_platform_token(&claims, &state.config.platform_token_secret).unwrap()
}

/// Store an attendee and return a session token for them.
#[allow(dead_code)]
pub async fn signed_in(state: &AppState, attendee: &Attendee, organizer: bool) -> String {
    state.store.upsert_attendee(attendee).await.unwrap();
    create_jwt(&attendee.id, organizer, &state.config.jwt_signing_key).unwrap()
}

/// Build a request with a bearer session and optional JSON body.
#[allow(dead_code)]
pub fn authed(method: &str, uri: &str, token: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as text.
#[allow(dead_code)]
pub async fn text_body(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
