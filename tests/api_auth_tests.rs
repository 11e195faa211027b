// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid sessions
//! 2. Platform tokens are exchanged for sessions and attendee records
//! 3. The admin console only admits organizer sessions
//! 4. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use qr_hunt::db::HuntStore;
use qr_hunt::models::Attendee;
use qr_hunt::services::identity::{create_platform_token, PlatformClaims};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{authed, create_test_app, json_body, platform_token, signed_in};

fn session_request(token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "token": token }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/api/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_garbage_token() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(authed("GET", "/api/challenge", "not-a-jwt", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_from_platform_token() {
    let (app, state, _) = create_test_app();
    let token = platform_token(&state, "att-1", "Grace", false);

    let response = app.clone().oneshot(session_request(&token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie should be set")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("qrhunt_token="));
    assert!(cookie.contains("HttpOnly"));

    let body = json_body(response).await;
    assert_eq!(body["userId"], "att-1");
    assert_eq!(body["isAdmin"], false);
    assert_eq!(body["organizer"], false);

    // Attendee record created from the platform profile
    let stored = state.store.get_attendee("att-1").await.unwrap().unwrap();
    assert_eq!(stored.first_name, "Grace");
    assert_eq!(stored.company.as_deref(), Some("Example Corp"));

    // Cookie alone authenticates
    let session = cookie.split(';').next().unwrap().to_string();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::COOKIE, session)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = json_body(response).await;
    assert_eq!(me["firstName"], "Grace");
}

#[tokio::test]
async fn test_session_rejects_foreign_platform_token() {
    let (app, _, _) = create_test_app();

    let claims = PlatformClaims {
        sub: "att-1".to_string(),
        exp: 4_000_000_000,
        first_name: "Mallory".to_string(),
        last_name: String::new(),
        email: None,
        title: None,
        company: None,
        image: None,
        organizer: true,
    };
    let forged = create_platform_token(&claims, b"some_other_secret_entirely!!!!!!").unwrap();

    let response = app.oneshot(session_request(&forged)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "identity_error");
}

#[tokio::test]
async fn test_session_rejects_empty_token() {
    let (app, _, _) = create_test_app();

    let response = app.oneshot(session_request("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_in_keeps_admin_credential() {
    let (app, state, _) = create_test_app();

    let mut attendee = Attendee::new("att-2", "Old", "Name");
    attendee.email = Some("old@example.com".to_string());
    state.store.upsert_attendee(&attendee).await.unwrap();
    state.admin_roles.grant("att-2").await.unwrap();

    let token = platform_token(&state, "att-2", "New", false);
    let response = app.oneshot(session_request(&token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["isAdmin"], true);

    let stored = state.store.get_attendee("att-2").await.unwrap().unwrap();
    assert_eq!(stored.first_name, "New");
    assert!(stored.is_admin(), "admin credential must survive a re-login");
}

#[tokio::test]
async fn test_admin_console_requires_organizer() {
    let (app, state, _) = create_test_app();
    let attendee = Attendee::new("att-3", "Ada", "Lovelace");
    let attendee_session = signed_in(&state, &attendee, false).await;
    let organizer = Attendee::new("org-1", "Olive", "Organizer");
    let organizer_session = signed_in(&state, &organizer, true).await;

    let response = app
        .clone()
        .oneshot(authed("GET", "/admin/attendees", &attendee_session, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/attendees")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(authed("GET", "/admin/attendees", &organizer_session, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (app, state, _) = create_test_app();
    let attendee = Attendee::new("att-4", "Lin", "Out");
    let session = signed_in(&state, &attendee, false).await;

    let response = app
        .oneshot(authed("POST", "/auth/logout", &session, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("qrhunt_token="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/scans")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_responses_are_not_cacheable() {
    let (app, state, _) = create_test_app();
    let attendee = Attendee::new("att-5", "Nia", "Cache");
    let session = signed_in(&state, &attendee, false).await;

    let response = app
        .oneshot(authed("GET", "/api/challenge", &session, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
}
