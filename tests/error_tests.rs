// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use qr_hunt::config::Config;
use qr_hunt::db::FirestoreDb;
use qr_hunt::error::AppError;
use qr_hunt::middleware::auth::create_jwt;
use qr_hunt::routes::create_router;
use qr_hunt::services::JwtIdentityProvider;
use qr_hunt::AppState;
use std::sync::Arc;
use tower::ServiceExt;

mod common;
use common::{authed, json_body};

#[tokio::test]
async fn test_error_bodies() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED, "unauthorized"),
        (
            AppError::Forbidden("nope".to_string()),
            StatusCode::FORBIDDEN,
            "forbidden",
        ),
        (
            AppError::NotFound("Code x".to_string()),
            StatusCode::NOT_FOUND,
            "not_found",
        ),
        (
            AppError::Identity("bad signature".to_string()),
            StatusCode::UNAUTHORIZED,
            "identity_error",
        ),
    ];

    for (err, status, code) in cases {
        let response = err.into_response();
        assert_eq!(response.status(), status);
        let body = json_body(response).await;
        assert_eq!(body["error"], code);
    }
}

#[tokio::test]
async fn test_internal_errors_do_not_leak_details() {
    let response = AppError::Database("connection refused at 10.0.0.7".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());

    let response = AppError::Internal(anyhow::anyhow!("secret stack")).into_response();
    let body = json_body(response).await;
    assert_eq!(body["error"], "internal_error");
    assert!(!body.to_string().contains("secret"));
}

#[tokio::test]
async fn test_offline_store_returns_database_error() {
    let config = Config::test_default();
    let session = create_jwt("att-1", false, &config.jwt_signing_key).unwrap();
    let identity = Arc::new(JwtIdentityProvider::new(
        &config.platform_token_secret,
        &config.jwt_signing_key,
    ));
    let state = Arc::new(AppState::new(
        config,
        Arc::new(FirestoreDb::new_mock()),
        identity,
    ));
    let app = create_router(state);

    let response = app
        .oneshot(authed("GET", "/api/challenge", &session, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());
}
