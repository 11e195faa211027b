// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in and sign-out routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, decode_session, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/session", post(create_session))
        .route("/auth/logout", post(logout))
}

#[derive(Deserialize, Validate)]
pub struct SessionRequest {
    /// Attendee token issued by the event platform
    #[validate(length(min = 1, max = 8192))]
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: String,
    pub is_admin: bool,
    pub organizer: bool,
}

/// Exchange a platform token for a session.
///
/// The attendee record is created or refreshed from the platform profile;
/// a stored admin credential is kept.
async fn create_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SessionRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    body.validate()?;

    let signed_in = state.identity.sign_in(&body.token).await.map_err(|e| {
        tracing::warn!(error = %e, "Sign-in failed");
        AppError::from(e)
    })?;
    let user_id = signed_in.profile.id.clone();

    let attendee = match state.store.get_attendee(&user_id).await? {
        Some(mut stored) => {
            stored.merge_profile(signed_in.profile);
            stored
        }
        None => signed_in.profile,
    };
    state.store.upsert_attendee(&attendee).await?;

    let is_admin = attendee.is_admin();
    if is_admin {
        tracing::info!(user_id = %user_id, "Attendee signed in with admin credential");
    }

    let jwt = create_jwt(&user_id, signed_in.organizer, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, jwt.clone()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64));

    tracing::info!(
        user_id = %user_id,
        organizer = signed_in.organizer,
        "Session created"
    );

    Ok((
        jar.add(cookie),
        Json(SessionResponse {
            token: jwt,
            user_id,
            is_admin,
            organizer: signed_in.organizer,
        }),
    ))
}

/// Sign out: tell the identity provider and clear the session cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, StatusCode)> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(String::from)
        });

    if let Some(claims) = token
        .as_deref()
        .and_then(|t| decode_session(t, &state.config.jwt_signing_key))
    {
        state.identity.sign_out(&claims.sub).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}
