// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for signed-in attendees.

use crate::db::ChangeEvent;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Attendee, CategoryProgress};
use crate::services::scan::RegisterOutcome;
use crate::services::ScanOutcome;
use crate::views::{AttendeeView, HuntState, Screen};
use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Extension, Json, Router,
};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/challenge", get(get_challenge))
        .route("/api/scans", post(post_scan))
        .route("/api/codes", post(post_code))
        .route("/api/events", get(get_events))
}

/// Load the caller's attendee record.
async fn load_attendee(state: &AppState, user_id: &str) -> Result<Attendee> {
    state
        .store
        .get_attendee(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Attendee {} not found", user_id)))
}

// ─── Profile ─────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
    pub is_admin: bool,
    pub organizer: bool,
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let attendee = load_attendee(&state, &user.user_id).await?;
    Ok(Json(MeResponse {
        is_admin: attendee.is_admin(),
        id: attendee.id,
        first_name: attendee.first_name,
        last_name: attendee.last_name,
        image: attendee.image,
        organizer: user.organizer,
    }))
}

// ─── Challenge & Progress ────────────────────────────────────

/// Challenge texts plus the caller's progress.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChallengeResponse {
    pub title: String,
    pub welcome: Option<String>,
    pub done_description: Option<String>,
    /// Categories with a threshold above zero
    pub categories: Vec<CategoryProgress>,
    pub has_scans: bool,
    pub is_done: bool,
    /// Welcome screen until the first scan
    pub show_welcome: bool,
    pub show_done: bool,
    /// Admin attendees may register codes from the scanner
    pub can_add_codes: bool,
}

async fn get_challenge(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ChallengeResponse>> {
    let hunt = HuntState::load_for_user(state.store.as_ref(), &user.user_id).await?;
    let attendee = load_attendee(&state, &user.user_id).await?;
    let view = AttendeeView::from_snapshot(&user.user_id, attendee.is_admin(), hunt);
    let progress = view
        .progress()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Scan snapshot missing")))?;

    Ok(Json(ChallengeResponse {
        title: view.title().to_string(),
        welcome: view.state().challenge.welcome.clone(),
        done_description: view.state().challenge.done_description.clone(),
        categories: progress.visible_categories().cloned().collect(),
        has_scans: progress.has_scans,
        is_done: progress.is_done,
        show_welcome: view.screen() == Screen::Welcome,
        show_done: view.show_done_overlay(),
        can_add_codes: view.is_admin(),
    }))
}

// ─── Scanning ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct PayloadRequest {
    /// Raw string decoded from the QR code
    #[validate(length(min = 1, max = 4096))]
    payload: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScanResponse {
    pub outcome: ScanOutcome,
    /// Alert title for the outcome
    pub title: String,
    pub message: String,
}

async fn post_scan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<PayloadRequest>,
) -> Result<Json<ScanResponse>> {
    body.validate()?;

    let outcome = state
        .scan_service
        .handle_decode(&user.user_id, &body.payload)
        .await?;

    Ok(Json(ScanResponse {
        title: outcome.title().to_string(),
        message: outcome.message(),
        outcome,
    }))
}

/// Register the scanned payload as a new code (admin attendees only).
async fn post_code(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<PayloadRequest>,
) -> Result<Json<RegisterOutcome>> {
    body.validate()?;

    let attendee = load_attendee(&state, &user.user_id).await?;
    let outcome = state
        .scan_service
        .register_code(&attendee, &body.payload, chrono::Utc::now())
        .await?;
    Ok(Json(outcome))
}

// ─── Live Updates ────────────────────────────────────────────

/// Turn one change event into an SSE frame.
fn change_frame(event: &ChangeEvent) -> Option<Event> {
    match Event::default().event("change").json_data(event) {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode change event");
            None
        }
    }
}

/// Server-sent stream of the changes visible to the caller.
///
/// A subscriber that falls behind gets a `resync` event and should reload
/// `/api/challenge`.
async fn get_events(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let rx = state.store.subscribe();
    let user_id = user.user_id;
    tracing::debug!(user_id = %user_id, "Change stream opened");

    let events = stream::unfold((rx, user_id), |(mut rx, user_id)| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if !event.visible_to(&user_id) {
                        continue;
                    }
                    if let Some(frame) = change_frame(&event) {
                        return Some((Ok::<_, Infallible>(frame), (rx, user_id)));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(user_id = %user_id, skipped, "Change stream lagged");
                    let frame = Event::default().event("resync").data(skipped.to_string());
                    return Some((Ok::<_, Infallible>(frame), (rx, user_id)));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
