// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin console routes (organizer sessions only).
//!
//! The auth and organizer middleware are applied in routes/mod.rs.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::category::cmp_by_name;
use crate::models::{Category, ChallengeConfig, Code};
use crate::services::catalog::{CategoryUpdate, CodeUpdate};
use crate::services::export::{completed_attendees_csv, EXPORT_FILENAME};
use crate::views::{build_roster, HuntState, RosterRow};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/challenge", get(get_challenge).put(put_challenge))
        .route(
            "/admin/categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/admin/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/admin/codes", get(list_codes))
        .route("/admin/codes/{id}", put(update_code).delete(delete_code))
        .route("/admin/attendees", get(list_attendees))
        .route(
            "/admin/attendees/{id}/admin",
            put(grant_admin).delete(revoke_admin),
        )
        .route("/admin/attendees/export", get(export_attendees))
}

/// Distinguish a missing field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ─── Challenge ───────────────────────────────────────────────

async fn get_challenge(State(state): State<Arc<AppState>>) -> Result<Json<ChallengeConfig>> {
    Ok(Json(state.store.get_challenge().await?))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChallengeRequest {
    #[validate(length(max = 200))]
    #[serde(default)]
    title: Option<String>,
    #[validate(length(max = 10000))]
    #[serde(default)]
    welcome: Option<String>,
    #[validate(length(max = 10000))]
    #[serde(default)]
    done_description: Option<String>,
}

/// Replace the challenge texts. Empty strings clear a field.
async fn put_challenge(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<UpdateChallengeRequest>,
) -> Result<Json<ChallengeConfig>> {
    body.validate()?;

    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let config = ChallengeConfig {
        title: non_empty(body.title),
        welcome: non_empty(body.welcome),
        done_description: non_empty(body.done_description),
    };

    state.catalog.set_challenge(&config).await?;
    tracing::info!(organizer = %user.user_id, "Challenge texts updated");
    Ok(Json(config))
}

// ─── Categories ──────────────────────────────────────────────

async fn list_categories(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Category>>> {
    let mut categories = state.store.list_categories().await?;
    categories.sort_by(|a, b| cmp_by_name(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = state.catalog.create_category().await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    name: Option<String>,
    #[validate(range(max = 100))]
    #[serde(default)]
    scans_required: Option<u32>,
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>> {
    body.validate()?;

    let category = state
        .catalog
        .update_category(
            &id,
            CategoryUpdate {
                name: body.name,
                scans_required: body.scans_required,
            },
        )
        .await?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.catalog.remove_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Codes ───────────────────────────────────────────────────

async fn list_codes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Code>>> {
    let mut codes = state.store.list_codes().await?;
    codes.sort_by(|a, b| cmp_by_name(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(Json(codes))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCodeRequest {
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    name: Option<String>,
    /// `null` moves the code out of every category
    #[serde(default, deserialize_with = "double_option")]
    category_id: Option<Option<String>>,
}

async fn update_code(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCodeRequest>,
) -> Result<Json<Code>> {
    body.validate()?;

    let code = state
        .catalog
        .update_code(
            &id,
            CodeUpdate {
                name: body.name,
                category_id: body.category_id,
            },
        )
        .await?;
    Ok(Json(code))
}

async fn delete_code(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.catalog.remove_code(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Attendees ───────────────────────────────────────────────

/// Ranked roster: completed attendees first, then by name.
async fn list_attendees(State(state): State<Arc<AppState>>) -> Result<Json<Vec<RosterRow>>> {
    let hunt = HuntState::load(state.store.as_ref()).await?;
    Ok(Json(build_roster(&hunt)))
}

async fn grant_admin(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.admin_roles.grant(&id).await?;
    tracing::info!(organizer = %user.user_id, user_id = %id, "Organizer granted admin");
    Ok(StatusCode::NO_CONTENT)
}

async fn revoke_admin(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.admin_roles.revoke(&id).await?;
    tracing::info!(organizer = %user.user_id, user_id = %id, "Organizer revoked admin");
    Ok(StatusCode::NO_CONTENT)
}

/// Download the completed attendees as CSV.
async fn export_attendees(
    State(state): State<Arc<AppState>>,
) -> Result<([(header::HeaderName, String); 2], String)> {
    let hunt = HuntState::load(state.store.as_ref()).await?;
    let csv = completed_attendees_csv(&build_roster(&hunt))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        csv,
    ))
}
