// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! QR Hunt API Server
//!
//! Serves the attendee scanning app and the organizer console for an event
//! scavenger hunt played by scanning QR codes.

use qr_hunt::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryDb, SharedStore},
    services::JwtIdentityProvider,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        store = ?config.store_backend,
        "Starting QR Hunt API"
    );

    let store: SharedStore = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryDb::new())
        }
    };

    let identity = Arc::new(JwtIdentityProvider::new(
        &config.platform_token_secret,
        &config.jwt_signing_key,
    ));

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store, identity));

    // Build router
    let app = qr_hunt::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qr_hunt=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
