// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! QR Hunt: an event scavenger hunt played by scanning QR codes.
//!
//! Attendees scan codes to fill per-category thresholds; organizers edit
//! categories and codes and watch progress from the admin console. Every
//! completion rule lives in [`models::progress`] so both surfaces agree.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod views;

use config::Config;
use db::SharedStore;
use services::{AdminRoleService, CatalogService, IdentityProvider, ScanService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: SharedStore,
    pub identity: Arc<dyn IdentityProvider>,
    pub scan_service: ScanService,
    pub admin_roles: AdminRoleService,
    pub catalog: CatalogService,
}

impl AppState {
    /// Wire services around an injected store and identity provider.
    pub fn new(config: Config, store: SharedStore, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            scan_service: ScanService::new(store.clone()),
            admin_roles: AdminRoleService::new(store.clone(), identity.clone()),
            catalog: CatalogService::new(store.clone()),
            config,
            store,
            identity,
        }
    }
}
