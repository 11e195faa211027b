// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hunt store layer.
//!
//! Services receive an explicit [`HuntStore`] handle instead of reaching for
//! global references. Every successful write is announced on the store's
//! change feed.

pub mod events;
pub mod firestore;
pub mod memory;

pub use events::{ChangeEvent, ChangeFeed, RecordChange};
pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Attendee, Category, ChallengeConfig, Code, ScanSet};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Collection names as constants.
pub mod collections {
    pub const CATEGORIES: &str = "categories";
    pub const CODES: &str = "codes";
    pub const ATTENDEES: &str = "attendees";
    /// Scan records (keyed by user ID)
    pub const SCANS: &str = "scans";
    /// Singleton challenge texts
    pub const CHALLENGE: &str = "challenge";
    pub const CHALLENGE_DOC_ID: &str = "config";
}

/// Shared handle to the configured store.
pub type SharedStore = Arc<dyn HuntStore>;

/// Operations the hunt needs from its backing store.
#[async_trait]
pub trait HuntStore: Send + Sync {
    // ─── Categories ──────────────────────────────────────────────

    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;

    async fn get_category(&self, id: &str) -> Result<Option<Category>, AppError>;

    /// Create or replace a category.
    async fn upsert_category(&self, category: &Category) -> Result<(), AppError>;

    /// Returns `false` if the category did not exist.
    async fn delete_category(&self, id: &str) -> Result<bool, AppError>;

    // ─── Codes ───────────────────────────────────────────────────

    async fn list_codes(&self) -> Result<Vec<Code>, AppError>;

    async fn get_code(&self, id: &str) -> Result<Option<Code>, AppError>;

    /// Create or replace a code.
    async fn upsert_code(&self, code: &Code) -> Result<(), AppError>;

    /// Store a code unless one with the same ID exists.
    ///
    /// Returns `true` if the code was inserted.
    async fn insert_code_if_absent(&self, code: &Code) -> Result<bool, AppError>;

    /// Returns `false` if the code did not exist.
    async fn delete_code(&self, id: &str) -> Result<bool, AppError>;

    // ─── Attendees ───────────────────────────────────────────────

    async fn list_attendees(&self) -> Result<Vec<Attendee>, AppError>;

    async fn get_attendee(&self, id: &str) -> Result<Option<Attendee>, AppError>;

    async fn upsert_attendee(&self, attendee: &Attendee) -> Result<(), AppError>;

    /// Store (`Some`) or delete (`None`) an attendee's admin credential.
    async fn set_admin_token(&self, user_id: &str, token: Option<&str>) -> Result<(), AppError>;

    // ─── Scans ───────────────────────────────────────────────────

    async fn get_scans(&self, user_id: &str) -> Result<ScanSet, AppError>;

    /// Scan sets of every user who has a scan record.
    async fn all_scans(&self) -> Result<HashMap<String, ScanSet>, AppError>;

    /// Atomically mark a code as scanned by a user.
    ///
    /// Returns `true` if the scan is new, `false` if it was already recorded.
    async fn record_scan(&self, user_id: &str, code_id: &str) -> Result<bool, AppError>;

    // ─── Challenge ───────────────────────────────────────────────

    /// Current challenge texts (default if never set).
    async fn get_challenge(&self) -> Result<ChallengeConfig, AppError>;

    async fn set_challenge(&self, config: &ChallengeConfig) -> Result<(), AppError>;

    // ─── Subscriptions ───────────────────────────────────────────

    /// Receive change events for every write made through this store.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
