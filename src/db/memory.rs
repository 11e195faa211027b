// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process hunt store for tests and local development.

use crate::db::{ChangeEvent, ChangeFeed, HuntStore, RecordChange};
use crate::error::AppError;
use crate::models::{Attendee, Category, ChallengeConfig, Code, ScanRecord, ScanSet};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Hunt store backed by concurrent maps. Cloning shares the contents.
#[derive(Clone, Default)]
pub struct MemoryDb {
    categories: Arc<DashMap<String, Category>>,
    codes: Arc<DashMap<String, Code>>,
    attendees: Arc<DashMap<String, Attendee>>,
    scans: Arc<DashMap<String, ScanRecord>>,
    challenge: Arc<RwLock<ChallengeConfig>>,
    feed: ChangeFeed,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

fn record_change<T>(existed: bool, record: T) -> RecordChange<T> {
    if existed {
        RecordChange::Changed { record }
    } else {
        RecordChange::Added { record }
    }
}

#[async_trait]
impl HuntStore for MemoryDb {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.categories.iter().map(|e| e.value().clone()).collect())
    }

    async fn get_category(&self, id: &str) -> Result<Option<Category>, AppError> {
        Ok(self.categories.get(id).map(|e| e.value().clone()))
    }

    async fn upsert_category(&self, category: &Category) -> Result<(), AppError> {
        let existed = self
            .categories
            .insert(category.id.clone(), category.clone())
            .is_some();
        self.feed
            .publish(ChangeEvent::Category(record_change(existed, category.clone())));
        Ok(())
    }

    async fn delete_category(&self, id: &str) -> Result<bool, AppError> {
        let removed = self.categories.remove(id).is_some();
        if removed {
            self.feed.publish(ChangeEvent::Category(RecordChange::Removed {
                id: id.to_string(),
            }));
        }
        Ok(removed)
    }

    async fn list_codes(&self) -> Result<Vec<Code>, AppError> {
        Ok(self.codes.iter().map(|e| e.value().clone()).collect())
    }

    async fn get_code(&self, id: &str) -> Result<Option<Code>, AppError> {
        Ok(self.codes.get(id).map(|e| e.value().clone()))
    }

    async fn upsert_code(&self, code: &Code) -> Result<(), AppError> {
        let existed = self.codes.insert(code.id.clone(), code.clone()).is_some();
        self.feed
            .publish(ChangeEvent::Code(record_change(existed, code.clone())));
        Ok(())
    }

    async fn insert_code_if_absent(&self, code: &Code) -> Result<bool, AppError> {
        let inserted = match self.codes.entry(code.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(code.clone());
                true
            }
        };
        if inserted {
            self.feed.publish(ChangeEvent::Code(RecordChange::Added {
                record: code.clone(),
            }));
        }
        Ok(inserted)
    }

    async fn delete_code(&self, id: &str) -> Result<bool, AppError> {
        let removed = self.codes.remove(id).is_some();
        if removed {
            self.feed.publish(ChangeEvent::Code(RecordChange::Removed {
                id: id.to_string(),
            }));
        }
        Ok(removed)
    }

    async fn list_attendees(&self) -> Result<Vec<Attendee>, AppError> {
        Ok(self.attendees.iter().map(|e| e.value().clone()).collect())
    }

    async fn get_attendee(&self, id: &str) -> Result<Option<Attendee>, AppError> {
        Ok(self.attendees.get(id).map(|e| e.value().clone()))
    }

    async fn upsert_attendee(&self, attendee: &Attendee) -> Result<(), AppError> {
        let existed = self
            .attendees
            .insert(attendee.id.clone(), attendee.clone())
            .is_some();
        self.feed
            .publish(ChangeEvent::Attendee(record_change(existed, attendee.clone())));
        Ok(())
    }

    async fn set_admin_token(&self, user_id: &str, token: Option<&str>) -> Result<(), AppError> {
        let updated = {
            let mut entry = self
                .attendees
                .get_mut(user_id)
                .ok_or_else(|| AppError::NotFound(format!("Attendee {} not found", user_id)))?;
            entry.admin_token = token.map(String::from);
            entry.value().clone()
        };
        self.feed
            .publish(ChangeEvent::Attendee(RecordChange::Changed { record: updated }));
        Ok(())
    }

    async fn get_scans(&self, user_id: &str) -> Result<ScanSet, AppError> {
        Ok(self
            .scans
            .get(user_id)
            .map(|record| record.to_scan_set())
            .unwrap_or_default())
    }

    async fn all_scans(&self) -> Result<HashMap<String, ScanSet>, AppError> {
        Ok(self
            .scans
            .iter()
            .map(|e| (e.key().clone(), e.value().to_scan_set()))
            .collect())
    }

    async fn record_scan(&self, user_id: &str, code_id: &str) -> Result<bool, AppError> {
        // The entry guard holds the shard lock, so concurrent duplicate
        // scans for the same user serialize here.
        let (inserted, scans) = {
            let mut record = self
                .scans
                .entry(user_id.to_string())
                .or_insert_with(|| ScanRecord::new(user_id));
            let inserted = record.record(code_id);
            (inserted, record.to_scan_set())
        };

        if inserted {
            self.feed.publish(ChangeEvent::Scans {
                user_id: user_id.to_string(),
                scans,
            });
        }
        Ok(inserted)
    }

    async fn get_challenge(&self) -> Result<ChallengeConfig, AppError> {
        Ok(self.challenge.read().await.clone())
    }

    async fn set_challenge(&self, config: &ChallengeConfig) -> Result<(), AppError> {
        *self.challenge.write().await = config.clone();
        self.feed.publish(ChangeEvent::Challenge(config.clone()));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.feed.subscribe()
    }
}
