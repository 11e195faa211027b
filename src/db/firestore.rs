// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing the hunt store.
//!
//! Layout:
//! - `categories/{id}`
//! - `codes/{hash(value)}`
//! - `attendees/{user_id}`
//! - `scans/{user_id}` with a `codes` map of scanned code IDs
//! - `challenge/config`
//!
//! Change events are published for writes made through this client.

use crate::db::{collections, ChangeEvent, ChangeFeed, HuntStore, RecordChange};
use crate::error::AppError;
use crate::models::{Attendee, Category, ChallengeConfig, Code, ScanRecord, ScanSet};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;

/// Transactions that lose a commit race are re-run this many times.
const MAX_TRANSACTION_ATTEMPTS: usize = 5;

/// Outcome of one read-modify-write transaction.
enum Attempt<T> {
    Committed(T),
    /// The read showed nothing to write.
    Skipped,
    /// The commit lost to a concurrent writer.
    Aborted(String),
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
    feed: ChangeFeed,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
            feed: ChangeFeed::default(),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
            feed: ChangeFeed::default(),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            client: None,
            feed: ChangeFeed::default(),
        }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Client whose reads see (and lock) the documents of `transaction`.
    fn transactional_client(
        &self,
        transaction: &firestore::FirestoreTransaction<'_>,
    ) -> Result<firestore::FirestoreDb, AppError> {
        Ok(self
            .get_client()?
            .clone_with_consistency_selector(firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            )))
    }

    // ─── Transactions ────────────────────────────────────────────

    async fn insert_code_once(&self, code: &Code) -> Result<Attempt<()>, AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let existing: Option<Code> = self
            .transactional_client(&transaction)?
            .fluent()
            .select()
            .by_id_in(collections::CODES)
            .obj()
            .one(&code.id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read code in transaction: {}", e))
            })?;
        if existing.is_some() {
            let _ = transaction.rollback().await;
            return Ok(Attempt::Skipped);
        }

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::CODES)
            .document_id(&code.id)
            .object(code)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add code to transaction: {}", e))
            })?;

        Ok(match transaction.commit().await {
            Ok(_) => Attempt::Committed(()),
            Err(e) => Attempt::Aborted(e.to_string()),
        })
    }

    async fn record_scan_once(
        &self,
        user_id: &str,
        code_id: &str,
    ) -> Result<Attempt<ScanRecord>, AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let current: Option<ScanRecord> = self
            .transactional_client(&transaction)?
            .fluent()
            .select()
            .by_id_in(collections::SCANS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read scans in transaction: {}", e))
            })?;

        let mut record = current.unwrap_or_else(|| ScanRecord::new(user_id));
        if !record.record(code_id) {
            let _ = transaction.rollback().await;
            return Ok(Attempt::Skipped);
        }

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::SCANS)
            .document_id(user_id)
            .object(&record)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add scan to transaction: {}", e))
            })?;

        Ok(match transaction.commit().await {
            Ok(_) => Attempt::Committed(record),
            Err(e) => Attempt::Aborted(e.to_string()),
        })
    }

    // ─── Generic Document Helpers ────────────────────────────────

    async fn get_doc<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_docs<T>(&self, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_doc<T>(&self, collection: &str, id: &str, doc: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl HuntStore for FirestoreDb {
    // ─── Category Operations ─────────────────────────────────────

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.list_docs(collections::CATEGORIES).await
    }

    async fn get_category(&self, id: &str) -> Result<Option<Category>, AppError> {
        self.get_doc(collections::CATEGORIES, id).await
    }

    async fn upsert_category(&self, category: &Category) -> Result<(), AppError> {
        let existed = self.get_category(&category.id).await?.is_some();
        self.set_doc(collections::CATEGORIES, &category.id, category)
            .await?;

        let record = category.clone();
        self.feed.publish(ChangeEvent::Category(if existed {
            RecordChange::Changed { record }
        } else {
            RecordChange::Added { record }
        }));
        Ok(())
    }

    async fn delete_category(&self, id: &str) -> Result<bool, AppError> {
        if self.get_category(id).await?.is_none() {
            return Ok(false);
        }
        self.delete_doc(collections::CATEGORIES, id).await?;
        self.feed.publish(ChangeEvent::Category(RecordChange::Removed {
            id: id.to_string(),
        }));
        Ok(true)
    }

    // ─── Code Operations ─────────────────────────────────────────

    async fn list_codes(&self) -> Result<Vec<Code>, AppError> {
        self.list_docs(collections::CODES).await
    }

    async fn get_code(&self, id: &str) -> Result<Option<Code>, AppError> {
        self.get_doc(collections::CODES, id).await
    }

    async fn upsert_code(&self, code: &Code) -> Result<(), AppError> {
        let existed = self.get_code(&code.id).await?.is_some();
        self.set_doc(collections::CODES, &code.id, code).await?;

        let record = code.clone();
        self.feed.publish(ChangeEvent::Code(if existed {
            RecordChange::Changed { record }
        } else {
            RecordChange::Added { record }
        }));
        Ok(())
    }

    async fn insert_code_if_absent(&self, code: &Code) -> Result<bool, AppError> {
        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            match self.insert_code_once(code).await? {
                Attempt::Committed(()) => {
                    self.feed.publish(ChangeEvent::Code(RecordChange::Added {
                        record: code.clone(),
                    }));
                    return Ok(true);
                }
                Attempt::Skipped => return Ok(false),
                Attempt::Aborted(e) => {
                    tracing::warn!(code_id = %code.id, attempt, error = %e, "Code insert aborted, retrying");
                }
            }
        }
        Err(AppError::Database(format!(
            "Code insert for {} kept aborting",
            code.id
        )))
    }

    async fn delete_code(&self, id: &str) -> Result<bool, AppError> {
        if self.get_code(id).await?.is_none() {
            return Ok(false);
        }
        self.delete_doc(collections::CODES, id).await?;
        self.feed.publish(ChangeEvent::Code(RecordChange::Removed {
            id: id.to_string(),
        }));
        Ok(true)
    }

    // ─── Attendee Operations ─────────────────────────────────────

    async fn list_attendees(&self) -> Result<Vec<Attendee>, AppError> {
        self.list_docs(collections::ATTENDEES).await
    }

    async fn get_attendee(&self, id: &str) -> Result<Option<Attendee>, AppError> {
        self.get_doc(collections::ATTENDEES, id).await
    }

    async fn upsert_attendee(&self, attendee: &Attendee) -> Result<(), AppError> {
        let existed = self.get_attendee(&attendee.id).await?.is_some();
        self.set_doc(collections::ATTENDEES, &attendee.id, attendee)
            .await?;

        let record = attendee.clone();
        self.feed.publish(ChangeEvent::Attendee(if existed {
            RecordChange::Changed { record }
        } else {
            RecordChange::Added { record }
        }));
        Ok(())
    }

    async fn set_admin_token(&self, user_id: &str, token: Option<&str>) -> Result<(), AppError> {
        // Full-document write: a `None` token drops the field entirely.
        let mut attendee = self
            .get_attendee(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attendee {} not found", user_id)))?;
        attendee.admin_token = token.map(String::from);

        self.set_doc(collections::ATTENDEES, user_id, &attendee)
            .await?;

        tracing::info!(
            user_id,
            is_admin = attendee.is_admin(),
            "Attendee admin credential updated"
        );
        self.feed
            .publish(ChangeEvent::Attendee(RecordChange::Changed { record: attendee }));
        Ok(())
    }

    // ─── Scan Operations ─────────────────────────────────────────

    async fn get_scans(&self, user_id: &str) -> Result<ScanSet, AppError> {
        let record: Option<ScanRecord> = self.get_doc(collections::SCANS, user_id).await?;
        Ok(record.map(|r| r.to_scan_set()).unwrap_or_default())
    }

    async fn all_scans(&self) -> Result<HashMap<String, ScanSet>, AppError> {
        let records: Vec<ScanRecord> = self.list_docs(collections::SCANS).await?;
        Ok(records
            .into_iter()
            .map(|record| {
                let scans = record.to_scan_set();
                (record.user_id, scans)
            })
            .collect())
    }

    /// Record a scan inside a transaction.
    ///
    /// The read is part of the transaction, so a concurrent writer of the same
    /// scan record aborts one commit. The loser re-runs and its fresh read
    /// finds the code already present.
    async fn record_scan(&self, user_id: &str, code_id: &str) -> Result<bool, AppError> {
        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            match self.record_scan_once(user_id, code_id).await? {
                Attempt::Committed(record) => {
                    tracing::info!(user_id, code_id, "Scan recorded");
                    self.feed.publish(ChangeEvent::Scans {
                        user_id: user_id.to_string(),
                        scans: record.to_scan_set(),
                    });
                    return Ok(true);
                }
                Attempt::Skipped => {
                    tracing::debug!(user_id, code_id, "Scan already recorded (idempotent skip)");
                    return Ok(false);
                }
                Attempt::Aborted(e) => {
                    tracing::warn!(user_id, code_id, attempt, error = %e, "Scan transaction aborted, retrying");
                }
            }
        }
        Err(AppError::Database(format!(
            "Scan transaction for {} kept aborting",
            user_id
        )))
    }

    // ─── Challenge Operations ────────────────────────────────────

    async fn get_challenge(&self) -> Result<ChallengeConfig, AppError> {
        let config: Option<ChallengeConfig> = self
            .get_doc(collections::CHALLENGE, collections::CHALLENGE_DOC_ID)
            .await?;
        Ok(config.unwrap_or_default())
    }

    async fn set_challenge(&self, config: &ChallengeConfig) -> Result<(), AppError> {
        self.set_doc(
            collections::CHALLENGE,
            collections::CHALLENGE_DOC_ID,
            config,
        )
        .await?;
        self.feed.publish(ChangeEvent::Challenge(config.clone()));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.feed.subscribe()
    }
}
