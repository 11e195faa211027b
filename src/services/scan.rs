// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scan decode handling and code registration.

use crate::db::SharedStore;
use crate::error::AppError;
use crate::models::code::added_code_name;
use crate::models::{code_id, Attendee, Code, ScanSet};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Result of interpreting one decoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ScanOutcome {
    /// New scan stored
    Recorded { code_id: String, name: String },
    /// The user scanned this code before; nothing written
    AlreadyScanned { code_id: String, name: String },
    /// No registered code has this payload; nothing written
    NotInChallenge,
}

impl ScanOutcome {
    pub fn title(&self) -> &'static str {
        match self {
            ScanOutcome::Recorded { .. } => "Congrats!",
            ScanOutcome::AlreadyScanned { .. } => "Already scanned",
            ScanOutcome::NotInChallenge => "Oops!",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ScanOutcome::Recorded { name, .. } => format!("You scanned {}", name),
            ScanOutcome::AlreadyScanned { .. } => {
                "It looks like you already scanned this QR code!".to_string()
            }
            ScanOutcome::NotInChallenge => {
                "It looks like this QR code is not part of the challenge!".to_string()
            }
        }
    }
}

/// What a decode should do, before any write happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeDecision<'a> {
    NotInChallenge,
    AlreadyScanned(&'a Code),
    Record(&'a Code),
}

/// Classify a decode against the code it hashed to and the user's scans.
pub fn classify_decode<'a>(code: Option<&'a Code>, scans: &ScanSet) -> DecodeDecision<'a> {
    match code {
        None => DecodeDecision::NotInChallenge,
        Some(code) if scans.contains(&code.id) => DecodeDecision::AlreadyScanned(code),
        Some(code) => DecodeDecision::Record(code),
    }
}

/// Result of registering a payload as a new code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "code", rename_all = "snake_case")]
pub enum RegisterOutcome {
    Registered(Code),
    /// A code with this payload exists and was left untouched
    AlreadyRegistered(Code),
}

/// Scan handling on top of the hunt store.
#[derive(Clone)]
pub struct ScanService {
    store: SharedStore,
}

impl ScanService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Interpret one raw scanner decode for a user.
    ///
    /// Performs at most one store write. Repeated decodes of the same payload,
    /// including concurrent ones, end in `AlreadyScanned`.
    pub async fn handle_decode(
        &self,
        user_id: &str,
        payload: &str,
    ) -> Result<ScanOutcome, AppError> {
        let id = code_id(payload);
        let code = self.store.get_code(&id).await?;
        let scans = self.store.get_scans(user_id).await?;

        let outcome = match classify_decode(code.as_ref(), &scans) {
            DecodeDecision::NotInChallenge => ScanOutcome::NotInChallenge,
            DecodeDecision::AlreadyScanned(code) => ScanOutcome::AlreadyScanned {
                code_id: code.id.clone(),
                name: code.name.clone(),
            },
            DecodeDecision::Record(code) => {
                // The store check is atomic; losing a race degrades to a duplicate.
                if self.store.record_scan(user_id, &code.id).await? {
                    ScanOutcome::Recorded {
                        code_id: code.id.clone(),
                        name: code.name.clone(),
                    }
                } else {
                    ScanOutcome::AlreadyScanned {
                        code_id: code.id.clone(),
                        name: code.name.clone(),
                    }
                }
            }
        };

        match &outcome {
            ScanOutcome::Recorded { code_id, .. } => {
                tracing::info!(user_id, code_id = %code_id, "Scan recorded");
            }
            ScanOutcome::AlreadyScanned { code_id, .. } => {
                tracing::debug!(user_id, code_id = %code_id, "Duplicate scan ignored");
            }
            ScanOutcome::NotInChallenge => {
                tracing::debug!(user_id, code_id = %id, "Unrecognized payload scanned");
            }
        }

        Ok(outcome)
    }

    /// Register a scanned payload as a new, uncategorized code.
    ///
    /// Only admin attendees may register codes.
    pub async fn register_code(
        &self,
        attendee: &Attendee,
        payload: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<RegisterOutcome, AppError> {
        if !attendee.is_admin() {
            return Err(AppError::Forbidden(
                "Only admins can add codes".to_string(),
            ));
        }

        let code = Code::from_payload(payload, added_code_name(now));

        if self.store.insert_code_if_absent(&code).await? {
            tracing::info!(user_id = %attendee.id, code_id = %code.id, "Code registered");
            return Ok(RegisterOutcome::Registered(code));
        }

        let existing = self
            .store
            .get_code(&code.id)
            .await?
            .unwrap_or(code);
        Ok(RegisterOutcome::AlreadyRegistered(existing))
    }
}
