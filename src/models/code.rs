// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registered QR codes and their content-hash identity.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A registered QR payload.
///
/// Stored at: `codes/{id}` where `id == code_id(value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Code {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Raw decoded QR payload
    #[serde(default)]
    pub value: String,
    /// Owning category; codes without one are ignored by progress accounting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl Code {
    /// Build a code for a payload, deriving its id from the content.
    pub fn from_payload(payload: &str, name: impl Into<String>) -> Self {
        Self {
            id: code_id(payload),
            name: name.into(),
            value: payload.to_string(),
            category_id: None,
        }
    }

    /// Whether the stored id matches the hash of the stored payload.
    pub fn has_valid_id(&self) -> bool {
        self.id == code_id(&self.value)
    }
}

/// Content-hash identity of a decoded payload (hex SHA-256).
///
/// The same physical code always maps to the same id regardless of who scans it.
pub fn code_id(payload: &str) -> String {
    hex::encode(Sha256::digest(payload.as_bytes()))
}

/// Display name for codes registered by scanning from the attendee app.
pub fn added_code_name(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("Added @ {}", now.format("%a %b %d %Y %H:%M:%S UTC"))
}
