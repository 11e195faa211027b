// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Code categories and their scan thresholds.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Name given to categories created from the admin console.
pub const DEFAULT_CATEGORY_NAME: &str = "New QR Code Category";

/// A grouping of codes with a required-scan threshold.
///
/// Stored at: `categories/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Category {
    /// Document ID
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Number of codes an attendee must scan in this category.
    /// Zero excludes the category from completion accounting.
    #[serde(default)]
    pub scans_required: u32,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, scans_required: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            scans_required,
        }
    }

    /// Whether this category takes part in completion accounting.
    pub fn counts_toward_completion(&self) -> bool {
        self.scans_required > 0
    }
}

/// Case-insensitive ordering by display name, shared by every name-sorted list.
pub fn cmp_by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
