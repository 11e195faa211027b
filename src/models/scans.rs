// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user scan records.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Set of code IDs a user has scanned.
pub type ScanSet = BTreeSet<String>;

/// Scan record document for one user.
///
/// Stored at: `scans/{user_id}` as `codes: {code_id: true}`.
/// Presence of a key is the only signal; entries are never removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub user_id: String,
    #[serde(default)]
    pub codes: BTreeMap<String, bool>,
}

impl ScanRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            codes: BTreeMap::new(),
        }
    }

    /// Mark a code as scanned.
    ///
    /// Returns `true` if the scan is new, `false` if it was already recorded.
    pub fn record(&mut self, code_id: &str) -> bool {
        if self.contains(code_id) {
            return false;
        }
        self.codes.insert(code_id.to_string(), true);
        true
    }

    pub fn contains(&self, code_id: &str) -> bool {
        self.codes.get(code_id).copied().unwrap_or(false)
    }

    pub fn to_scan_set(&self) -> ScanSet {
        self.codes
            .iter()
            .filter(|(_, scanned)| **scanned)
            .map(|(id, _)| id.clone())
            .collect()
    }
}
