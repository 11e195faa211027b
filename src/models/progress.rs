// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Progress aggregation and completion rules.
//!
//! Both the attendee app and the admin console derive completion from the
//! functions in this module, so they can never disagree. Nothing here is
//! persisted; every value is recomputed from categories, codes and scans.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::category::cmp_by_name;
use crate::models::{Attendee, Category, Code, ScanSet};

/// Scan count per category ID.
pub type CategoryCounts = HashMap<String, u32>;

/// A scanned code as listed under its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScannedCode {
    pub id: String,
    pub name: String,
}

/// One user's progress in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoryProgress {
    pub category_id: String,
    pub name: String,
    pub scans_required: u32,
    pub scanned_count: u32,
    pub is_complete: bool,
    /// Scanned codes of this category, sorted by name
    pub scanned_codes: Vec<ScannedCode>,
    /// Unfilled placeholder slots (`Scan #n`) still shown to the attendee
    pub remaining: u32,
}

/// One user's progress across the whole challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AttendeeProgress {
    /// Every category, in the order given
    pub categories: Vec<CategoryProgress>,
    pub has_scans: bool,
    pub is_done: bool,
}

impl AttendeeProgress {
    /// Aggregate one user's scans against the current categories and codes.
    pub fn compute(categories: &[Category], codes: &[Code], scans: &ScanSet) -> Self {
        let counts = count_by_category(scans, &code_to_category(codes));
        let has_scans = !scans.is_empty();

        let per_category = categories
            .iter()
            .map(|category| {
                let scanned_count = counts.get(&category.id).copied().unwrap_or(0);

                let mut scanned_codes: Vec<ScannedCode> = codes
                    .iter()
                    .filter(|code| code.category_id.as_deref() == Some(category.id.as_str()))
                    .filter(|code| scans.contains(&code.id))
                    .map(|code| ScannedCode {
                        id: code.id.clone(),
                        name: code.name.clone(),
                    })
                    .collect();
                scanned_codes.sort_by(|a, b| cmp_by_name(&a.name, &b.name));

                CategoryProgress {
                    category_id: category.id.clone(),
                    name: category.name.clone(),
                    scans_required: category.scans_required,
                    scanned_count,
                    is_complete: scanned_count >= category.scans_required,
                    scanned_codes,
                    remaining: category.scans_required.saturating_sub(scanned_count),
                }
            })
            .collect();

        Self {
            categories: per_category,
            has_scans,
            is_done: is_done(categories, &counts, has_scans),
        }
    }

    /// Categories shown on the attendee progress screen (threshold above zero).
    pub fn visible_categories(&self) -> impl Iterator<Item = &CategoryProgress> {
        self.categories.iter().filter(|c| c.scans_required > 0)
    }
}

/// Map every categorized code to its category. Uncategorized codes are left out.
pub fn code_to_category(codes: &[Code]) -> HashMap<String, String> {
    codes
        .iter()
        .filter_map(|code| {
            code.category_id
                .as_ref()
                .map(|category_id| (code.id.clone(), category_id.clone()))
        })
        .collect()
}

/// Count one user's scans per category.
///
/// Scanned IDs with no mapped category are skipped. Counts may mention
/// category IDs that no longer exist; completion only looks up live ones.
pub fn count_by_category(
    scans: &ScanSet,
    code_to_category: &HashMap<String, String>,
) -> CategoryCounts {
    let mut counts = CategoryCounts::new();
    for category_id in scans.iter().filter_map(|id| code_to_category.get(id)) {
        *counts.entry(category_id.clone()).or_insert(0) += 1;
    }
    counts
}

/// Count scans per category for every user.
pub fn scans_per_user_per_category(
    users: &HashMap<String, ScanSet>,
    code_to_category: &HashMap<String, String>,
) -> HashMap<String, CategoryCounts> {
    users
        .iter()
        .map(|(user_id, scans)| (user_id.clone(), count_by_category(scans, code_to_category)))
        .collect()
}

/// Look up a count, treating a missing entry as zero.
pub fn scans_in_category(counts: &CategoryCounts, category_id: &str) -> u32 {
    counts.get(category_id).copied().unwrap_or(0)
}

/// Completion rule.
///
/// A user is done when every category with a positive threshold has at
/// least that many scans, and the user has scanned something at all.
pub fn is_done(categories: &[Category], counts: &CategoryCounts, has_scans: bool) -> bool {
    has_scans
        && categories
            .iter()
            .filter(|category| category.counts_toward_completion())
            .all(|category| scans_in_category(counts, &category.id) >= category.scans_required)
}

/// Roster ordering: completed attendees first, then first name, then last
/// name, case-insensitive. The ID breaks remaining ties so the order is total.
pub fn compare_attendees(a: &Attendee, a_done: bool, b: &Attendee, b_done: bool) -> Ordering {
    b_done
        .cmp(&a_done)
        .then_with(|| cmp_by_name(&a.first_name, &b.first_name))
        .then_with(|| cmp_by_name(&a.last_name, &b.last_name))
        .then_with(|| a.id.cmp(&b.id))
}
