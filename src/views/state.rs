// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side hunt state and the change reducer.
//!
//! `reduce(state, event)` is the only way store notifications reach derived
//! view state, so it can be exercised without any UI or transport.

use std::collections::HashMap;

use crate::db::{ChangeEvent, HuntStore, RecordChange};
use crate::error::AppError;
use crate::models::category::cmp_by_name;
use crate::models::progress::{code_to_category, scans_per_user_per_category};
use crate::models::{
    Attendee, AttendeeProgress, Category, CategoryCounts, ChallengeConfig, Code, ScanSet,
};

/// Records mirrored from the hunt store.
///
/// Categories and codes are kept sorted by name (case-insensitive).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HuntState {
    pub categories: Vec<Category>,
    pub codes: Vec<Code>,
    pub attendees: Vec<Attendee>,
    /// Scan sets by user ID (only the signed-in user's on the attendee side)
    pub scans: HashMap<String, ScanSet>,
    pub challenge: ChallengeConfig,
}

trait Keyed {
    fn key(&self) -> &str;
    fn sort_name(&self) -> &str;
}

impl Keyed for Category {
    fn key(&self) -> &str {
        &self.id
    }
    fn sort_name(&self) -> &str {
        &self.name
    }
}

impl Keyed for Code {
    fn key(&self) -> &str {
        &self.id
    }
    fn sort_name(&self) -> &str {
        &self.name
    }
}

impl Keyed for Attendee {
    fn key(&self) -> &str {
        &self.id
    }
    fn sort_name(&self) -> &str {
        &self.first_name
    }
}

/// Apply an added/changed/removed record to a name-sorted list.
///
/// Added and changed both replace any record with the same ID, so a replayed
/// event never duplicates a row.
fn apply_record<T: Keyed>(list: &mut Vec<T>, change: RecordChange<T>) {
    match change {
        RecordChange::Added { record } | RecordChange::Changed { record } => {
            list.retain(|existing| existing.key() != record.key());
            list.push(record);
            sort_by_name(list);
        }
        RecordChange::Removed { id } => list.retain(|existing| existing.key() != id),
    }
}

fn sort_by_name<T: Keyed>(list: &mut [T]) {
    list.sort_by(|a, b| {
        cmp_by_name(a.sort_name(), b.sort_name()).then_with(|| a.key().cmp(b.key()))
    });
}

impl HuntState {
    /// Snapshot everything an admin console shows.
    pub async fn load(store: &dyn HuntStore) -> Result<Self, AppError> {
        let mut state = Self {
            categories: store.list_categories().await?,
            codes: store.list_codes().await?,
            attendees: store.list_attendees().await?,
            scans: store.all_scans().await?,
            challenge: store.get_challenge().await?,
        };
        state.sort();
        Ok(state)
    }

    /// Snapshot what one attendee is allowed to see.
    pub async fn load_for_user(store: &dyn HuntStore, user_id: &str) -> Result<Self, AppError> {
        let mut scans = HashMap::new();
        scans.insert(user_id.to_string(), store.get_scans(user_id).await?);

        let mut state = Self {
            categories: store.list_categories().await?,
            codes: store.list_codes().await?,
            attendees: Vec::new(),
            scans,
            challenge: store.get_challenge().await?,
        };
        state.sort();
        Ok(state)
    }

    fn sort(&mut self) {
        sort_by_name(&mut self.categories);
        sort_by_name(&mut self.codes);
        sort_by_name(&mut self.attendees);
    }

    /// Fold one change event into the state.
    pub fn apply(&mut self, event: ChangeEvent) {
        match event {
            ChangeEvent::Category(change) => apply_record(&mut self.categories, change),
            ChangeEvent::Code(change) => apply_record(&mut self.codes, change),
            ChangeEvent::Attendee(change) => apply_record(&mut self.attendees, change),
            ChangeEvent::Scans { user_id, scans } => {
                self.scans.insert(user_id, scans);
            }
            ChangeEvent::AllScans(scans) => self.scans = scans,
            ChangeEvent::Challenge(config) => self.challenge = config,
        }
    }

    pub fn scans_for(&self, user_id: &str) -> Option<&ScanSet> {
        self.scans.get(user_id)
    }

    /// Progress of one user; a user without a scan record has no scans.
    pub fn progress_for(&self, user_id: &str) -> AttendeeProgress {
        let empty = ScanSet::new();
        let scans = self.scans_for(user_id).unwrap_or(&empty);
        AttendeeProgress::compute(&self.categories, &self.codes, scans)
    }

    /// Per-user per-category scan counts for every known scan record.
    pub fn scans_per_user_per_category(&self) -> HashMap<String, CategoryCounts> {
        scans_per_user_per_category(&self.scans, &code_to_category(&self.codes))
    }

    pub fn find_code(&self, id: &str) -> Option<&Code> {
        self.codes.iter().find(|code| code.id == id)
    }
}

/// Pure reducer: `(state, event) -> state`.
pub fn reduce(mut state: HuntState, event: ChangeEvent) -> HuntState {
    state.apply(event);
    state
}
