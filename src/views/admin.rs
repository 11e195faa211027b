// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin console roster.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::progress::{compare_attendees, is_done, scans_in_category};
use crate::models::{Attendee, CategoryCounts};
use crate::views::HuntState;

/// Scan count shown for one category on a roster row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoryScanCount {
    pub category_id: String,
    pub name: String,
    pub count: u32,
}

/// One attendee in the admin console. Never includes the admin credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RosterRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub image: Option<String>,
    /// One entry per category, in category order
    pub scans: Vec<CategoryScanCount>,
    pub is_done: bool,
    pub is_admin: bool,
}

/// Build the ranked attendee roster: completed first, then by name.
pub fn build_roster(state: &HuntState) -> Vec<RosterRow> {
    let counts = state.scans_per_user_per_category();
    let empty = CategoryCounts::new();

    let mut ranked: Vec<(&Attendee, bool, &CategoryCounts)> = state
        .attendees
        .iter()
        .map(|attendee| {
            let user_counts = counts.get(&attendee.id).unwrap_or(&empty);
            let has_scans = state
                .scans_for(&attendee.id)
                .is_some_and(|scans| !scans.is_empty());
            (
                attendee,
                is_done(&state.categories, user_counts, has_scans),
                user_counts,
            )
        })
        .collect();

    ranked.sort_by(|(a, a_done, _), (b, b_done, _)| compare_attendees(a, *a_done, b, *b_done));

    ranked
        .into_iter()
        .map(|(attendee, done, user_counts)| RosterRow {
            id: attendee.id.clone(),
            first_name: attendee.first_name.clone(),
            last_name: attendee.last_name.clone(),
            email: attendee.email.clone(),
            title: attendee.title.clone(),
            company: attendee.company.clone(),
            image: attendee.image.clone(),
            scans: state
                .categories
                .iter()
                .map(|category| CategoryScanCount {
                    category_id: category.id.clone(),
                    name: category.name.clone(),
                    count: scans_in_category(user_counts, &category.id),
                })
                .collect(),
            is_done: done,
            is_admin: attendee.is_admin(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Code, ScanSet};

    fn state() -> HuntState {
        let mut state = HuntState {
            categories: vec![Category::new("A", "Alpha", 1), Category::new("B", "Beta", 0)],
            codes: vec![
                Code {
                    id: "c1".to_string(),
                    name: "One".to_string(),
                    value: "one".to_string(),
                    category_id: Some("A".to_string()),
                },
                Code {
                    id: "c2".to_string(),
                    name: "Two".to_string(),
                    value: "two".to_string(),
                    category_id: Some("B".to_string()),
                },
            ],
            ..Default::default()
        };

        let mut zoe = Attendee::new("1", "zoe", "Zed");
        zoe.admin_token = Some("credential".to_string());
        state.attendees = vec![
            zoe,
            Attendee::new("2", "Adam", "Young"),
            Attendee::new("3", "adam", "Abbott"),
            Attendee::new("4", "Bea", "Ng"),
        ];

        let scans = |ids: &[&str]| ids.iter().map(|s| s.to_string()).collect::<ScanSet>();
        state.scans.insert("1".to_string(), scans(&["c1"]));
        state.scans.insert("3".to_string(), scans(&["c2"]));
        state.scans.insert("4".to_string(), scans(&["c1", "c2"]));
        state
    }

    #[test]
    fn test_roster_ranking() {
        let roster = build_roster(&state());
        let ids: Vec<_> = roster.iter().map(|r| r.id.as_str()).collect();

        // Done: Bea, zoe. Not done: adam Abbott, Adam Young.
        assert_eq!(ids, vec!["4", "1", "3", "2"]);
        assert!(roster[0].is_done && roster[1].is_done);
        assert!(!roster[2].is_done && !roster[3].is_done);
    }

    #[test]
    fn test_roster_counts_every_category() {
        let roster = build_roster(&state());
        let bea = roster.iter().find(|r| r.id == "4").unwrap();

        assert_eq!(bea.scans.len(), 2);
        assert_eq!(bea.scans[0].count, 1);
        assert_eq!(bea.scans[1].count, 1);

        let adam = roster.iter().find(|r| r.id == "2").unwrap();
        assert!(adam.scans.iter().all(|s| s.count == 0));
    }

    #[test]
    fn test_roster_admin_flag() {
        let roster = build_roster(&state());
        let zoe = roster.iter().find(|r| r.id == "1").unwrap();
        assert!(zoe.is_admin);
        assert!(roster.iter().filter(|r| r.is_admin).count() == 1);
    }
}
