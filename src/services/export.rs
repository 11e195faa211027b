// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CSV export of attendees who completed the hunt.

use crate::error::AppError;
use crate::views::RosterRow;
use serde::Serialize;

/// Download name offered to the browser.
pub const EXPORT_FILENAME: &str = "attendees-completed.csv";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRecord<'a> {
    id: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    email: Option<&'a str>,
    title: Option<&'a str>,
    company: Option<&'a str>,
}

/// Render completed attendees as CSV, keeping roster order.
pub fn completed_attendees_csv(roster: &[RosterRow]) -> Result<String, AppError> {
    // Header written by hand so an empty export still has one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(["id", "firstName", "lastName", "email", "title", "company"])
        .map_err(|e| AppError::Internal(e.into()))?;

    let mut exported = 0usize;
    for row in roster.iter().filter(|row| row.is_done) {
        writer
            .serialize(ExportRecord {
                id: &row.id,
                first_name: &row.first_name,
                last_name: &row.last_name,
                email: row.email.as_deref(),
                title: row.title.as_deref(),
                company: row.company.as_deref(),
            })
            .map_err(|e| AppError::Internal(e.into()))?;
        exported += 1;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV flush failed: {}", e)))?;

    tracing::info!(exported, "Completed attendees exported");

    String::from_utf8(bytes).map_err(|e| AppError::Internal(e.into()))
}
