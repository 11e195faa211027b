// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendee model for storage and API.

use serde::{Deserialize, Serialize};

/// Attendee profile stored in the hunt store.
///
/// Stored at: `attendees/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    /// Event platform user ID (also used as document ID)
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Profile picture URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Long-lived elevated credential. Its presence is the admin flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
}

impl Attendee {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }

    /// Admin role is derived from credential presence, never stored as a flag.
    pub fn is_admin(&self) -> bool {
        self.admin_token.is_some()
    }

    /// Copy profile fields from a fresh sign-in, keeping the stored credential.
    pub fn merge_profile(&mut self, profile: Attendee) {
        let admin_token = self.admin_token.take();
        *self = Attendee {
            admin_token,
            ..profile
        };
    }
}
