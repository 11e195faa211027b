// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Singleton challenge texts.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Title shown when the organizer has not set one.
pub const DEFAULT_TITLE: &str = "Challenge";

/// Challenge configuration.
///
/// Stored at: `challenge/config`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChallengeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Message on the welcome overlay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome: Option<String>,
    /// Message on the completion overlay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_description: Option<String>,
}

impl ChallengeConfig {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => DEFAULT_TITLE,
        }
    }
}
