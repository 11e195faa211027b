// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendee screen state machine.

use serde::Serialize;

use crate::db::ChangeEvent;
use crate::models::{code_id, AttendeeProgress, ScanSet};
use crate::services::scan::{classify_decode, DecodeDecision};
use crate::views::HuntState;

/// Why the scanner is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Scan a code for progress
    Scan,
    /// Register a new code (admin attendees only)
    AddCode,
}

/// Which screen the attendee sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", content = "mode", rename_all = "snake_case")]
pub enum Screen {
    /// Waiting for the user's scans to arrive
    Loading,
    Welcome,
    Scanner(ScanMode),
    Progress,
}

/// Attendee view: mirrored store state plus local UI flags.
#[derive(Debug, Clone)]
pub struct AttendeeView {
    user_id: String,
    is_admin: bool,
    state: HuntState,
    scans_loaded: bool,
    welcome_dismissed: bool,
    done_dismissed: bool,
    scanner: Option<ScanMode>,
}

impl AttendeeView {
    pub fn new(user_id: impl Into<String>, is_admin: bool) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin,
            state: HuntState::default(),
            scans_loaded: false,
            welcome_dismissed: false,
            done_dismissed: false,
            scanner: None,
        }
    }

    /// Start from a store snapshot that already includes the user's scans.
    pub fn from_snapshot(user_id: impl Into<String>, is_admin: bool, state: HuntState) -> Self {
        let mut view = Self::new(user_id, is_admin);
        view.scans_loaded = state.scans_for(&view.user_id).is_some();
        view.state = state;
        view
    }

    /// Apply a store notification. Other users' scans are ignored.
    pub fn apply(&mut self, event: ChangeEvent) {
        let event = match event {
            ChangeEvent::AllScans(mut all) => ChangeEvent::Scans {
                scans: all.remove(&self.user_id).unwrap_or_default(),
                user_id: self.user_id.clone(),
            },
            other => other,
        };
        if let ChangeEvent::Scans { user_id, .. } = &event {
            if *user_id != self.user_id {
                return;
            }
            self.scans_loaded = true;
        }
        self.state.apply(event);
    }

    pub fn state(&self) -> &HuntState {
        &self.state
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn title(&self) -> &str {
        self.state.challenge.display_title()
    }

    /// The user's scans, or `None` while still loading.
    pub fn scans(&self) -> Option<&ScanSet> {
        if !self.scans_loaded {
            return None;
        }
        self.state.scans_for(&self.user_id)
    }

    pub fn progress(&self) -> Option<AttendeeProgress> {
        self.scans()
            .map(|scans| AttendeeProgress::compute(&self.state.categories, &self.state.codes, scans))
    }

    fn any_scans(&self) -> bool {
        self.scans().is_some_and(|scans| !scans.is_empty())
    }

    pub fn screen(&self) -> Screen {
        if self.scans().is_none() {
            Screen::Loading
        } else if !self.welcome_dismissed && !self.any_scans() {
            Screen::Welcome
        } else if let Some(mode) = self.scanner {
            Screen::Scanner(mode)
        } else {
            Screen::Progress
        }
    }

    /// The completion overlay covers whatever screen is active.
    pub fn show_done_overlay(&self) -> bool {
        !self.done_dismissed && self.progress().is_some_and(|p| p.is_done)
    }

    /// Open the scanner. Returns `false` if the mode is not allowed.
    pub fn open_scanner(&mut self, mode: ScanMode) -> bool {
        if mode == ScanMode::AddCode && !self.is_admin {
            return false;
        }
        self.scanner = Some(mode);
        true
    }

    /// Close the scanner, discarding the pending decode handler.
    pub fn cancel_scan(&mut self) {
        self.scanner = None;
    }

    /// Consume the pending scanner for a decode. The scanner closes either way.
    pub fn take_scan_mode(&mut self) -> Option<ScanMode> {
        self.scanner.take()
    }

    /// Preview what a decode would do, using mirrored state only.
    pub fn preview_decode(&self, payload: &str) -> Option<DecodeDecision<'_>> {
        let scans = self.scans()?;
        let code = self.state.find_code(&code_id(payload));
        Some(classify_decode(code, scans))
    }

    pub fn dismiss_welcome(&mut self) {
        self.welcome_dismissed = true;
    }

    pub fn dismiss_done(&mut self) {
        self.done_dismissed = true;
    }
}
