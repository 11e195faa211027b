// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Derived view state for the attendee app and the admin console.

pub mod admin;
pub mod attendee;
pub mod state;

pub use admin::{build_roster, RosterRow};
pub use attendee::{AttendeeView, ScanMode, Screen};
pub use state::{reduce, HuntState};
