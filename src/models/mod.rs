// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod attendee;
pub mod category;
pub mod challenge;
pub mod code;
pub mod progress;
pub mod scans;

pub use attendee::Attendee;
pub use category::Category;
pub use challenge::ChallengeConfig;
pub use code::{code_id, Code};
pub use progress::{AttendeeProgress, CategoryCounts, CategoryProgress};
pub use scans::{ScanRecord, ScanSet};
