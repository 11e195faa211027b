// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Change events published by hunt stores.
//!
//! Record collections emit added/changed/removed events; scans and the
//! challenge config emit whole-value replacements. Subscribers fold them into
//! a [`crate::views::HuntState`].

use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::broadcast;

use crate::models::{Attendee, Category, ChallengeConfig, Code, ScanSet};

/// Events buffered per subscriber before the oldest are dropped.
pub const CHANGE_FEED_CAPACITY: usize = 256;

/// A change to one record of a keyed collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum RecordChange<T> {
    Added { record: T },
    Changed { record: T },
    Removed { id: String },
}

/// A change notification from the hunt store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ChangeEvent {
    Category(RecordChange<Category>),
    Code(RecordChange<Code>),
    Attendee(RecordChange<Attendee>),
    /// Full scan set of one user after a write
    Scans { user_id: String, scans: ScanSet },
    /// Replacement of every user's scan set (admin snapshot)
    AllScans(HashMap<String, ScanSet>),
    Challenge(ChallengeConfig),
}

impl ChangeEvent {
    /// Whether this event may be forwarded to the given attendee.
    ///
    /// Attendee records carry admin credentials and other users' scans are
    /// private, so only shared challenge data and the user's own scans pass.
    pub fn visible_to(&self, user_id: &str) -> bool {
        match self {
            ChangeEvent::Category(_) | ChangeEvent::Code(_) | ChangeEvent::Challenge(_) => true,
            ChangeEvent::Scans { user_id: owner, .. } => owner == user_id,
            ChangeEvent::Attendee(_) | ChangeEvent::AllScans(_) => false,
        }
    }
}

/// Fan-out channel shared by a store and its subscribers.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(CHANGE_FEED_CAPACITY)
    }
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: ChangeEvent) {
        // No subscribers is the normal idle case
        if self.sender.send(event).is_err() {
            tracing::trace!("Change event published with no subscribers");
        }
    }

    /// Start receiving events. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
