// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and skip
//! otherwise. Every test uses unique IDs so runs do not interfere.

use qr_hunt::db::{ChangeEvent, HuntStore, RecordChange};
use qr_hunt::models::{Attendee, Category, ChallengeConfig, Code};
use qr_hunt::services::{ScanOutcome, ScanService};
use std::sync::Arc;

mod common;
use common::{test_db, unique_id};

// ═══════════════════════════════════════════════════════════════════════════
// CATALOG TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_category_lifecycle() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("cat");

    assert!(db.get_category(&id).await.unwrap().is_none());

    db.upsert_category(&Category::new(&id, "Booths", 2))
        .await
        .unwrap();
    let stored = db.get_category(&id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Booths");
    assert_eq!(stored.scans_required, 2);

    assert!(db.delete_category(&id).await.unwrap());
    assert!(!db.delete_category(&id).await.unwrap());
}

#[tokio::test]
async fn test_insert_code_if_absent_keeps_existing() {
    require_emulator!();

    let db = test_db().await;
    let payload = unique_id("payload");

    let mut first = Code::from_payload(&payload, "First");
    first.category_id = Some("cat".to_string());
    assert!(db.insert_code_if_absent(&first).await.unwrap());

    let second = Code::from_payload(&payload, "Second");
    assert!(!db.insert_code_if_absent(&second).await.unwrap());

    let stored = db.get_code(&first.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "First");
    assert_eq!(stored.category_id.as_deref(), Some("cat"));
}

#[tokio::test]
async fn test_challenge_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let config = ChallengeConfig {
        title: Some("Expo Hunt".to_string()),
        ..Default::default()
    };
    db.set_challenge(&config).await.unwrap();

    let stored = db.get_challenge().await.unwrap();
    assert_eq!(stored.display_title(), "Expo Hunt");
}

// ═══════════════════════════════════════════════════════════════════════════
// ATTENDEE & SCAN TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_admin_token_set_and_cleared() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("att");
    db.upsert_attendee(&Attendee::new(&id, "Ada", "Lovelace"))
        .await
        .unwrap();

    db.set_admin_token(&id, Some("credential")).await.unwrap();
    assert!(db.get_attendee(&id).await.unwrap().unwrap().is_admin());

    db.set_admin_token(&id, None).await.unwrap();
    let stored = db.get_attendee(&id).await.unwrap().unwrap();
    assert!(!stored.is_admin());
    assert_eq!(stored.first_name, "Ada");
}

#[tokio::test]
async fn test_concurrent_scans_record_once() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id("user");
    let payload = unique_id("booth");
    let code = Code::from_payload(&payload, "Booth");
    db.upsert_code(&code).await.unwrap();

    let service = ScanService::new(Arc::new(db.clone()));
    let mut handles = Vec::new();
    for _ in 0..5 {
        let service = service.clone();
        let user_id = user_id.clone();
        let payload = payload.clone();
        handles.push(tokio::spawn(async move {
            service.handle_decode(&user_id, &payload).await
        }));
    }

    let mut recorded = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            ScanOutcome::Recorded { .. } => recorded += 1,
            ScanOutcome::AlreadyScanned { .. } => duplicates += 1,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    assert_eq!(recorded, 1);
    assert_eq!(duplicates, 4);
    assert_eq!(db.get_scans(&user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_code_inserts_store_once() {
    require_emulator!();

    let db = test_db().await;
    let payload = unique_id("booth");

    let mut handles = Vec::new();
    for i in 0..5 {
        let db = db.clone();
        let code = Code::from_payload(&payload, &format!("Booth {}", i));
        handles.push(tokio::spawn(async move {
            db.insert_code_if_absent(&code).await
        }));
    }

    let mut inserted = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() {
            inserted += 1;
        }
    }
    assert_eq!(inserted, 1);
}

#[tokio::test]
async fn test_writes_are_announced() {
    require_emulator!();

    let db = test_db().await;
    let mut rx = db.subscribe();
    let id = unique_id("cat");

    db.upsert_category(&Category::new(&id, "Announced", 1))
        .await
        .unwrap();

    match rx.recv().await.unwrap() {
        ChangeEvent::Category(RecordChange::Added { record }) => assert_eq!(record.id, id),
        other => panic!("unexpected event: {:?}", other),
    }
}
