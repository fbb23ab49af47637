// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the safety guard against a real database.

use murmur_config::model::LimitsConfig;
use murmur_core::ActionType;
use murmur_safety::{DenialReason, SafetyGuard};
use murmur_storage::models::{RecordStatus, ReplyRecord};
use murmur_storage::queries::{rate_limits, replies};
use murmur_storage::Database;
use tempfile::tempdir;

async fn setup(limits: LimitsConfig) -> (SafetyGuard, Database, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("guard.db");
    let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
    rate_limits::init_rate_limits(&db, &limits).await.unwrap();
    let guard = SafetyGuard::new(db.clone(), &limits);
    (guard, db, dir)
}

fn limits(max_replies: u32) -> LimitsConfig {
    LimitsConfig {
        max_replies_per_day: max_replies,
        ..LimitsConfig::default()
    }
}

#[tokio::test]
async fn fresh_target_is_allowed() {
    let (guard, db, _dir) = setup(limits(5)).await;
    assert_eq!(guard.can_reply("t-1", Some("hello there")).await.unwrap(), Ok(()));
    assert_eq!(guard.can_post_tweet().await.unwrap(), Ok(()));
    assert_eq!(guard.can_post_thread().await.unwrap(), Ok(()));
    db.close().await.unwrap();
}

#[tokio::test]
async fn rate_limit_is_checked_first() {
    let (guard, db, _dir) = setup(limits(1)).await;
    replies::insert_reply(&db, &ReplyRecord::new("t-1", "first", RecordStatus::Sent))
        .await
        .unwrap();
    guard.record_reply().await.unwrap();

    // Both limited and already replied: the rate limit wins.
    let decision = guard.can_reply("t-1", None).await.unwrap();
    assert_eq!(
        decision,
        Err(DenialReason::RateLimited {
            action: ActionType::Reply,
            current: 1,
            max: 1
        })
    );
    db.close().await.unwrap();
}

#[tokio::test]
async fn already_replied_before_phrasing() {
    let (guard, db, _dir) = setup(limits(10)).await;
    replies::insert_reply(&db, &ReplyRecord::new("t-7", "great tool for developers", RecordStatus::Sent))
        .await
        .unwrap();

    assert_eq!(
        guard.can_reply("t-7", Some("great tool for developers")).await.unwrap(),
        Err(DenialReason::AlreadyReplied { id: "t-7".into() })
    );
    assert_eq!(
        guard.can_reply("t-8", Some("great tool for devs")).await.unwrap(),
        Err(DenialReason::SimilarPhrasing)
    );
    assert_eq!(
        guard.can_reply("t-8", Some("I love pasta")).await.unwrap(),
        Ok(())
    );
    // Without text only the history is consulted.
    assert_eq!(guard.can_reply("t-8", None).await.unwrap(), Ok(()));
    db.close().await.unwrap();
}

#[tokio::test]
async fn can_reply_does_not_count() {
    let (guard, db, _dir) = setup(limits(1)).await;
    for _ in 0..3 {
        assert_eq!(guard.can_reply("t-1", None).await.unwrap(), Ok(()));
    }
    db.close().await.unwrap();
}

#[tokio::test]
async fn reserve_reply_counts_and_stops_at_max() {
    let (guard, db, _dir) = setup(limits(2)).await;
    assert_eq!(guard.reserve_reply("a", "first reply text").await.unwrap(), Ok(()));
    assert_eq!(guard.reserve_reply("b", "something else entirely").await.unwrap(), Ok(()));
    assert!(matches!(
        guard.reserve_reply("c", "a third distinct message").await.unwrap(),
        Err(DenialReason::RateLimited { current: 2, max: 2, .. })
    ));
    db.close().await.unwrap();
}

#[tokio::test]
async fn reserve_reply_denied_by_history_does_not_consume_budget() {
    let (guard, db, _dir) = setup(limits(1)).await;
    replies::insert_reply(&db, &ReplyRecord::new("dup", "old reply", RecordStatus::Sent))
        .await
        .unwrap();
    assert!(matches!(
        guard.reserve_reply("dup", "new text").await.unwrap(),
        Err(DenialReason::AlreadyReplied { .. })
    ));
    assert_eq!(guard.reserve_reply("fresh", "new text").await.unwrap(), Ok(()));
    db.close().await.unwrap();
}

#[tokio::test]
async fn thread_limit_after_record() {
    let (guard, db, _dir) = setup(LimitsConfig::default()).await;
    guard.record_thread().await.unwrap();
    assert!(matches!(
        guard.can_post_thread().await.unwrap(),
        Err(DenialReason::RateLimited {
            action: ActionType::Thread,
            ..
        })
    ));
    db.close().await.unwrap();
}

#[tokio::test]
async fn concurrent_reservations_respect_limit() {
    let (guard, db, _dir) = setup(limits(3)).await;
    let mut handles = Vec::new();
    for i in 0..12 {
        let guard = guard.clone();
        handles.push(tokio::spawn(async move {
            guard
                .reserve_reply(&format!("target-{i}"), &format!("unique message number {i} {}", "x".repeat(i)))
                .await
                .unwrap()
        }));
    }
    let mut granted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            granted += 1;
        }
    }
    assert_eq!(granted, 3);
    drop(guard);
    db.close().await.unwrap();
}

#[tokio::test]
async fn repeated_post_failures_exhaust_the_target() {
    let (guard, db, _dir) = setup(LimitsConfig {
        max_reply_attempts: 2,
        ..limits(10)
    })
    .await;

    let failed = ReplyRecord::new("t-3", "first try", RecordStatus::Failed).with_error("network");
    replies::insert_reply(&db, &failed).await.unwrap();
    assert_eq!(guard.can_reply("t-3", None).await.unwrap(), Ok(()));

    let failed = ReplyRecord::new("t-3", "second try", RecordStatus::Failed).with_error("network");
    replies::insert_reply(&db, &failed).await.unwrap();
    assert_eq!(
        guard.can_reply("t-3", None).await.unwrap(),
        Err(DenialReason::AttemptsExhausted {
            id: "t-3".into(),
            attempts: 2
        })
    );

    // An exhausted target costs nothing from the reply budget.
    assert_eq!(
        guard.reserve_reply("t-3", "third try").await.unwrap(),
        Err(DenialReason::AttemptsExhausted {
            id: "t-3".into(),
            attempts: 2
        })
    );
    let usage = guard.usage().await.unwrap();
    let reply = usage.iter().find(|s| s.action == ActionType::Reply).unwrap();
    assert_eq!(reply.request_count, 0);
    db.close().await.unwrap();
}
