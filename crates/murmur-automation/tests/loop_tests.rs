// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loop ticks against a real database and scripted collaborators.

use std::time::Duration;

use murmur_automation::{
    AutomationLoop, ContentLoop, DiscoveryLoop, MentionsLoop, ThreadLoop, TopicRotation,
};
use murmur_config::model::{BusinessConfig, LimitsConfig};
use murmur_core::types::EngagementMetrics;
use murmur_core::{ActionStatus, ActionType, GenerationError, PlatformError, TweetCandidate};
use murmur_scoring::ScoringEngine;
use murmur_storage::RecordStatus;
use murmur_storage::queries::{action_log, candidates, content, cursors, rate_limits, replies};
use murmur_test_utils::{PlatformCall, TestHarness, tweet};

const HOUR: Duration = Duration::from_secs(3600);

fn business() -> BusinessConfig {
    BusinessConfig {
        product_name: "Ferrous".into(),
        product_keywords: vec!["rust".into()],
        competitor_keywords: Vec::new(),
        industry_topics: vec!["observability".into()],
    }
}

/// Keyword hit, 100k followers, fresh, 1.25% engagement: scores about 81.
fn hot(id: &str) -> TweetCandidate {
    let mut t = tweet(id, "Rewrote our ingest service in Rust", 100_000);
    t.metrics = EngagementMetrics {
        likes: 1_000,
        retweets: 200,
        replies: 50,
    };
    t
}

/// No keyword, tiny audience: well below 70.
fn cold(id: &str) -> TweetCandidate {
    tweet(id, "lunch was great today", 10)
}

async fn harness() -> TestHarness {
    TestHarness::builder()
        .with_business(business())
        .build()
        .await
        .unwrap()
}

fn discovery(h: &TestHarness) -> DiscoveryLoop {
    let engine = ScoringEngine::from_config(&h.config.scoring, &h.config.business);
    DiscoveryLoop::new(h.context(), engine, HOUR)
}

fn topics(h: &TestHarness) -> TopicRotation {
    TopicRotation::new(h.config.business.industry_topics.clone(), 3)
}

async fn reply_count(h: &TestHarness) -> u32 {
    rate_limits::check(&h.db, ActionType::Reply)
        .await
        .unwrap()
        .map(|s| s.request_count)
        .unwrap_or(0)
}

#[tokio::test]
async fn discovery_replies_only_above_threshold() {
    let h = harness().await;
    h.platform.push_search(Ok(vec![cold("10"), hot("11")])).await;

    let report = discovery(&h).tick().await.unwrap();
    assert_eq!(report.acted, 1);
    assert_eq!(report.skipped, 1);

    let calls = h.platform.calls().await;
    assert_eq!(calls[0], PlatformCall::Search("rust".into()));
    let writes = h.platform.writes().await;
    assert_eq!(writes.len(), 1);
    assert!(matches!(&writes[0], PlatformCall::Reply { parent_id, .. } if parent_id == "11"));

    // Both candidates persisted, only the hot one marked replied.
    let cold_row = candidates::get_candidate(&h.db, "10").await.unwrap().unwrap();
    let hot_row = candidates::get_candidate(&h.db, "11").await.unwrap().unwrap();
    assert!(!cold_row.replied_to);
    assert!(hot_row.replied_to);
    assert_eq!(hot_row.matched_keyword.as_deref(), Some("rust"));
    assert!(hot_row.relevance_score >= 70.0);

    assert_eq!(reply_count(&h).await, 1);
    assert!(replies::has_replied(&h.db, "11").await.unwrap());
    assert_eq!(
        action_log::count_actions(&h.db, "reply", ActionStatus::Success).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn generation_failure_is_isolated_per_candidate() {
    let h = harness().await;
    h.platform.push_search(Ok(vec![hot("20"), hot("21")])).await;
    h.generator
        .push_reply(Err(GenerationError::Unreachable("connection refused".into())))
        .await;

    let report = discovery(&h).tick().await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.acted, 1);
    assert!(!replies::has_replied(&h.db, "20").await.unwrap());
    assert!(replies::has_replied(&h.db, "21").await.unwrap());
    assert_eq!(
        action_log::count_actions(&h.db, "reply", ActionStatus::Failure).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn failed_reply_post_aborts_tick_and_is_recorded() {
    let h = harness().await;
    h.platform.push_search(Ok(vec![hot("30"), hot("31")])).await;
    h.platform
        .push_write(Err(PlatformError::Network("connection reset".into())))
        .await;

    let err = discovery(&h).tick().await.unwrap_err();
    assert!(err.is_transient());

    // Only the first candidate was attempted.
    assert_eq!(h.platform.writes().await.len(), 1);
    let recorded = replies::recent_replies(&h.db, 10).await.unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].status, RecordStatus::Failed);
    // A failed reply does not block a later retry of the same target.
    assert!(!replies::has_replied(&h.db, "30").await.unwrap());
}

#[tokio::test]
async fn rejected_discovery_reply_moves_on_to_next_candidate() {
    let h = harness().await;
    h.platform.push_search(Ok(vec![hot("40"), hot("41")])).await;
    h.platform
        .push_write(Err(PlatformError::Other("replies restricted".into())))
        .await;

    let report = discovery(&h).tick().await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.acted, 1);
    assert_eq!(h.platform.writes().await.len(), 2);
    assert!(!candidates::get_candidate(&h.db, "40").await.unwrap().unwrap().replied_to);
    assert!(candidates::get_candidate(&h.db, "41").await.unwrap().unwrap().replied_to);
    assert_eq!(replies::failed_attempts(&h.db, "40").await.unwrap(), 1);
}

#[tokio::test]
async fn discovery_rotates_keywords_per_tick() {
    let h = TestHarness::builder()
        .with_business(BusinessConfig {
            competitor_keywords: vec!["tokio".into()],
            ..business()
        })
        .build()
        .await
        .unwrap();
    let mut discovery = discovery(&h);

    for _ in 0..3 {
        discovery.tick().await.unwrap();
    }
    let searched: Vec<_> = h
        .platform
        .calls()
        .await
        .into_iter()
        .filter_map(|c| match c {
            PlatformCall::Search(k) => Some(k),
            _ => None,
        })
        .collect();
    assert_eq!(searched, vec!["rust", "tokio", "rust"]);
}

#[tokio::test]
async fn mentions_are_answered_oldest_first_and_cursor_advances() {
    let h = harness().await;
    h.platform
        .push_mentions(Ok(vec![cold("200"), cold("150")]))
        .await;
    let mut mentions = MentionsLoop::new(h.context(), HOUR);

    let report = mentions.tick().await.unwrap();
    assert_eq!(report.acted, 2);

    let parents: Vec<_> = h
        .platform
        .writes()
        .await
        .into_iter()
        .filter_map(|c| match c {
            PlatformCall::Reply { parent_id, .. } => Some(parent_id),
            _ => None,
        })
        .collect();
    assert_eq!(parents, vec!["150", "200"]);
    assert_eq!(
        cursors::get_cursor(&h.db, cursors::MENTIONS_SINCE_ID).await.unwrap().as_deref(),
        Some("200")
    );

    mentions.tick().await.unwrap();
    let calls = h.platform.calls().await;
    assert!(calls.contains(&PlatformCall::Mentions(Some("200".into()))));
}

#[tokio::test]
async fn reply_limit_stops_mentions_without_advancing_cursor() {
    let h = TestHarness::builder()
        .with_business(business())
        .with_limits(LimitsConfig {
            max_replies_per_day: 1,
            ..LimitsConfig::default()
        })
        .build()
        .await
        .unwrap();
    h.platform
        .push_mentions(Ok(vec![cold("10"), cold("11"), cold("12")]))
        .await;

    let report = MentionsLoop::new(h.context(), HOUR).tick().await.unwrap();
    assert_eq!(report.acted, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(h.platform.writes().await.len(), 1);
    assert_eq!(
        cursors::get_cursor(&h.db, cursors::MENTIONS_SINCE_ID).await.unwrap().as_deref(),
        Some("10")
    );
    assert_eq!(
        action_log::count_actions(&h.db, "reply", ActionStatus::Skipped).await.unwrap(),
        1
    );
}

fn reply_parents(calls: Vec<PlatformCall>) -> Vec<String> {
    calls
        .into_iter()
        .filter_map(|c| match c {
            PlatformCall::Reply { parent_id, .. } => Some(parent_id),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn rejected_mention_does_not_block_newer_ones() {
    let h = harness().await;
    h.platform.push_mentions(Ok(vec![cold("10"), cold("11")])).await;
    h.platform
        .push_write(Err(PlatformError::Other("tweet deleted".into())))
        .await;
    let mut mentions = MentionsLoop::new(h.context(), HOUR);

    let report = mentions.tick().await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.acted, 1);
    assert_eq!(reply_parents(h.platform.writes().await), vec!["10", "11"]);
    assert!(!replies::has_replied(&h.db, "10").await.unwrap());
    assert!(replies::has_replied(&h.db, "11").await.unwrap());
    assert_eq!(
        cursors::get_cursor(&h.db, cursors::MENTIONS_SINCE_ID).await.unwrap().as_deref(),
        Some("11")
    );

    // The next fetch starts after both mentions; nothing is posted again.
    mentions.tick().await.unwrap();
    assert!(h.platform.calls().await.contains(&PlatformCall::Mentions(Some("11".into()))));
    assert_eq!(h.platform.writes().await.len(), 2);
    assert_eq!(reply_count(&h).await, 2);
}

#[tokio::test]
async fn transient_reply_failures_are_capped_per_mention() {
    let h = harness().await;
    let attempts = h.config.limits.max_reply_attempts;
    let mut mentions = MentionsLoop::new(h.context(), HOUR);

    for _ in 0..attempts {
        h.platform.push_mentions(Ok(vec![cold("10"), cold("11")])).await;
        h.platform
            .push_write(Err(PlatformError::Network("connection reset".into())))
            .await;
        let err = mentions.tick().await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(
            cursors::get_cursor(&h.db, cursors::MENTIONS_SINCE_ID).await.unwrap(),
            None
        );
    }

    // Out of attempts: the mention is skipped without generating or posting.
    let generated = h.generator.reply_calls();
    h.platform.push_mentions(Ok(vec![cold("10"), cold("11")])).await;
    let report = mentions.tick().await.unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.acted, 1);
    assert_eq!(h.generator.reply_calls(), generated + 1);

    let mut expected = vec!["10".to_string(); attempts as usize];
    expected.push("11".to_string());
    assert_eq!(reply_parents(h.platform.writes().await), expected);
    assert_eq!(reply_count(&h).await, attempts + 1);
    assert_eq!(
        cursors::get_cursor(&h.db, cursors::MENTIONS_SINCE_ID).await.unwrap().as_deref(),
        Some("11")
    );
}

#[tokio::test]
async fn content_posts_once_per_window() {
    let h = harness().await;
    let mut loop_ = ContentLoop::new(h.context(), topics(&h), HOUR, HOUR);

    let report = loop_.tick().await.unwrap();
    assert_eq!(report.acted, 1);
    let report = loop_.tick().await.unwrap();
    assert_eq!(report.acted, 0);

    let writes = h.platform.writes().await;
    assert_eq!(writes.len(), 1);
    assert!(matches!(&writes[0], PlatformCall::Post(text) if text.contains("observability")));
    let tweets = rate_limits::check(&h.db, ActionType::Tweet).await.unwrap().unwrap();
    assert_eq!(tweets.request_count, 1);
    assert!(content::last_original_tweet_at(&h.db).await.unwrap().is_some());
}

#[tokio::test]
async fn tweet_limit_skips_content() {
    let h = TestHarness::builder()
        .with_business(business())
        .with_limits(LimitsConfig {
            max_tweets_per_day: 0,
            ..LimitsConfig::default()
        })
        .build()
        .await
        .unwrap();

    let report = ContentLoop::new(h.context(), topics(&h), HOUR, HOUR)
        .tick()
        .await
        .unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(h.generator.tweet_calls(), 0);
    assert!(h.platform.writes().await.is_empty());
    assert_eq!(
        action_log::count_actions(&h.db, "tweet", ActionStatus::Skipped).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn thread_is_posted_as_reply_chain() {
    let h = harness().await;
    h.generator
        .push_thread(Ok(vec!["one".into(), "two".into(), "three".into()]))
        .await;
    h.platform.push_write(Ok("t1".into())).await;
    h.platform.push_write(Ok("t2".into())).await;
    h.platform.push_write(Ok("t3".into())).await;

    let report = ThreadLoop::new(h.context(), topics(&h), 3, HOUR, HOUR)
        .tick()
        .await
        .unwrap();
    assert_eq!(report.acted, 1);

    let writes = h.platform.writes().await;
    assert_eq!(
        writes,
        vec![
            PlatformCall::Post("one".into()),
            PlatformCall::Reply {
                parent_id: "t1".into(),
                text: "two".into()
            },
            PlatformCall::Reply {
                parent_id: "t2".into(),
                text: "three".into()
            },
        ]
    );
    let thread = content::get_thread(&h.db, 1).await.unwrap().unwrap();
    assert_eq!(thread.status, RecordStatus::Sent);
    assert_eq!(thread.tweet_count, 3);
    assert_eq!(thread.root_tweet_id.as_deref(), Some("t1"));
}

#[tokio::test]
async fn shutdown_during_thread_tick_still_completes_the_chain() {
    let h = harness().await;
    h.generator
        .push_thread(Ok(vec!["a".into(), "b".into(), "c".into()]))
        .await;
    h.cancel.cancel();

    let report = ThreadLoop::new(h.context(), topics(&h), 3, HOUR, HOUR)
        .tick()
        .await
        .unwrap();
    assert_eq!(report.acted, 1);
    assert_eq!(report.failed, 0);

    assert_eq!(h.platform.writes().await.len(), 3);
    let thread = content::get_thread(&h.db, 1).await.unwrap().unwrap();
    assert_eq!(thread.status, RecordStatus::Sent);
    assert_eq!(thread.tweet_count, 3);
}

#[tokio::test]
async fn partial_thread_records_exact_count_and_is_not_retried() {
    let h = harness().await;
    h.generator
        .push_thread(Ok(vec!["a".into(), "b".into(), "c".into(), "d".into()]))
        .await;
    h.platform.push_write(Ok("t1".into())).await;
    h.platform.push_write(Ok("t2".into())).await;
    h.platform
        .push_write(Err(PlatformError::Other("duplicate content".into())))
        .await;
    let mut loop_ = ThreadLoop::new(h.context(), topics(&h), 4, HOUR, HOUR);

    let report = loop_.tick().await.unwrap();
    assert_eq!(report.acted, 1);
    assert_eq!(report.failed, 1);

    let thread = content::get_thread(&h.db, 1).await.unwrap().unwrap();
    assert_eq!(thread.status, RecordStatus::Partial);
    assert_eq!(thread.planned_count, 4);
    assert_eq!(thread.tweet_count, 2);
    assert_eq!(content::thread_tweets(&h.db, 1).await.unwrap().len(), 2);
    assert_eq!(
        action_log::count_actions(&h.db, "thread", ActionStatus::Partial).await.unwrap(),
        1
    );

    // Next tick: the partial thread counts as the latest one, nothing is resent.
    loop_.tick().await.unwrap();
    assert_eq!(h.platform.writes().await.len(), 3);
    assert_eq!(h.generator.thread_calls(), 1);
}

#[tokio::test]
async fn failed_thread_root_is_an_error() {
    let h = harness().await;
    h.platform
        .push_write(Err(PlatformError::Network("timeout".into())))
        .await;

    let err = ThreadLoop::new(h.context(), topics(&h), 3, HOUR, HOUR)
        .tick()
        .await
        .unwrap_err();
    assert!(err.is_transient());
    let thread = content::get_thread(&h.db, 1).await.unwrap().unwrap();
    assert_eq!(thread.status, RecordStatus::Failed);
    assert_eq!(thread.tweet_count, 0);
    assert!(content::last_thread_at(&h.db).await.unwrap().is_none());
}

#[tokio::test]
async fn dry_run_never_calls_posting_methods() {
    let h = TestHarness::builder()
        .with_business(business())
        .dry_run(true)
        .build()
        .await
        .unwrap();
    h.platform.push_search(Ok(vec![hot("40")])).await;
    h.platform.push_mentions(Ok(vec![cold("41")])).await;

    discovery(&h).tick().await.unwrap();
    MentionsLoop::new(h.context(), HOUR).tick().await.unwrap();
    ContentLoop::new(h.context(), topics(&h), HOUR, HOUR)
        .tick()
        .await
        .unwrap();
    ThreadLoop::new(h.context(), topics(&h), 3, HOUR, HOUR)
        .tick()
        .await
        .unwrap();

    assert!(h.platform.writes().await.is_empty());
    // Generation still ran for every action.
    assert_eq!(h.generator.reply_calls(), 2);
    assert_eq!(h.generator.tweet_calls(), 1);
    assert_eq!(h.generator.thread_calls(), 1);

    assert_eq!(
        action_log::count_actions(&h.db, "reply", ActionStatus::DryRun).await.unwrap(),
        2
    );
    assert_eq!(
        action_log::count_actions(&h.db, "tweet", ActionStatus::DryRun).await.unwrap(),
        1
    );
    assert_eq!(
        action_log::count_actions(&h.db, "thread", ActionStatus::DryRun).await.unwrap(),
        1
    );
    // Dry runs do not consume posting limits.
    assert_eq!(reply_count(&h).await, 0);
    let thread = content::get_thread(&h.db, 1).await.unwrap().unwrap();
    assert_eq!(thread.status, RecordStatus::DryRun);
}
