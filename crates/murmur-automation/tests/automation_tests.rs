// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The full loop set started from config, run once, and shut down.

use std::sync::Arc;

use murmur_automation::{Automation, LoopKind, LoopState};
use murmur_config::model::BusinessConfig;
use murmur_core::{ContentGenerator, PlatformClient};
use murmur_test_utils::{PlatformCall, TestHarness};
use tokio_util::sync::CancellationToken;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn every_loop_ticks_then_stops_on_shutdown() {
    let h = TestHarness::builder()
        .with_business(BusinessConfig {
            product_keywords: vec!["rust".into()],
            industry_topics: vec!["observability".into()],
            ..BusinessConfig::default()
        })
        .dry_run(true)
        .build()
        .await
        .unwrap();

    let platform: Arc<dyn PlatformClient> = h.platform.clone();
    let generator: Arc<dyn ContentGenerator> = h.generator.clone();
    let automation = Automation::start(
        &h.config,
        h.db.clone(),
        platform,
        generator,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let mut receivers = automation.subscribe();
    let kinds: Vec<LoopKind> = receivers.iter().map(|rx| rx.borrow().kind).collect();
    assert_eq!(
        kinds,
        vec![
            LoopKind::Mentions,
            LoopKind::Discovery,
            LoopKind::Content,
            LoopKind::Thread,
            LoopKind::Cleanup,
        ]
    );
    for rx in &mut receivers {
        rx.wait_for(|s| s.ticks >= 1).await.unwrap();
    }

    let calls = h.platform.calls().await;
    assert!(calls.contains(&PlatformCall::Mentions(None)));
    assert!(calls.contains(&PlatformCall::Search("rust".into())));
    assert!(h.platform.writes().await.is_empty());

    automation.shutdown().await;
    for rx in &receivers {
        assert_eq!(rx.borrow().state, LoopState::Cancelled);
    }
}
