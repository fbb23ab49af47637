// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Individual scoring signals.
//!
//! Every function returns a value in `[0, max]` and never panics, whatever
//! the input.

use chrono::{DateTime, Utc};
use murmur_core::types::EngagementMetrics;
use tracing::warn;

/// Followers at which the reach signal saturates (`log10` of this is the divisor).
const FOLLOWER_LOG_CEILING: f32 = 5.0;

/// Engagement rate (interactions / followers) that earns the full signal.
const ENGAGEMENT_RATE_CEILING: f32 = 0.05;

/// `(age in minutes, fraction of max)` anchors, linearly interpolated.
/// Anything older than the last anchor scores zero.
const RECENCY_CURVE: &[(f32, f32)] = &[
    (0.0, 1.0),
    (5.0, 1.0),
    (30.0, 0.8),
    (60.0, 0.5),
    (360.0, 0.25),
];

fn keyword_weight(keyword: &str) -> f32 {
    if keyword.split_whitespace().count() > 1 {
        2.0
    } else {
        1.0
    }
}

fn usable(keywords: &[String]) -> impl Iterator<Item = &str> {
    keywords.iter().map(|k| k.trim()).filter(|k| !k.is_empty())
}

/// Keywords found in `text` (case-insensitive substring match).
pub fn matched_keywords<'a>(text: &str, keywords: &'a [String]) -> Vec<&'a str> {
    let haystack = text.to_lowercase();
    usable(keywords)
        .filter(|k| haystack.contains(&k.to_lowercase()))
        .collect()
}

/// Weighted share of keywords present in `text`, scaled to `max`.
///
/// Multi-word keywords weigh twice as much as single words.
pub fn keyword_relevance(text: &str, keywords: &[String], max: f32) -> f32 {
    let total: f32 = usable(keywords).map(keyword_weight).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let matched: f32 = matched_keywords(text, keywords)
        .into_iter()
        .map(keyword_weight)
        .sum();
    clamp(matched / total * max, max)
}

/// Log-scaled author reach: 1 follower scores 0, 100k followers score `max`.
pub fn follower_score(followers: u64, max: f32) -> f32 {
    let followers = followers.max(1) as f64;
    let scaled = (followers.log10() as f32 / FOLLOWER_LOG_CEILING) * max;
    clamp(scaled, max)
}

/// Freshness by age in minutes. Negative ages count as zero.
pub fn recency_score(age_minutes: f32, max: f32) -> f32 {
    if age_minutes.is_nan() {
        return 0.0;
    }
    let age = age_minutes.max(0.0);

    for pair in RECENCY_CURVE.windows(2) {
        let (a0, f0) = pair[0];
        let (a1, f1) = pair[1];
        if age <= a1 {
            let t = (age - a0) / (a1 - a0);
            return clamp((f0 + (f1 - f0) * t) * max, max);
        }
    }
    0.0
}

/// Freshness of a tweet created at `created_at` (RFC 3339) as seen at `now`.
///
/// An unparseable timestamp scores zero and logs a warning.
pub fn recency_score_at(created_at: &str, now: DateTime<Utc>, max: f32) -> f32 {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(ts) => {
            let age = now.signed_duration_since(ts.with_timezone(&Utc));
            recency_score(age.num_seconds() as f32 / 60.0, max)
        }
        Err(e) => {
            warn!(created_at, error = %e, "unparseable tweet timestamp, recency scored 0");
            0.0
        }
    }
}

/// Interactions relative to audience, saturating at a 5% rate.
pub fn engagement_score(metrics: &EngagementMetrics, followers: u64, max: f32) -> f32 {
    let rate = metrics.total() as f64 / followers.max(1) as f64;
    let fraction = (rate as f32 / ENGAGEMENT_RATE_CEILING).min(1.0);
    clamp(fraction * max, max)
}

fn clamp(value: f32, max: f32) -> f32 {
    let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}
