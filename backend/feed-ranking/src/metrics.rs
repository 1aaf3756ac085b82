//! Feed Ranking Metrics
//!
//! Prometheus metrics for ranking passes, pagination and caches

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};
use std::time::Duration;

static RANK_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_ranking_requests_total",
        "Total ranking passes by sort mode and mode of execution",
        &["sort", "mode"]
    )
    .expect("Failed to register feed ranking requests metric")
});

static RANK_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "feed_ranking_duration_seconds",
        "Duration of a ranking pass",
        &["mode"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("Failed to register feed ranking duration metric")
});

static POSTS_EXCLUDED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_ranking_posts_excluded_total",
        "Posts dropped from ranking by moderation flag",
        &["flag"]
    )
    .expect("Failed to register feed ranking excluded metric")
});

static CURSOR_REJECTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "feed_ranking_cursor_rejected_total",
        "Pagination cursors rejected and reset to page 1"
    )
    .expect("Failed to register feed ranking cursor metric")
});

static SCORE_CACHE_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_ranking_score_cache_total",
        "Score breakdown cache lookups",
        &["result"]
    )
    .expect("Failed to register feed ranking score cache metric")
});

static TRUST_CACHE_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_ranking_trust_cache_total",
        "Trust snapshot cache lookups",
        &["result"]
    )
    .expect("Failed to register feed ranking trust cache metric")
});

/// Record a completed ranking pass
pub fn record_rank(sort: &str, mode: &str, duration: Duration) {
    RANK_REQUESTS_TOTAL.with_label_values(&[sort, mode]).inc();
    RANK_DURATION_SECONDS
        .with_label_values(&[mode])
        .observe(duration.as_secs_f64());
}

pub fn record_excluded(flag: &str) {
    POSTS_EXCLUDED_TOTAL.with_label_values(&[flag]).inc();
}

pub fn record_cursor_rejected() {
    CURSOR_REJECTED_TOTAL.inc();
}

/// `result` is one of hit / miss
pub fn record_score_cache(result: &str) {
    SCORE_CACHE_TOTAL.with_label_values(&[result]).inc();
}

/// `result` is one of hit / refresh / error
pub fn record_trust_cache(result: &str) {
    TRUST_CACHE_TOTAL.with_label_values(&[result]).inc();
}
