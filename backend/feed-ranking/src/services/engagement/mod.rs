//! Engagement Normalizer
//!
//! Raw counts are unbounded and heavy-tailed, so a linear scale would let a
//! viral post dominate the composite. Scores use a saturating transform
//! instead:
//!
//! ```text
//! weighted = views*w_v + likes*w_l + comments*w_c + shares*w_sh + saves*w_sv
//! score    = weighted / (weighted + k)
//! ```
//!
//! 0 for no engagement, 0.5 at `k` ("typical" engagement for the category),
//! approaching 1 asymptotically. No global maximum is needed, so unseen
//! outliers never force a renormalization pass.

pub mod velocity;

pub use velocity::{rising_score, RISING_WINDOW_MINUTES};

use crate::config::{EngagementConfig, EngagementWeights};
use crate::models::{EngagementCounters, Post};

/// Weighted sum of the counters. Negative counters count as zero.
pub fn weighted_engagement(counters: &EngagementCounters, weights: &EngagementWeights) -> f64 {
    let clamp = |c: i64| c.max(0) as f64;

    clamp(counters.views) * weights.views
        + clamp(counters.likes) * weights.likes
        + clamp(counters.comments) * weights.comments
        + clamp(counters.shares) * weights.shares
        + clamp(counters.saves) * weights.saves
}

/// Normalize engagement counters into [0, 1) with calibration constant `k`
pub fn normalize_engagement(
    counters: &EngagementCounters,
    weights: &EngagementWeights,
    k: f64,
) -> f64 {
    let weighted = weighted_engagement(counters, weights);
    if weighted <= 0.0 || !weighted.is_finite() {
        // Overflowing to infinity only happens with absurd counters; treat as saturated
        return if weighted.is_infinite() { 1.0 } else { 0.0 };
    }
    (weighted / (weighted + k)).clamp(0.0, 1.0)
}

/// Engagement score for a post, calibrated by its primary category
pub fn engagement_score(post: &Post, config: &EngagementConfig) -> f64 {
    let k = config.calibration_for(post.content.primary_category());
    normalize_engagement(&post.engagement, &config.weights, k)
}
