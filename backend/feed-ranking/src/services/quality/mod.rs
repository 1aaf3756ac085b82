//! Quality Estimator
//!
//! Derives a 0-1 content-quality score from the structural signals of a
//! single post. Every signal is a named constant so the formula can be
//! audited signal by signal.
//!
//! Absence of information is neutral: a post with no signals at all scores
//! exactly `BASELINE`.

use crate::models::{ModerationFlag, Post, PostContent, RatingSummary};
use crate::utils::clamp_unit;

pub const BASELINE: f64 = 0.5;

// Positive completeness signals
pub const TITLE_BONUS: f64 = 0.10;
pub const MEDIA_BONUS: f64 = 0.10;
pub const DESCRIPTION_BAND_BONUS: f64 = 0.10;
pub const PRICE_BONUS: f64 = 0.05;
pub const AVAILABILITY_BONUS: f64 = 0.05;

// Negative signals
pub const LOW_QUALITY_PENALTY: f64 = 0.20;
pub const PLACEHOLDER_DESCRIPTION_PENALTY: f64 = 0.10;
pub const BROKEN_MEDIA_PENALTY: f64 = 0.10;

/// Max swing from the review signal, at full confidence
pub const REVIEW_WEIGHT: f64 = 0.20;
/// Review count at which confidence reaches ~63%
pub const REVIEW_CONFIDENCE_SCALE: f64 = 50.0;

// Blend of the review signal; sums to 1
const STAR_SHARE: f64 = 0.60;
const VERIFIED_SHARE: f64 = 0.25;
const RETURN_SHARE: f64 = 0.15;

pub const DEFAULT_VERIFIED_PURCHASE_RATIO: f64 = 0.5;
pub const DEFAULT_RETURN_RATE: f64 = 0.05;

/// Ideal description length, in characters
pub const DESCRIPTION_MIN_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

const PLACEHOLDER_DESCRIPTIONS: &[&str] = &[
    "n/a",
    "na",
    "tbd",
    "todo",
    "-",
    "lorem ipsum",
    "placeholder",
    "description",
    "coming soon",
];

/// Estimate content quality in [0, 1]
pub fn estimate_quality(post: &Post) -> f64 {
    let content = &post.content;
    let mut score = BASELINE;

    if has_title(content) {
        score += TITLE_BONUS;
    }
    if content.media.iter().any(|m| !m.broken && !m.url.trim().is_empty()) {
        score += MEDIA_BONUS;
    }
    if description_in_band(content) {
        score += DESCRIPTION_BAND_BONUS;
    }
    if content.has_price {
        score += PRICE_BONUS;
    }
    if content.has_availability {
        score += AVAILABILITY_BONUS;
    }

    if post.has_flag(ModerationFlag::LowQuality) {
        score -= LOW_QUALITY_PENALTY;
    }
    if has_placeholder_description(content) {
        score -= PLACEHOLDER_DESCRIPTION_PENALTY;
    }
    if content.media.iter().any(|m| m.broken) {
        score -= BROKEN_MEDIA_PENALTY;
    }

    if let Some(rating) = &content.rating {
        score += review_adjustment(rating);
    }

    clamp_unit(score, BASELINE)
}

fn has_title(content: &PostContent) -> bool {
    content
        .title
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty())
}

fn description_in_band(content: &PostContent) -> bool {
    content.description.as_deref().is_some_and(|d| {
        let len = d.trim().chars().count();
        (DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&len)
    })
}

fn has_placeholder_description(content: &PostContent) -> bool {
    content.description.as_deref().is_some_and(|d| {
        let normalized = d.trim().to_lowercase();
        normalized.is_empty() || PLACEHOLDER_DESCRIPTIONS.contains(&normalized.as_str())
    })
}

/// Review nudge, blended toward neutral by review-count confidence.
///
/// Stars, verified-purchase ratio (scored 0.5-1.0) and return rate (scored
/// 1.0 down to 0.5) are blended first. Zero reviews contribute nothing.
fn review_adjustment(rating: &RatingSummary) -> f64 {
    if rating.count == 0 || !rating.average.is_finite() {
        return 0.0;
    }
    let stars = rating.average.clamp(0.0, 5.0) / 5.0;
    let verified = 0.5 + unit_or(rating.verified_purchase_ratio, DEFAULT_VERIFIED_PURCHASE_RATIO) * 0.5;
    let returns = 1.0 - unit_or(rating.return_rate, DEFAULT_RETURN_RATE) * 0.5;

    let blended = stars * STAR_SHARE + verified * VERIFIED_SHARE + returns * RETURN_SHARE;
    let confidence = 1.0 - (-(rating.count as f64) / REVIEW_CONFIDENCE_SCALE).exp();
    (blended - 0.5) * confidence * REVIEW_WEIGHT
}

fn unit_or(value: Option<f64>, fallback: f64) -> f64 {
    value
        .filter(|v| v.is_finite())
        .map_or(fallback, |v| v.clamp(0.0, 1.0))
}
