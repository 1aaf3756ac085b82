//! Recency Decay
//!
//! `multiplier = 0.5 ^ (age_hours / half_life_hours)`
//!
//! Fresh content (0h) = 1.0, one half-life = 0.5, two = 0.25. Strictly
//! positive: an old post can still surface on quality, engagement and trust.

use crate::utils::{age_hours, half_life_decay};
use chrono::{DateTime, Utc};

/// Freshness multiplier in (0, 1].
///
/// `now` is always injected. Future-dated posts (clock skew) are treated as
/// age zero, never above 1. `half_life_hours` is validated positive at config
/// load.
pub fn freshness(created_at: DateTime<Utc>, now: DateTime<Utc>, half_life_hours: f64) -> f64 {
    let age = age_hours(created_at, now);
    half_life_decay(age, half_life_hours).clamp(f64::MIN_POSITIVE, 1.0)
}
