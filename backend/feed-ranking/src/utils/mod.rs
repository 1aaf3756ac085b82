// Utility functions for feed-ranking

use chrono::{DateTime, Utc};

/// Clamp a score to [0, 1]. NaN maps to `fallback`.
pub fn clamp_unit(score: f64, fallback: f64) -> f64 {
    if score.is_nan() {
        fallback
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Age in fractional hours. Future timestamps (clock skew) count as age zero.
pub fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_ms = (now - created_at).num_milliseconds().max(0);
    age_ms as f64 / 3_600_000.0
}

/// Half-life decay: 1.0 at age 0, 0.5 at one half-life
pub fn half_life_decay(age: f64, half_life: f64) -> f64 {
    0.5_f64.powf(age.max(0.0) / half_life)
}
