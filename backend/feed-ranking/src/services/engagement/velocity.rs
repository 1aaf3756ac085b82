// Rising score: posts gaining traction in the last 15 minutes.
//
// Only posts between 15 minutes and 24 hours old are eligible. Velocity is
// log-normalized (1000 raw ~ 0.6, 100000 raw = 1.0) and weighted by an age
// curve that peaks two hours after posting.

use crate::models::VelocityCounters;

pub const RISING_WINDOW_MINUTES: f64 = 15.0;
pub const RISING_MAX_AGE_MINUTES: f64 = 24.0 * 60.0;

const VIEW_WEIGHT: f64 = 1.0;
const LIKE_WEIGHT: f64 = 5.0;
const SHARE_WEIGHT: f64 = 20.0;

/// Raw velocity at which the normalized score saturates
const SATURATION: f64 = 100_000.0;
const PEAK_AGE_HOURS: f64 = 2.0;
const AGE_FALLOFF_HOURS: f64 = 6.0;

pub fn rising_score(velocity: &VelocityCounters, age_minutes: f64) -> f64 {
    if !(RISING_WINDOW_MINUTES..=RISING_MAX_AGE_MINUTES).contains(&age_minutes) {
        return 0.0;
    }

    let raw = velocity.views.max(0) as f64 * VIEW_WEIGHT
        + velocity.likes.max(0) as f64 * LIKE_WEIGHT
        + velocity.shares.max(0) as f64 * SHARE_WEIGHT;
    let normalized = ((raw + 1.0).log10() / SATURATION.log10()).min(1.0);

    let hours_from_peak = (age_minutes / 60.0 - PEAK_AGE_HOURS).abs();
    let age_multiplier = (-hours_from_peak / AGE_FALLOFF_HOURS).exp();

    (normalized * age_multiplier).clamp(0.0, 1.0)
}
