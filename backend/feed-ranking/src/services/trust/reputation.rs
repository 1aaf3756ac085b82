use serde::{Deserialize, Serialize};

/// Brand reputation metrics, as kept by the seller directory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandReputation {
    pub verified: bool,
    /// 0-1, lower is better
    pub dispute_rate: f64,
    /// 0-1, higher is better
    pub fulfillment_rate: f64,
    pub response_time_hours: f64,
    pub account_age_days: f64,
}

impl Default for BrandReputation {
    fn default() -> Self {
        Self {
            verified: false,
            dispute_rate: 0.02,
            fulfillment_rate: 0.98,
            response_time_hours: 24.0,
            account_age_days: 30.0,
        }
    }
}

const VERIFIED_BONUS: f64 = 0.2;

/// Derive a trust score in [0, 1] from brand metrics.
///
/// Disputes (2% = 0.96, 10% = 0.8), fulfillment, response time
/// (24h = 0.6, 1h = 0.98) and account age (new accounts slightly penalized)
/// are blended, then verified brands get a flat bonus.
pub fn brand_trust_score(rep: &BrandReputation) -> f64 {
    let dispute_score = (1.0 - finite_or(rep.dispute_rate, 0.02).clamp(0.0, 1.0) * 2.0).max(0.0);
    let fulfillment_score = finite_or(rep.fulfillment_rate, 0.98).clamp(0.0, 1.0);
    let response_score = (-finite_or(rep.response_time_hours, 24.0).max(0.0) / 48.0).exp();
    let age_factor = 1.0 - (-finite_or(rep.account_age_days, 30.0).max(0.0) / 60.0).exp() * 0.2;

    let base = dispute_score * 0.3 + fulfillment_score * 0.3 + response_score * 0.2 + age_factor * 0.2;
    let bonus = if rep.verified { VERIFIED_BONUS } else { 0.0 };

    (base + bonus).clamp(0.0, 1.0)
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
