// "Why am I seeing this?" explanations built from a score breakdown.

use crate::models::ScoreBreakdown;
use serde::Serialize;
use std::fmt;

const HIGH_ENGAGEMENT: f64 = 0.7;
const MODERATE_ENGAGEMENT: f64 = 0.4;
const HIGH_QUALITY: f64 = 0.8;
const EXCELLENT_TRUST: f64 = 0.8;
const GOOD_TRUST: f64 = 0.6;
const TOP_CONTENT: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankingReason {
    PostedMinutesAgo { minutes: u64 },
    PostedHoursAgo { hours: u64 },
    PostedDaysAgo { days: u64 },
    HighEngagement { interactions: u64 },
    ModerateEngagement { interactions: u64 },
    HighQuality,
    ExcellentReputation,
    TrustedBrand,
    Overall { percent: u8, top_content: bool },
}

fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

impl fmt::Display for RankingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingReason::PostedMinutesAgo { minutes } => write!(
                f,
                "Posted {} minute{} ago (fresh content)",
                minutes,
                plural(*minutes)
            ),
            RankingReason::PostedHoursAgo { hours } => {
                write!(f, "Posted {} hour{} ago", hours, plural(*hours))
            }
            RankingReason::PostedDaysAgo { days } => {
                write!(f, "Posted {} day{} ago", days, plural(*days))
            }
            RankingReason::HighEngagement { interactions } => {
                write!(f, "High engagement ({} interactions)", interactions)
            }
            RankingReason::ModerateEngagement { interactions } => {
                write!(f, "Moderate engagement ({} interactions)", interactions)
            }
            RankingReason::HighQuality => f.write_str("Complete, well-presented listing"),
            RankingReason::ExcellentReputation => {
                f.write_str("Verified brand with excellent reputation")
            }
            RankingReason::TrustedBrand => f.write_str("Trusted brand"),
            RankingReason::Overall {
                percent,
                top_content: true,
            } => write!(f, "Overall score: {}% (top content)", percent),
            RankingReason::Overall { percent, .. } => write!(f, "Overall score: {}%", percent),
        }
    }
}

/// Reasons a post landed where it did, most specific first, overall last
pub fn explain(breakdown: &ScoreBreakdown) -> Vec<RankingReason> {
    let mut reasons = Vec::with_capacity(5);

    let total_minutes = (breakdown.age_hours.max(0.0) * 60.0).floor() as u64;
    let hours = total_minutes / 60;
    if hours < 1 {
        reasons.push(RankingReason::PostedMinutesAgo {
            minutes: total_minutes,
        });
    } else if hours < 24 {
        reasons.push(RankingReason::PostedHoursAgo { hours });
    } else {
        reasons.push(RankingReason::PostedDaysAgo { days: hours / 24 });
    }

    let interactions = breakdown.engagement_total;
    if breakdown.engagement > HIGH_ENGAGEMENT {
        reasons.push(RankingReason::HighEngagement { interactions });
    } else if breakdown.engagement > MODERATE_ENGAGEMENT {
        reasons.push(RankingReason::ModerateEngagement { interactions });
    }

    if breakdown.quality > HIGH_QUALITY {
        reasons.push(RankingReason::HighQuality);
    }

    if breakdown.trust > EXCELLENT_TRUST {
        reasons.push(RankingReason::ExcellentReputation);
    } else if breakdown.trust > GOOD_TRUST {
        reasons.push(RankingReason::TrustedBrand);
    }

    let composite = breakdown.composite.clamp(0.0, 1.0);
    reasons.push(RankingReason::Overall {
        percent: (composite * 100.0).round() as u8,
        top_content: composite > TOP_CONTENT,
    });

    reasons
}
