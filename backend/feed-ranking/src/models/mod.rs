use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque post identifier. Ordered lexicographically for the final tie-break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Brand / seller identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublisherId(pub String);

impl PublisherId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublisherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationFlag {
    Reported,
    LowQuality,
    Suspended,
}

impl ModerationFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationFlag::Reported => "reported",
            ModerationFlag::LowQuality => "low_quality",
            ModerationFlag::Suspended => "suspended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    /// Set by ingestion when the asset failed to resolve
    #[serde(default)]
    pub broken: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// 0-5 star average
    pub average: f64,
    pub count: u32,
    /// Share of reviews from verified purchases, 0-1. Unknown counts as 0.5.
    #[serde(default)]
    pub verified_purchase_ratio: Option<f64>,
    /// Share of orders returned, 0-1. Unknown counts as 0.05.
    #[serde(default)]
    pub return_rate: Option<f64>,
}

impl RatingSummary {
    pub fn new(average: f64, count: u32) -> Self {
        Self {
            average,
            count,
            verified_purchase_ratio: None,
            return_rate: None,
        }
    }
}

/// Structural descriptor of a post, scored by the quality estimator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostContent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub media: Vec<MediaRef>,
    /// Category tags; the first one is the primary category
    pub categories: Vec<String>,
    pub has_price: bool,
    pub has_availability: bool,
    pub rating: Option<RatingSummary>,
}

impl PostContent {
    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(|c| c.as_str())
    }
}

/// Point-in-time copy of the engagement tracker's counters.
///
/// Signed so that a misbehaving upstream cannot make deserialization fail;
/// negative values are clamped to zero wherever they are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementCounters {
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub saves: i64,
}

impl EngagementCounters {
    /// Unweighted sum of all counters, negatives clamped to zero
    pub fn total(&self) -> u64 {
        [self.views, self.likes, self.comments, self.shares, self.saves]
            .iter()
            .map(|&c| c.max(0) as u64)
            .fold(0u64, u64::saturating_add)
    }
}

/// Activity in the trailing 15-minute window, used by the rising sort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityCounters {
    pub views: i64,
    pub likes: i64,
    pub shares: i64,
}

/// Immutable post snapshot. Edits produce a new snapshot with a higher `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub publisher_id: PublisherId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub content: PostContent,
    #[serde(default)]
    pub engagement: EngagementCounters,
    #[serde(default)]
    pub velocity: Option<VelocityCounters>,
    #[serde(default)]
    pub moderation_flags: BTreeSet<ModerationFlag>,
}

impl Post {
    pub fn has_flag(&self, flag: ModerationFlag) -> bool {
        self.moderation_flags.contains(&flag)
    }
}

/// Feed ordering modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSort {
    /// Composite score
    #[default]
    Top,
    /// Most recent first
    New,
    /// Velocity over the last 15 minutes
    Rising,
}

impl FeedSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedSort::Top => "top",
            FeedSort::New => "new",
            FeedSort::Rising => "rising",
        }
    }
}

/// Per-signal scores behind a composite. Recomputed on every ranking request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub quality: f64,
    pub engagement: f64,
    pub freshness: f64,
    pub trust: f64,
    pub composite: f64,
    /// Raw unweighted engagement count, first tie-breaker
    pub engagement_total: u64,
    pub age_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPost {
    pub post: Post,
    pub breakdown: ScoreBreakdown,
    /// Primary sort value for the active `FeedSort`
    pub sort_value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankedPage {
    pub items: Vec<RankedPost>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl RankedPage {
    pub fn empty() -> Self {
        Self::default()
    }
}
