use crate::models::{PostId, RankedPost};
use std::cmp::Ordering;

/// Resume position in a ranked sequence.
///
/// `(sort value desc, engagement total desc, created_at desc, id asc)` is a
/// total order, so equal composites still land in a reproducible order.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub value: f64,
    pub engagement_total: u64,
    pub created_at_ms: i64,
    pub id: PostId,
}

impl SortKey {
    pub fn of(ranked: &RankedPost) -> Self {
        Self {
            value: ranked.sort_value,
            engagement_total: ranked.breakdown.engagement_total,
            created_at_ms: ranked.post.created_at.timestamp_millis(),
            id: ranked.post.id.clone(),
        }
    }

    /// True when `ranked` sorts strictly after this key
    pub fn precedes(&self, ranked: &RankedPost) -> bool {
        compare_parts(KeyParts::from(self), KeyParts::from(ranked)) == Ordering::Less
    }
}

#[derive(Clone, Copy)]
struct KeyParts<'a> {
    value: f64,
    engagement_total: u64,
    created_at_ms: i64,
    id: &'a str,
}

impl<'a> From<&'a SortKey> for KeyParts<'a> {
    fn from(key: &'a SortKey) -> Self {
        Self {
            value: key.value,
            engagement_total: key.engagement_total,
            created_at_ms: key.created_at_ms,
            id: key.id.as_str(),
        }
    }
}

impl<'a> From<&'a RankedPost> for KeyParts<'a> {
    fn from(ranked: &'a RankedPost) -> Self {
        Self {
            value: ranked.sort_value,
            engagement_total: ranked.breakdown.engagement_total,
            created_at_ms: ranked.post.created_at.timestamp_millis(),
            id: ranked.post.id.as_str(),
        }
    }
}

/// -0.0 and 0.0 must compare equal under `total_cmp`
fn canonical(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

fn compare_parts(a: KeyParts<'_>, b: KeyParts<'_>) -> Ordering {
    canonical(b.value)
        .total_cmp(&canonical(a.value))
        .then_with(|| b.engagement_total.cmp(&a.engagement_total))
        .then_with(|| b.created_at_ms.cmp(&a.created_at_ms))
        .then_with(|| a.id.cmp(b.id))
}

/// Ranking order: `Less` means `a` is shown before `b`
pub fn compare_ranked(a: &RankedPost, b: &RankedPost) -> Ordering {
    compare_parts(KeyParts::from(a), KeyParts::from(b))
}
