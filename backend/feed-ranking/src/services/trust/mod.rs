//! Trust Weighter
//!
//! Maps a publisher to a trust multiplier in [0, 1] from a reputation table
//! supplied per ranking call. Unknown publishers get `NEUTRAL_TRUST`: new
//! sellers are neither suppressed to zero nor handed established trust.
//!
//! The ranker only ever reads the table.

pub mod provider;
pub mod reputation;

pub use provider::{TrustProvider, TrustSnapshotCache};
pub use reputation::{brand_trust_score, BrandReputation};

use crate::models::PublisherId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const NEUTRAL_TRUST: f64 = 0.5;

/// Snapshot of `publisher_id -> trust score`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustTable {
    scores: HashMap<PublisherId, f64>,
}

impl TrustTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from brand reputation metrics
    pub fn from_reputations<I>(reputations: I) -> Self
    where
        I: IntoIterator<Item = (PublisherId, BrandReputation)>,
    {
        reputations
            .into_iter()
            .map(|(id, rep)| (id, brand_trust_score(&rep)))
            .collect()
    }

    pub fn with_score(mut self, publisher: impl Into<String>, score: f64) -> Self {
        self.insert(PublisherId::new(publisher), score);
        self
    }

    /// Tables are built before a ranking pass; never mutated during one
    pub fn insert(&mut self, publisher: PublisherId, score: f64) {
        self.scores.insert(publisher, score);
    }

    pub fn get(&self, publisher: &PublisherId) -> Option<f64> {
        self.scores.get(publisher).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl FromIterator<(PublisherId, f64)> for TrustTable {
    fn from_iter<T: IntoIterator<Item = (PublisherId, f64)>>(iter: T) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

/// Trust multiplier for a publisher.
///
/// Absent or non-finite entries fall back to `NEUTRAL_TRUST`; out-of-range
/// entries are clamped.
pub fn trust_of(publisher: &PublisherId, table: &TrustTable) -> f64 {
    match table.get(publisher) {
        Some(score) if score.is_finite() => score.clamp(0.0, 1.0),
        _ => NEUTRAL_TRUST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_publisher_is_neutral() {
        let table = TrustTable::new().with_score("known", 0.9);
        assert_eq!(trust_of(&PublisherId::new("stranger"), &table), NEUTRAL_TRUST);
    }

    #[test]
    fn test_known_publisher() {
        let table = TrustTable::new().with_score("known", 0.9);
        assert_eq!(trust_of(&PublisherId::new("known"), &table), 0.9);
    }

    #[test]
    fn test_out_of_range_clamped() {
        let table = TrustTable::new()
            .with_score("inflated", 3.0)
            .with_score("negative", -1.0)
            .with_score("broken", f64::NAN);

        assert_eq!(trust_of(&PublisherId::new("inflated"), &table), 1.0);
        assert_eq!(trust_of(&PublisherId::new("negative"), &table), 0.0);
        assert_eq!(trust_of(&PublisherId::new("broken"), &table), NEUTRAL_TRUST);
    }

    #[test]
    fn test_table_deserializes_from_map() {
        let table: TrustTable = serde_json::from_str(r#"{"brand-a": 0.8, "brand-b": 0.2}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(trust_of(&PublisherId::new("brand-b"), &table), 0.2);
    }

    #[test]
    fn test_from_reputations() {
        let table = TrustTable::from_reputations(vec![(
            PublisherId::new("verified"),
            BrandReputation {
                verified: true,
                ..Default::default()
            },
        )]);
        assert!(trust_of(&PublisherId::new("verified"), &table) > 0.9);
    }
}
