//! In-process TTL cache for score breakdowns
//!
//! Keyed by `(post id, snapshot version, weights version)`. Entries are
//! invalidated by TTL expiry or by a weights-version bump, never patched in
//! place. Caching is an optimization only: a cached breakdown carries the
//! freshness computed when it was stored, so staleness is bounded by the TTL.

use crate::metrics;
use crate::models::{PostId, ScoreBreakdown};
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoreCacheKey {
    pub post_id: PostId,
    pub snapshot_version: u64,
    pub weights_version: u64,
}

#[derive(Debug, Clone, Copy)]
struct CachedEntry {
    breakdown: ScoreBreakdown,
    expires_at: Instant,
}

impl CachedEntry {
    #[inline]
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

pub struct ScoreCache {
    store: DashMap<ScoreCacheKey, CachedEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl ScoreCache {
    /// 30s TTL, 50k entries
    pub fn new() -> Self {
        Self::with_limits(Duration::from_secs(30), 50_000)
    }

    pub fn with_limits(ttl: Duration, max_entries: usize) -> Self {
        Self {
            store: DashMap::new(),
            ttl,
            max_entries,
        }
    }

    pub fn get(&self, key: &ScoreCacheKey) -> Option<ScoreBreakdown> {
        let hit = self
            .store
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.breakdown);

        match hit {
            Some(breakdown) => {
                metrics::record_score_cache("hit");
                Some(breakdown)
            }
            None => {
                self.store.remove_if(key, |_, entry| entry.is_expired());
                metrics::record_score_cache("miss");
                None
            }
        }
    }

    pub fn insert(&self, key: ScoreCacheKey, breakdown: ScoreBreakdown) {
        if self.ttl.is_zero() {
            return;
        }
        if self.store.len() >= self.max_entries {
            self.purge_expired();
            if self.store.len() >= self.max_entries {
                // Still full of live entries; skip rather than evict arbitrarily
                return;
            }
        }
        self.store.insert(
            key,
            CachedEntry {
                breakdown,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop every entry computed under an older weights version
    pub fn invalidate_before(&self, weights_version: u64) {
        let before = self.store.len();
        self.store
            .retain(|key, _| key.weights_version >= weights_version);
        debug!(
            weights_version,
            removed = before.saturating_sub(self.store.len()),
            "Score cache invalidated"
        );
    }

    pub fn purge_expired(&self) {
        self.store.retain(|_, entry| !entry.is_expired());
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new()
    }
}
