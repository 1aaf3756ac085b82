use super::TrustTable;
use crate::metrics;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// External source of publisher trust (seller directory, reputation service).
///
/// Fetching is the caller's I/O, bounded and cancellable on their side; the
/// ranker only ever sees the materialized table.
#[async_trait]
pub trait TrustProvider: Send + Sync {
    async fn load_trust_table(&self) -> Result<TrustTable>;
}

/// Upper bound on a single provider reload
pub const DEFAULT_RELOAD_TIMEOUT: Duration = Duration::from_secs(5);

struct Snapshot {
    table: Arc<TrustTable>,
    loaded_at: Instant,
}

/// Short-TTL snapshot of the trust table.
///
/// Snapshots are replaced wholesale, never patched in place, so a ranking
/// pass holding an `Arc<TrustTable>` is unaffected by a concurrent refresh.
/// One caller reloads at a time; the provider is awaited without holding the
/// snapshot lock, so everyone else keeps reading the stale snapshot meanwhile.
pub struct TrustSnapshotCache<P> {
    provider: P,
    ttl: Duration,
    reload_timeout: Duration,
    current: RwLock<Option<Snapshot>>,
    refresh: Mutex<()>,
}

impl<P: TrustProvider> TrustSnapshotCache<P> {
    pub fn new(provider: P, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            reload_timeout: DEFAULT_RELOAD_TIMEOUT,
            current: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub fn with_reload_timeout(mut self, reload_timeout: Duration) -> Self {
        self.reload_timeout = reload_timeout;
        self
    }

    /// Cached table and whether it is still within the TTL
    async fn cached(&self) -> Option<(Arc<TrustTable>, bool)> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|s| (Arc::clone(&s.table), s.loaded_at.elapsed() < self.ttl))
    }

    /// Current snapshot, reloading if older than the TTL.
    ///
    /// While another caller is reloading, a stale snapshot is served as is.
    /// A failed or timed-out reload keeps serving the previous snapshot; with
    /// no previous snapshot every publisher falls back to neutral trust.
    pub async fn snapshot(&self) -> Arc<TrustTable> {
        let stale = match self.cached().await {
            Some((table, true)) => {
                metrics::record_trust_cache("hit");
                return table;
            }
            Some((table, false)) => Some(table),
            None => None,
        };

        let _refresh = match self.refresh.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                if let Some(table) = stale {
                    metrics::record_trust_cache("stale");
                    debug!("Trust reload in flight, serving stale snapshot");
                    return table;
                }
                // Nothing to serve yet; wait for the in-flight reload
                self.refresh.lock().await
            }
        };

        // Another task may have refreshed while we waited
        let stale = match self.cached().await {
            Some((table, true)) => {
                metrics::record_trust_cache("hit");
                return table;
            }
            Some((table, false)) => Some(table),
            None => None,
        };

        let loaded = tokio::time::timeout(self.reload_timeout, self.provider.load_trust_table())
            .await
            .map_err(|_| anyhow!("reload timed out after {:?}", self.reload_timeout))
            .and_then(|result| result);

        match loaded {
            Ok(table) => {
                metrics::record_trust_cache("refresh");
                debug!(publishers = table.len(), "Trust table refreshed");
                let table = Arc::new(table);
                *self.current.write().await = Some(Snapshot {
                    table: Arc::clone(&table),
                    loaded_at: Instant::now(),
                });
                table
            }
            Err(e) => {
                metrics::record_trust_cache("error");
                match stale {
                    Some(table) => {
                        warn!(error = %e, "Trust table reload failed, serving stale snapshot");
                        table
                    }
                    None => {
                        warn!(error = %e, "Trust table unavailable, using neutral trust");
                        Arc::new(TrustTable::new())
                    }
                }
            }
        }
    }

    /// Drop the snapshot so the next call reloads
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }
}
