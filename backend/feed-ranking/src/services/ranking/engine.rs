use super::ordering::compare_ranked;
use crate::cache::{ScoreCache, ScoreCacheKey};
use crate::config::{RankingConfig, RankingWeights};
use crate::error::{ConfigError, RankingError, Result};
use crate::metrics;
use crate::models::{FeedSort, Post, RankedPost, ScoreBreakdown};
use crate::services::engagement::{engagement_score, rising_score};
use crate::services::quality::estimate_quality;
use crate::services::recency::freshness;
use crate::services::trust::{trust_of, TrustTable};
use crate::utils::{age_hours, clamp_unit};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Compute every component score for one post.
///
/// Pure function of the post, trust snapshot, clock and config.
pub fn score_post(
    post: &Post,
    trust: &TrustTable,
    now: DateTime<Utc>,
    config: &RankingConfig,
) -> ScoreBreakdown {
    let quality = estimate_quality(post);
    let engagement = engagement_score(post, &config.engagement);
    let freshness = freshness(post.created_at, now, config.half_life_hours);
    let trust = trust_of(&post.publisher_id, trust);

    ScoreBreakdown {
        quality,
        engagement,
        freshness,
        trust,
        composite: compute_score(&config.weights, quality, engagement, freshness, trust),
        engagement_total: post.engagement.total(),
        age_hours: age_hours(post.created_at, now),
    }
}

/// Weighted sum of the component scores, kept in [0, 1]
pub fn compute_score(
    weights: &RankingWeights,
    quality: f64,
    engagement: f64,
    freshness: f64,
    trust: f64,
) -> f64 {
    let composite = weights.quality * quality
        + weights.engagement * engagement
        + weights.freshness * freshness
        + weights.trust * trust;

    // Weights sum to 1 within tolerance; absorb the rounding
    clamp_unit(composite, 0.0)
}

/// Primary sort value for a feed mode
pub fn sort_value(post: &Post, breakdown: &ScoreBreakdown, sort: FeedSort) -> f64 {
    match sort {
        FeedSort::Top => breakdown.composite,
        FeedSort::New => post.created_at.timestamp_millis() as f64,
        FeedSort::Rising => rising_score(
            &post.velocity.unwrap_or_default(),
            breakdown.age_hours * 60.0,
        ),
    }
}

/// Rank a candidate set by composite score with the default sort.
///
/// Rejects an invalid configuration instead of producing an undefined
/// ordering. An empty candidate set yields an empty sequence.
pub fn rank(
    posts: Vec<Post>,
    trust: &TrustTable,
    now: DateTime<Utc>,
    config: &RankingConfig,
) -> std::result::Result<Vec<RankedPost>, ConfigError> {
    config.validate()?;
    let candidates = filter_excluded(posts, config);
    let mut ranked = score_batch(candidates, trust, now, config, FeedSort::Top, None);
    ranked.sort_by(compare_ranked);
    Ok(ranked)
}

/// Drop posts carrying an excluded moderation flag
fn filter_excluded(posts: Vec<Post>, config: &RankingConfig) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|post| {
            match post
                .moderation_flags
                .iter()
                .find(|flag| config.is_excluded(**flag))
            {
                Some(flag) => {
                    metrics::record_excluded(flag.as_str());
                    debug!(post_id = %post.id, flag = flag.as_str(), "Post excluded from ranking");
                    false
                }
                None => true,
            }
        })
        .collect()
}

fn score_batch(
    posts: Vec<Post>,
    trust: &TrustTable,
    now: DateTime<Utc>,
    config: &RankingConfig,
    sort: FeedSort,
    cache: Option<&ScoreCache>,
) -> Vec<RankedPost> {
    posts
        .into_iter()
        .map(|post| {
            let breakdown = match cache {
                Some(cache) => {
                    let key = ScoreCacheKey {
                        post_id: post.id.clone(),
                        snapshot_version: post.version,
                        weights_version: config.weights_version,
                    };
                    cache.get(&key).unwrap_or_else(|| {
                        let breakdown = score_post(&post, trust, now, config);
                        cache.insert(key, breakdown);
                        breakdown
                    })
                }
                None => score_post(&post, trust, now, config),
            };
            let sort_value = sort_value(&post, &breakdown, sort);

            RankedPost {
                post,
                breakdown,
                sort_value,
            }
        })
        .collect()
}

/// Composite ranker.
///
/// Stateless apart from the optional score cache: holds a validated config
/// and ranks whatever candidate set and trust snapshot it is handed.
#[derive(Clone)]
pub struct RankingEngine {
    config: Arc<RankingConfig>,
    cache: Option<Arc<ScoreCache>>,
}

impl RankingEngine {
    /// Validates the configuration; an invalid one never produces an engine
    pub fn new(config: RankingConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            cache: None,
        })
    }

    /// Reuse breakdowns across requests for up to the cache TTL
    pub fn with_score_cache(mut self, cache: Arc<ScoreCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Filter, score and order candidates on the calling thread
    pub fn rank(
        &self,
        posts: Vec<Post>,
        trust: &TrustTable,
        now: DateTime<Utc>,
        sort: FeedSort,
    ) -> Vec<RankedPost> {
        let started = Instant::now();
        let input_count = posts.len();

        let candidates = filter_excluded(posts, &self.config);
        let mut ranked = score_batch(
            candidates,
            trust,
            now,
            &self.config,
            sort,
            self.cache.as_deref(),
        );
        ranked.sort_by(compare_ranked);

        self.log_completion(sort, "serial", input_count, &ranked, started);
        ranked
    }

    /// Score on the blocking pool with bounded fan-out.
    ///
    /// Workers share only read-only inputs; no locks are taken while scoring.
    /// Dropping the returned future abandons the in-flight chunks of this call
    /// without touching other calls.
    pub async fn rank_parallel(
        &self,
        posts: Vec<Post>,
        trust: Arc<TrustTable>,
        now: DateTime<Utc>,
        sort: FeedSort,
    ) -> Result<Vec<RankedPost>> {
        let started = Instant::now();
        let input_count = posts.len();

        let candidates = filter_excluded(posts, &self.config);
        if candidates.is_empty() {
            self.log_completion(sort, "parallel", input_count, &[], started);
            return Ok(Vec::new());
        }

        let workers = self.config.worker_count().clamp(1, candidates.len());
        let chunk_size = candidates.len().div_ceil(workers);

        let mut chunks: Vec<Vec<Post>> = Vec::with_capacity(workers);
        let mut remaining = candidates.into_iter().peekable();
        while remaining.peek().is_some() {
            chunks.push(remaining.by_ref().take(chunk_size).collect());
        }

        debug!(
            candidate_count = input_count,
            workers = chunks.len(),
            chunk_size,
            "Dispatching scoring chunks"
        );

        let handles = chunks.into_iter().map(|chunk| {
            let config = Arc::clone(&self.config);
            let trust = Arc::clone(&trust);
            let cache = self.cache.clone();
            tokio::task::spawn_blocking(move || {
                score_batch(chunk, &trust, now, &config, sort, cache.as_deref())
            })
        });

        let scored = try_join_all(handles)
            .await
            .map_err(|e| RankingError::Worker(e.to_string()))?;

        let mut ranked: Vec<RankedPost> = scored.into_iter().flatten().collect();
        ranked.sort_by(compare_ranked);

        self.log_completion(sort, "parallel", input_count, &ranked, started);
        Ok(ranked)
    }

    /// `rank_parallel` bounded by a deadline
    pub async fn rank_with_timeout(
        &self,
        posts: Vec<Post>,
        trust: Arc<TrustTable>,
        now: DateTime<Utc>,
        sort: FeedSort,
        timeout: Duration,
    ) -> Result<Vec<RankedPost>> {
        tokio::time::timeout(timeout, self.rank_parallel(posts, trust, now, sort))
            .await
            .map_err(|_| RankingError::Timeout(timeout))?
    }

    fn log_completion(
        &self,
        sort: FeedSort,
        mode: &str,
        input_count: usize,
        ranked: &[RankedPost],
        started: Instant,
    ) {
        metrics::record_rank(sort.as_str(), mode, started.elapsed());
        info!(
            sort = sort.as_str(),
            mode,
            input_count,
            output_count = ranked.len(),
            top_score = ranked.first().map(|r| r.sort_value),
            weights_version = self.config.weights_version,
            "Ranking completed"
        );
    }
}
