/// Composite Ranking Module
///
/// Combines quality, engagement, freshness and trust into one composite score
/// and produces a stable total order.
///
/// # Workflow
/// 1. Drop posts carrying an excluded moderation flag (`suspended` always)
/// 2. Score the four components independently (parallelizable)
/// 3. Composite = w_q*quality + w_e*engagement + w_f*freshness + w_t*trust
/// 4. Sort descending, tie-break on engagement total, recency, then id
pub mod engine;
pub mod explain;
pub mod ordering;

pub use engine::{compute_score, rank, score_post, sort_value, RankingEngine};
pub use explain::{explain, RankingReason};
pub use ordering::{compare_ranked, SortKey};
