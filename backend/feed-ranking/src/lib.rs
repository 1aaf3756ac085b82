pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod utils;

pub use cache::ScoreCache;
pub use config::RankingConfig;
pub use error::{ConfigError, RankingError};
pub use models::{FeedSort, Post, RankedPage, RankedPost, ScoreBreakdown};
pub use services::{Paginator, RankingEngine, TrustTable};
