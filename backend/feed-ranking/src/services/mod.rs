pub mod engagement;
pub mod pagination;
pub mod quality;
pub mod ranking;
pub mod recency;
pub mod trust;

pub use pagination::{CursorCodec, Paginator};
pub use ranking::RankingEngine;
pub use trust::{TrustProvider, TrustSnapshotCache, TrustTable};
