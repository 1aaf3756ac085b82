use anyhow::Context;
use chrono::{DateTime, Utc};
use feed_ranking::config::Config;
use feed_ranking::services::ranking::explain;
use feed_ranking::{FeedSort, Paginator, Post, RankedPage, RankingEngine, TrustTable};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Instrument};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

const RANK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct RankRequest {
    posts: Vec<Post>,
    #[serde(default)]
    trust: TrustTable,
    /// Defaults to the wall clock at request time
    now: Option<DateTime<Utc>>,
    #[serde(default)]
    sort: FeedSort,
    cursor: Option<String>,
    #[serde(default)]
    explain: bool,
}

#[derive(Debug, Serialize)]
struct RankResponse {
    #[serde(flatten)]
    page: RankedPage,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanations: Option<Vec<Vec<String>>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the page
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid ranking configuration");
            return Err(e.into());
        }
    };

    info!(
        weights_version = config.ranking.weights_version,
        half_life_hours = config.ranking.half_life_hours,
        page_size = config.ranking.page_size,
        "Starting feed-ranking"
    );

    let paginator = Paginator::from_config(&config.cursor_secret, &config.ranking)?;
    let engine = RankingEngine::new(config.ranking)?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read rank request from stdin")?;
    let request: RankRequest =
        serde_json::from_str(&input).context("Failed to parse rank request")?;

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("rank_request", %request_id, sort = request.sort.as_str());

    let response = handle(&engine, &paginator, request).instrument(span).await?;

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

async fn handle(
    engine: &RankingEngine,
    paginator: &Paginator,
    request: RankRequest,
) -> anyhow::Result<RankResponse> {
    let now = request.now.unwrap_or_else(Utc::now);
    let sort = request.sort;

    let ranked = engine
        .rank_with_timeout(request.posts, Arc::new(request.trust), now, sort, RANK_TIMEOUT)
        .await?;
    let page = paginator.paginate(&ranked, sort, request.cursor.as_deref());

    let explanations = request.explain.then(|| {
        page.items
            .iter()
            .map(|item| {
                explain(&item.breakdown)
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            })
            .collect()
    });

    info!(
        returned = page.items.len(),
        has_more = page.has_more,
        "Rank request served"
    );

    Ok(RankResponse { page, explanations })
}
