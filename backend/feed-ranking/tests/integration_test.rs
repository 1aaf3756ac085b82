use chrono::{DateTime, Duration, TimeZone, Utc};
use feed_ranking::config::{RankingWeights, MAX_PAGE_SIZE};
use feed_ranking::models::{
    EngagementCounters, MediaRef, ModerationFlag, PostContent, PostId, PublisherId,
};
use feed_ranking::services::engagement::normalize_engagement;
use feed_ranking::services::ranking::{explain, rank, RankingReason};
use feed_ranking::services::recency::freshness;
use feed_ranking::services::trust::{TrustProvider, TrustSnapshotCache};
use feed_ranking::{
    ConfigError, FeedSort, Paginator, Post, RankingConfig, RankingEngine, ScoreCache, TrustTable,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn post(id: &str, publisher: &str, age_minutes: i64, engagement: EngagementCounters) -> Post {
    Post {
        id: PostId::new(id),
        publisher_id: PublisherId::new(publisher),
        created_at: now() - Duration::minutes(age_minutes),
        version: 1,
        content: PostContent::default(),
        engagement,
        velocity: None,
        moderation_flags: BTreeSet::new(),
    }
}

fn complete_content() -> PostContent {
    PostContent {
        title: Some("Handmade walnut desk".to_string()),
        description: Some("Solid walnut, hand finished with oil. Ships flat packed.".repeat(3)),
        media: vec![MediaRef {
            url: "https://cdn.example.com/desk.jpg".to_string(),
            broken: false,
        }],
        categories: vec!["furniture".to_string()],
        has_price: true,
        has_availability: true,
        rating: None,
    }
}

fn heavy() -> EngagementCounters {
    EngagementCounters {
        views: 20_000,
        likes: 1_500,
        comments: 300,
        shares: 200,
        saves: 400,
    }
}

fn catalog(n: usize) -> Vec<Post> {
    (0..n)
        .map(|i| {
            post(
                &format!("post-{:03}", i),
                if i % 3 == 0 { "acme" } else { "indie" },
                (i as i64 * 47) % 2_000,
                EngagementCounters {
                    views: ((i * 7_919) % 5_000) as i64,
                    likes: ((i * 31) % 200) as i64,
                    ..Default::default()
                },
            )
        })
        .collect()
}

#[test]
fn test_composite_stays_in_unit_interval() {
    let weight_sets = [
        RankingWeights::default(),
        RankingWeights::new(1.0, 0.0, 0.0, 0.0).unwrap(),
        RankingWeights::new(0.0, 0.0, 0.0, 1.0).unwrap(),
        RankingWeights::new(0.1, 0.2, 0.3, 0.4).unwrap(),
        RankingWeights::new(0.25, 0.25, 0.25, 0.25).unwrap(),
    ];
    let trust = TrustTable::new()
        .with_score("acme", 1.0)
        .with_score("indie", 0.0);

    let mut extremes = catalog(40);
    let mut viral = post("viral", "acme", 0, heavy());
    viral.content = complete_content();
    extremes.push(viral);
    extremes.push(post(
        "negative",
        "indie",
        -30,
        EngagementCounters {
            views: -5,
            likes: i64::MAX,
            ..Default::default()
        },
    ));

    for weights in weight_sets {
        let config = RankingConfig {
            weights,
            ..Default::default()
        };
        let ranked = rank(extremes.clone(), &trust, now(), &config).unwrap();
        assert_eq!(ranked.len(), extremes.len());
        for item in &ranked {
            let c = item.breakdown.composite;
            assert!((0.0..=1.0).contains(&c), "{} out of range: {}", item.post.id, c);
        }
    }
}

#[test]
fn test_engagement_monotonic_in_each_counter() {
    let config = RankingConfig::default();
    let weights = &config.engagement.weights;
    let k = config.engagement.calibration_k;
    let base = EngagementCounters {
        views: 100,
        likes: 10,
        comments: 2,
        shares: 1,
        saves: 3,
    };

    let bumps: [fn(&mut EngagementCounters); 5] = [
        |c| c.views += 1_000,
        |c| c.likes += 1_000,
        |c| c.comments += 1_000,
        |c| c.shares += 1_000,
        |c| c.saves += 1_000,
    ];
    let before = normalize_engagement(&base, weights, k);
    for bump in bumps {
        let mut more = base;
        bump(&mut more);
        assert!(normalize_engagement(&more, weights, k) >= before);
    }
}

#[test]
fn test_decay_identities() {
    for half_life in [0.5, 6.0, 24.0, 168.0] {
        assert_eq!(freshness(now(), now(), half_life), 1.0);

        let one_half_life_ago = now() - Duration::milliseconds((half_life * 3_600_000.0) as i64);
        assert!((freshness(one_half_life_ago, now(), half_life) - 0.5).abs() < 1e-9);
    }
    // Future timestamps clamp to age zero
    assert_eq!(freshness(now() + Duration::hours(3), now(), 6.0), 1.0);
}

#[test]
fn test_suspended_never_ranked() {
    let mut posts = catalog(10);
    let mut suspended = post("suspended-viral", "acme", 0, heavy());
    suspended.content = complete_content();
    suspended.moderation_flags.insert(ModerationFlag::Suspended);
    posts.push(suspended);

    // Even with an empty exclusion set
    let config = RankingConfig {
        exclude_flags: BTreeSet::new(),
        ..Default::default()
    };
    let trust = TrustTable::new().with_score("acme", 1.0);
    let ranked = rank(posts, &trust, now(), &config).unwrap();

    assert_eq!(ranked.len(), 10);
    assert!(ranked.iter().all(|r| r.post.id.as_str() != "suspended-viral"));
}

#[test]
fn test_absent_publisher_matches_explicit_neutral() {
    let a = post("a", "unknown", 60, heavy());
    let b = post("b", "neutral", 60, heavy());
    let trust = TrustTable::new().with_score("neutral", 0.5);

    let ranked = rank(vec![a, b], &trust, now(), &RankingConfig::default()).unwrap();
    assert_eq!(ranked[0].breakdown, ranked[1].breakdown);
    // Full tie falls through to id
    assert_eq!(ranked[0].post.id.as_str(), "a");
}

#[test]
fn test_two_pages_are_prefix_of_full_ordering() {
    let engine = RankingEngine::new(RankingConfig::default()).unwrap();
    let trust = TrustTable::new().with_score("acme", 0.9);
    let ordered = engine.rank(catalog(50), &trust, now(), FeedSort::Top);

    let paginator = Paginator::new("integration-secret", 7).unwrap();
    let first = paginator.paginate(&ordered, FeedSort::Top, None);
    let second = paginator.paginate(&ordered, FeedSort::Top, first.next_cursor.as_deref());

    let fetched: Vec<&PostId> = first
        .items
        .iter()
        .chain(second.items.iter())
        .map(|r| &r.post.id)
        .collect();
    let expected: Vec<&PostId> = ordered.iter().take(14).map(|r| &r.post.id).collect();
    assert_eq!(fetched, expected);
    assert!(second.has_more);
}

#[test]
fn test_tie_break_is_deterministic() {
    let same_inputs = |id: &str, total: i64, age: i64| {
        post(
            id,
            "acme",
            age,
            EngagementCounters {
                views: total,
                ..Default::default()
            },
        )
    };
    // Equal composites need equal component scores; only the raw total differs
    // when weights ignore engagement and freshness
    let config = RankingConfig {
        weights: RankingWeights::new(0.5, 0.0, 0.0, 0.5).unwrap(),
        ..Default::default()
    };
    let posts = vec![
        same_inputs("c", 10, 30),
        same_inputs("b", 10, 30),
        same_inputs("d", 10, 90),
        same_inputs("a", 20, 90),
    ];

    let first = rank(posts.clone(), &TrustTable::new(), now(), &config).unwrap();
    let ids: Vec<&str> = first.iter().map(|r| r.post.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);

    let mut reversed = posts;
    reversed.reverse();
    let again = rank(reversed, &TrustTable::new(), now(), &config).unwrap();
    assert_eq!(first, again);
}

#[test]
fn test_engaged_post_outranks_idle_twin() {
    let mut a = post("a", "trusted", 60, heavy());
    a.content = complete_content();
    let mut b = post("b", "trusted", 60, EngagementCounters::default());
    b.content = complete_content();
    let trust = TrustTable::new().with_score("trusted", 1.0);

    let ranked = rank(vec![b, a], &trust, now(), &RankingConfig::default()).unwrap();
    assert_eq!(ranked[0].post.id.as_str(), "a");
    assert!(ranked[0].breakdown.composite > ranked[1].breakdown.composite);
    assert!(ranked[0].breakdown.quality >= 0.9);
}

#[test]
fn test_malformed_cursor_serves_first_page() {
    let ordered = rank(catalog(12), &TrustTable::new(), now(), &RankingConfig::default()).unwrap();
    let paginator = Paginator::new("integration-secret", 5).unwrap();

    let fresh = paginator.paginate(&ordered, FeedSort::Top, None);
    let garbage = paginator.paginate(&ordered, FeedSort::Top, Some("not-a-cursor"));
    assert_eq!(fresh, garbage);
}

#[test]
fn test_weights_over_one_rejected_at_load() {
    assert!(matches!(
        RankingWeights::new(0.3, 0.3, 0.3, 0.2),
        Err(ConfigError::WeightsDoNotSumToOne(_))
    ));

    let config = RankingConfig {
        weights: RankingWeights {
            quality: 0.3,
            engagement: 0.3,
            freshness: 0.3,
            trust: 0.2,
        },
        ..Default::default()
    };
    assert!(RankingEngine::new(config.clone()).is_err());
    assert!(rank(catalog(3), &TrustTable::new(), now(), &config).is_err());
}

#[test]
fn test_page_size_bound() {
    assert!(Paginator::new("s", MAX_PAGE_SIZE).is_ok());
    assert!(Paginator::new("s", MAX_PAGE_SIZE + 1).is_err());
}

#[test]
fn test_explanations_for_top_post() {
    let mut a = post("a", "trusted", 30, heavy());
    a.content = complete_content();
    let trust = TrustTable::new().with_score("trusted", 0.95);

    let ranked = rank(vec![a], &trust, now(), &RankingConfig::default()).unwrap();
    let reasons = explain(&ranked[0].breakdown);

    assert_eq!(reasons[0], RankingReason::PostedMinutesAgo { minutes: 30 });
    assert!(reasons.contains(&RankingReason::ExcellentReputation));
    assert!(matches!(reasons.last(), Some(RankingReason::Overall { .. })));
}

struct StaticTrust(TrustTable);

#[async_trait::async_trait]
impl TrustProvider for StaticTrust {
    async fn load_trust_table(&self) -> anyhow::Result<TrustTable> {
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn test_parallel_pipeline_with_trust_snapshot() {
    let provider = StaticTrust(TrustTable::new().with_score("acme", 0.9));
    let trust_cache = TrustSnapshotCache::new(provider, std::time::Duration::from_secs(60));
    let trust = trust_cache.snapshot().await;

    let config = RankingConfig {
        max_workers: 3,
        ..Default::default()
    };
    let engine = RankingEngine::new(config)
        .unwrap()
        .with_score_cache(Arc::new(ScoreCache::new()));

    let serial = engine.rank(catalog(100), &trust, now(), FeedSort::Top);
    let parallel = engine
        .rank_parallel(catalog(100), Arc::clone(&trust), now(), FeedSort::Top)
        .await
        .unwrap();
    assert_eq!(serial, parallel);

    let paginator = Paginator::from_config("integration-secret", engine.config()).unwrap();
    let page = paginator.paginate(&parallel, FeedSort::Top, None);
    assert_eq!(page.items.len(), engine.config().page_size);
}
