use crate::error::ConfigError;
use crate::models::ModerationFlag;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

/// Tolerance when checking that the composite weights sum to one
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Upper bound on a single page
pub const MAX_PAGE_SIZE: usize = 100;

pub const DEFAULT_HALF_LIFE_HOURS: f64 = 6.0;
pub const DEFAULT_ENGAGEMENT_K: f64 = 500.0;
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Composite weights: w_q + w_e + w_f + w_t must equal 1
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RankingWeights {
    pub quality: f64,
    pub engagement: f64,
    pub freshness: f64,
    pub trust: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            quality: 0.25,
            engagement: 0.30,
            freshness: 0.35,
            trust: 0.10,
        }
    }
}

impl RankingWeights {
    pub fn new(quality: f64, engagement: f64, freshness: f64, trust: f64) -> Result<Self, ConfigError> {
        let weights = Self {
            quality,
            engagement,
            freshness,
            trust,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("quality", self.quality),
            ("engagement", self.engagement),
            ("freshness", self.freshness),
            ("trust", self.trust),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }

        let sum: f64 = named.iter().map(|(_, v)| v).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSumToOne(sum));
        }
        Ok(())
    }
}

/// Per-counter signal strength; a share says more than a view
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EngagementWeights {
    pub views: f64,
    pub likes: f64,
    pub comments: f64,
    pub shares: f64,
    pub saves: f64,
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self {
            views: 1.0,
            likes: 3.0,
            comments: 4.0,
            shares: 8.0,
            saves: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngagementConfig {
    pub weights: EngagementWeights,
    /// Weighted engagement of a "typical" post; scores 0.5
    pub calibration_k: f64,
    /// Per-category overrides of `calibration_k`
    #[serde(default)]
    pub category_calibration: HashMap<String, f64>,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            weights: EngagementWeights::default(),
            calibration_k: DEFAULT_ENGAGEMENT_K,
            category_calibration: HashMap::new(),
        }
    }
}

impl EngagementConfig {
    /// Calibration constant for a category, falling back to the default
    pub fn calibration_for(&self, category: Option<&str>) -> f64 {
        category
            .and_then(|c| self.category_calibration.get(c))
            .copied()
            .unwrap_or(self.calibration_k)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        let named = [
            ("views", w.views),
            ("likes", w.likes),
            ("comments", w.comments),
            ("shares", w.shares),
            ("saves", w.saves),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }

        if !(self.calibration_k.is_finite() && self.calibration_k > 0.0) {
            return Err(ConfigError::NonPositiveCalibration {
                scope: "default".to_string(),
                value: self.calibration_k,
            });
        }
        for (category, &k) in &self.category_calibration {
            if !(k.is_finite() && k > 0.0) {
                return Err(ConfigError::NonPositiveCalibration {
                    scope: category.clone(),
                    value: k,
                });
            }
        }
        Ok(())
    }
}

/// Immutable ranking configuration, supplied per call or per tenant
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankingConfig {
    pub weights: RankingWeights,
    pub half_life_hours: f64,
    pub engagement: EngagementConfig,
    /// `suspended` is always excluded, whether listed here or not
    pub exclude_flags: BTreeSet<ModerationFlag>,
    pub page_size: usize,
    /// Bumped whenever weights change; invalidates cached breakdowns
    pub weights_version: u64,
    /// Fan-out bound for parallel scoring; 0 means available cores
    #[serde(default)]
    pub max_workers: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: RankingWeights::default(),
            half_life_hours: DEFAULT_HALF_LIFE_HOURS,
            engagement: EngagementConfig::default(),
            exclude_flags: BTreeSet::from([ModerationFlag::Suspended]),
            page_size: DEFAULT_PAGE_SIZE,
            weights_version: 1,
            max_workers: 0,
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;

        if !(self.half_life_hours.is_finite() && self.half_life_hours > 0.0) {
            return Err(ConfigError::NonPositiveHalfLife(self.half_life_hours));
        }

        self.engagement.validate()?;

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidPageSize {
                value: self.page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(())
    }

    /// Validate and return self, for builder-style construction
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }

    pub fn is_excluded(&self, flag: ModerationFlag) -> bool {
        flag == ModerationFlag::Suspended || self.exclude_flags.contains(&flag)
    }

    /// Worker count for parallel scoring
    pub fn worker_count(&self) -> usize {
        if self.max_workers > 0 {
            self.max_workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

/// Raw `FEED_RANKING_*` environment overrides. Anything unset keeps its default.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    weight_quality: Option<f64>,
    weight_engagement: Option<f64>,
    weight_freshness: Option<f64>,
    weight_trust: Option<f64>,
    half_life_hours: Option<f64>,
    engagement_k: Option<f64>,
    page_size: Option<usize>,
    weights_version: Option<u64>,
    max_workers: Option<usize>,
    cursor_secret: Option<String>,
}

/// Service-level configuration for the `feed-ranking` binary
#[derive(Debug, Clone)]
pub struct Config {
    pub ranking: RankingConfig,
    pub cursor_secret: String,
}

impl Config {
    /// Load from `FEED_RANKING_*` variables (and `.env` when present).
    ///
    /// The library core never calls this; only the binary does.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let overrides: EnvOverrides = envy::prefixed("FEED_RANKING_").from_env()?;
        Self::from_overrides(overrides)
    }

    fn from_overrides(env: EnvOverrides) -> Result<Self, ConfigError> {
        let defaults = RankingConfig::default();
        let weights = RankingWeights {
            quality: env.weight_quality.unwrap_or(defaults.weights.quality),
            engagement: env.weight_engagement.unwrap_or(defaults.weights.engagement),
            freshness: env.weight_freshness.unwrap_or(defaults.weights.freshness),
            trust: env.weight_trust.unwrap_or(defaults.weights.trust),
        };

        let ranking = RankingConfig {
            weights,
            half_life_hours: env.half_life_hours.unwrap_or(defaults.half_life_hours),
            engagement: EngagementConfig {
                calibration_k: env
                    .engagement_k
                    .unwrap_or(defaults.engagement.calibration_k),
                ..defaults.engagement
            },
            exclude_flags: defaults.exclude_flags,
            page_size: env.page_size.unwrap_or(defaults.page_size),
            weights_version: env.weights_version.unwrap_or(defaults.weights_version),
            max_workers: env.max_workers.unwrap_or(defaults.max_workers),
        }
        .validated()?;

        let cursor_secret = env.cursor_secret.unwrap_or_default();
        if cursor_secret.is_empty() {
            return Err(ConfigError::EmptyCursorSecret);
        }

        Ok(Config {
            ranking,
            cursor_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RankingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_weights_over_one_rejected() {
        let result = RankingWeights::new(0.3, 0.3, 0.3, 0.2);
        assert!(matches!(result, Err(ConfigError::WeightsDoNotSumToOne(sum)) if (sum - 1.1).abs() < 1e-9));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let result = RankingWeights::new(-0.1, 0.5, 0.4, 0.2);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidWeight { name: "quality", .. })
        ));
    }

    #[test]
    fn test_nan_weight_rejected() {
        let result = RankingWeights::new(f64::NAN, 0.5, 0.3, 0.2);
        assert!(matches!(result, Err(ConfigError::InvalidWeight { .. })));
    }

    #[test]
    fn test_half_life_must_be_positive() {
        let config = RankingConfig {
            half_life_hours: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveHalfLife(0.0)));
    }

    #[test]
    fn test_page_size_bounds() {
        let zero = RankingConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero.validate(),
            Err(ConfigError::InvalidPageSize { value: 0, .. })
        ));

        let huge = RankingConfig {
            page_size: MAX_PAGE_SIZE + 1,
            ..Default::default()
        };
        assert!(huge.validate().is_err());
    }

    #[test]
    fn test_category_calibration_fallback() {
        let mut engagement = EngagementConfig::default();
        engagement
            .category_calibration
            .insert("electronics".to_string(), 2000.0);

        assert_eq!(engagement.calibration_for(Some("electronics")), 2000.0);
        assert_eq!(engagement.calibration_for(Some("books")), DEFAULT_ENGAGEMENT_K);
        assert_eq!(engagement.calibration_for(None), DEFAULT_ENGAGEMENT_K);
    }

    #[test]
    fn test_category_calibration_must_be_positive() {
        let mut config = RankingConfig::default();
        config
            .engagement
            .category_calibration
            .insert("books".to_string(), 0.0);

        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveCalibration { scope, .. }) if scope == "books"
        ));
    }

    #[test]
    fn test_suspended_always_excluded() {
        let config = RankingConfig {
            exclude_flags: BTreeSet::new(),
            ..Default::default()
        };
        assert!(config.is_excluded(ModerationFlag::Suspended));
        assert!(!config.is_excluded(ModerationFlag::Reported));
    }

    #[test]
    fn test_overrides_apply_and_validate() {
        let env = EnvOverrides {
            weight_quality: Some(0.4),
            weight_engagement: Some(0.2),
            weight_freshness: Some(0.3),
            weight_trust: Some(0.1),
            page_size: Some(10),
            cursor_secret: Some("s3cret".to_string()),
            ..Default::default()
        };
        let config = Config::from_overrides(env).unwrap();

        assert_eq!(config.ranking.weights.quality, 0.4);
        assert_eq!(config.ranking.page_size, 10);
        assert_eq!(config.ranking.half_life_hours, DEFAULT_HALF_LIFE_HOURS);
    }

    #[test]
    fn test_overrides_reject_bad_weights() {
        let env = EnvOverrides {
            weight_quality: Some(0.3),
            weight_engagement: Some(0.3),
            weight_freshness: Some(0.3),
            weight_trust: Some(0.2),
            cursor_secret: Some("s3cret".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Config::from_overrides(env),
            Err(ConfigError::WeightsDoNotSumToOne(_))
        ));
    }

    #[test]
    fn test_overrides_require_cursor_secret() {
        assert_eq!(
            Config::from_overrides(EnvOverrides::default()).unwrap_err(),
            ConfigError::EmptyCursorSecret
        );
    }
}
