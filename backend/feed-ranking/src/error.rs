use thiserror::Error;

/// Operator mistakes in the ranking configuration.
///
/// These are fatal at load time: the engine refuses to run rather than
/// normalizing bad weights mid-request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Weight '{name}' must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("Ranking weights must sum to 1.0, got {0}")]
    WeightsDoNotSumToOne(f64),

    #[error("Decay half-life must be positive, got {0} hours")]
    NonPositiveHalfLife(f64),

    #[error("Engagement calibration constant for '{scope}' must be positive, got {value}")]
    NonPositiveCalibration { scope: String, value: f64 },

    #[error("Page size must be between 1 and {max}, got {value}")]
    InvalidPageSize { value: usize, max: usize },

    #[error("Cursor signing secret must not be empty")]
    EmptyCursorSecret,

    #[error("Failed to read configuration from environment: {0}")]
    Env(String),
}

impl From<envy::Error> for ConfigError {
    fn from(err: envy::Error) -> Self {
        ConfigError::Env(err.to_string())
    }
}

/// Errors surfaced by a ranking call.
///
/// Bad candidate data is never an error; it is clamped or defaulted by the
/// individual scorers.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Invalid ranking configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Ranking timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Scoring worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, RankingError>;

/// Reasons a pagination cursor was rejected.
///
/// Never returned to callers: the paginator logs it and serves page 1.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("cursor is not valid base64url: {0}")]
    Encoding(String),

    #[error("cursor signature does not match")]
    Signature,

    #[error("cursor payload is malformed: {0}")]
    Payload(String),

    #[error("unsupported cursor version {0}")]
    Version(u8),

    #[error("cursor was issued for sort '{issued}', not '{requested}'")]
    SortMismatch {
        issued: &'static str,
        requested: &'static str,
    },
}
