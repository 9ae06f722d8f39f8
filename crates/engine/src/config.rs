use serde::Deserialize;
use sources::TieBreak;
use thiserror::Error;

/// Prefix for environment overrides, e.g. `RECS_SIMILARITY_THRESHOLD=0.6`.
pub const ENV_PREFIX: &str = "RECS_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Engine tunables. Built once and handed to every component; never mutated
/// after the engine is constructed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Minimum content similarity for a song to be returned
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Weight of content scores in the hybrid blend
    #[serde(default = "default_content_weight")]
    pub content_weight: f64,

    /// Weight of collaborative scores in the hybrid blend (0 disables them)
    #[serde(default = "default_collaborative_weight")]
    pub collaborative_weight: f64,

    /// Upper bound for any requested limit
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Limit used when the caller asks for 0
    #[serde(default = "default_default_limit")]
    pub default_limit: usize,

    /// Ordering of near-equal collaborative and hybrid scores
    #[serde(default)]
    pub tie_break: TieBreak,
}

fn default_similarity_threshold() -> f64 {
    0.7
}

fn default_content_weight() -> f64 {
    0.5
}

fn default_collaborative_weight() -> f64 {
    0.5
}

fn default_max_limit() -> usize {
    20
}

fn default_default_limit() -> usize {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            content_weight: default_content_weight(),
            collaborative_weight: default_collaborative_weight(),
            max_limit: default_max_limit(),
            default_limit: default_default_limit(),
            tie_break: TieBreak::default(),
        }
    }
}

impl EngineConfig {
    /// Load from the process environment (and a `.env` file if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load from explicit `(name, value)` pairs; only `RECS_*` names are read.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: EngineConfig = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_weights(mut self, content: f64, collaborative: f64) -> Self {
        self.content_weight = content;
        self.collaborative_weight = collaborative;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.default_limit = default_limit;
        self.max_limit = max_limit;
        self
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::Invalid {
                field: "similarity_threshold",
                reason: format!("{} is outside [0, 1]", self.similarity_threshold),
            });
        }
        for (field, weight) in [
            ("content_weight", self.content_weight),
            ("collaborative_weight", self.collaborative_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{} must be a finite, non-negative number", weight),
                });
            }
        }
        if self.max_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "max_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::Invalid {
                field: "default_limit",
                reason: format!(
                    "{} must be between 1 and max_limit ({})",
                    self.default_limit, self.max_limit
                ),
            });
        }
        Ok(())
    }

    /// 0 means "use the default"; anything above `max_limit` is capped.
    pub fn bound_limit(&self, requested: usize) -> usize {
        let limit = if requested == 0 {
            self.default_limit
        } else {
            requested
        };
        limit.min(self.max_limit)
    }
}
