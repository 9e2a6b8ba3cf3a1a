use serde::Deserialize;

use crate::services::rules::MiningSettings;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL catalog connection URL; the in-memory catalog is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL; the in-memory cache is used when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// JSON seed file for the in-memory catalog
    #[serde(default)]
    pub catalog_seed_path: Option<String>,

    /// Token required by the rule refresh endpoint; refresh is disabled when unset
    #[serde(default)]
    pub admin_token: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Minimum itemset support (fraction of transactions)
    #[serde(default = "default_min_support")]
    pub min_support: f64,

    /// Minimum rule confidence
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Minimum rule lift
    #[serde(default = "default_min_lift")]
    pub min_lift: f64,

    /// Lifetime of the cached rule set in seconds
    #[serde(default = "default_rule_cache_ttl_secs")]
    pub rule_cache_ttl_secs: u64,

    /// Number of recommendations returned when the request does not say
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    /// Wall-clock budget for one mining run in milliseconds
    #[serde(default = "default_mining_budget_ms")]
    pub mining_budget_ms: u64,

    /// Raw score treated as 100 when normalizing variant scores
    #[serde(default = "default_variant_score_ceiling")]
    pub variant_score_ceiling: f64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_min_support() -> f64 {
    0.05
}

fn default_min_confidence() -> f64 {
    0.3
}

fn default_min_lift() -> f64 {
    1.0
}

fn default_rule_cache_ttl_secs() -> u64 {
    60 * 60 * 24
}

fn default_top_n() -> usize {
    5
}

fn default_mining_budget_ms() -> u64 {
    5_000
}

fn default_variant_score_ceiling() -> f64 {
    305.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            redis_url: None,
            catalog_seed_path: None,
            admin_token: None,
            host: default_host(),
            port: default_port(),
            min_support: default_min_support(),
            min_confidence: default_min_confidence(),
            min_lift: default_min_lift(),
            rule_cache_ttl_secs: default_rule_cache_ttl_secs(),
            default_top_n: default_top_n(),
            mining_budget_ms: default_mining_budget_ms(),
            variant_score_ceiling: default_variant_score_ceiling(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects thresholds that would make mining meaningless
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.min_support > 0.0 && self.min_support <= 1.0) {
            anyhow::bail!("MIN_SUPPORT must be in (0, 1], got {}", self.min_support);
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            anyhow::bail!("MIN_CONFIDENCE must be in [0, 1], got {}", self.min_confidence);
        }
        if self.min_lift < 0.0 {
            anyhow::bail!("MIN_LIFT must be non-negative, got {}", self.min_lift);
        }
        if self.default_top_n == 0 {
            anyhow::bail!("DEFAULT_TOP_N must be at least 1");
        }
        if self.variant_score_ceiling <= 0.0 {
            anyhow::bail!(
                "VARIANT_SCORE_CEILING must be positive, got {}",
                self.variant_score_ceiling
            );
        }
        Ok(())
    }

    /// Mining thresholds and cache policy for the recommendation engine
    pub fn mining_settings(&self) -> MiningSettings {
        MiningSettings {
            min_support: self.min_support,
            min_confidence: self.min_confidence,
            min_lift: self.min_lift,
            cache_ttl_secs: self.rule_cache_ttl_secs,
            default_top_n: self.default_top_n,
            mining_budget: std::time::Duration::from_millis(self.mining_budget_ms),
        }
    }
}
