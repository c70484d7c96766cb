use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// All-defaults configuration, used by tests and commands that can run
    /// without a config file on disk.
    pub fn minimal() -> Self {
        Self::default()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/haul.sqlite")
}

/// Catalog matcher thresholds. The cascade itself is fixed; the knobs the
/// drafts disagreed on live here.
#[derive(Debug, Deserialize, Clone)]
pub struct MatcherConfig {
    /// Fraction of query words that must overlap item words for a
    /// token-overlap match.
    #[serde(default = "default_token_overlap_ratio")]
    pub token_overlap_ratio: f64,
    /// Minimum character-overlap relevance before an item may be suggested.
    #[serde(default = "default_suggestion_min_score")]
    pub suggestion_min_score: u32,
    /// Jaro-Winkler similarity floor for the fuzzy suggestion pass.
    #[serde(default = "default_fuzzy_cutoff")]
    pub fuzzy_cutoff: f64,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// Display cap on matches — a pagination concern, not a correctness one.
    #[serde(default = "default_match_limit")]
    pub match_limit: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            token_overlap_ratio: default_token_overlap_ratio(),
            suggestion_min_score: default_suggestion_min_score(),
            fuzzy_cutoff: default_fuzzy_cutoff(),
            max_suggestions: default_max_suggestions(),
            match_limit: default_match_limit(),
        }
    }
}

fn default_token_overlap_ratio() -> f64 {
    0.6
}
fn default_suggestion_min_score() -> u32 {
    3
}
fn default_fuzzy_cutoff() -> f64 {
    0.84
}
fn default_max_suggestions() -> usize {
    3
}
fn default_match_limit() -> usize {
    50
}

/// External lookup endpoints and their per-strategy timeouts.
#[derive(Debug, Deserialize, Clone)]
pub struct LookupConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,
    #[serde(default = "default_encyclopedia_url")]
    pub encyclopedia_url: String,
    #[serde(default = "default_encyclopedia_search_timeout_secs")]
    pub encyclopedia_search_timeout_secs: u64,
    #[serde(default = "default_encyclopedia_extract_timeout_secs")]
    pub encyclopedia_extract_timeout_secs: u64,
    /// Summaries shorter than this are not worth mining for figures.
    #[serde(default = "default_min_summary_len")]
    pub min_summary_len: usize,
    /// Results below this confidence are discarded before caching.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            backend_timeout_secs: default_backend_timeout_secs(),
            encyclopedia_url: default_encyclopedia_url(),
            encyclopedia_search_timeout_secs: default_encyclopedia_search_timeout_secs(),
            encyclopedia_extract_timeout_secs: default_encyclopedia_extract_timeout_secs(),
            min_summary_len: default_min_summary_len(),
            min_confidence: default_min_confidence(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:3001/api/scrape-item".to_string()
}
fn default_backend_timeout_secs() -> u64 {
    10
}
fn default_encyclopedia_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}
fn default_encyclopedia_search_timeout_secs() -> u64 {
    8
}
fn default_encyclopedia_extract_timeout_secs() -> u64 {
    5
}
fn default_min_summary_len() -> usize {
    80
}
fn default_min_confidence() -> f64 {
    0.5
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
    /// Optional entry lifetime; absent means entries never expire.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_cache_max_entries(),
            ttl_secs: None,
        }
    }
}

fn default_cache_max_entries() -> usize {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7411".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if !(0.0..=1.0).contains(&config.matcher.token_overlap_ratio)
        || config.matcher.token_overlap_ratio == 0.0
    {
        anyhow::bail!("matcher.token_overlap_ratio must be in (0.0, 1.0]");
    }

    if !(0.0..=1.0).contains(&config.matcher.fuzzy_cutoff) {
        anyhow::bail!("matcher.fuzzy_cutoff must be in [0.0, 1.0]");
    }

    if config.matcher.match_limit < 1 {
        anyhow::bail!("matcher.match_limit must be >= 1");
    }

    if config.lookup.backend_url.trim().is_empty() {
        anyhow::bail!("lookup.backend_url must not be empty");
    }

    if config.lookup.backend_timeout_secs == 0 {
        anyhow::bail!("lookup.backend_timeout_secs must be > 0");
    }

    if !(0.0..=1.0).contains(&config.lookup.min_confidence) {
        anyhow::bail!("lookup.min_confidence must be in [0.0, 1.0]");
    }

    if config.cache.max_entries < 1 {
        anyhow::bail!("cache.max_entries must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_gets_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!((config.matcher.token_overlap_ratio - 0.6).abs() < 1e-9);
        assert_eq!(config.matcher.max_suggestions, 3);
        assert_eq!(config.matcher.match_limit, 50);
        assert_eq!(config.lookup.backend_timeout_secs, 10);
        assert_eq!(config.cache.max_entries, 1000);
        assert!(config.cache.ttl_secs.is_none());
        validate(&config).unwrap();
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [lookup]
            backend_url = "http://127.0.0.1:4000/api/scrape-item"
            backend_timeout_secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(
            config.lookup.backend_url,
            "http://127.0.0.1:4000/api/scrape-item"
        );
        assert_eq!(config.lookup.backend_timeout_secs, 3);
        assert_eq!(config.lookup.encyclopedia_search_timeout_secs, 8);
    }

    #[test]
    fn test_validation_rejects_bad_ratio() {
        let mut config = Config::minimal();
        config.matcher.token_overlap_ratio = 1.5;
        assert!(validate(&config).is_err());

        config.matcher.token_overlap_ratio = 0.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_backend_url() {
        let mut config = Config::minimal();
        config.lookup.backend_url = "  ".to_string();
        assert!(validate(&config).is_err());
    }
}
