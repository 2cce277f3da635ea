//! Configuration system for recollect.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{RecollectError, RecollectResult};
use crate::retrieval::DEFAULT_CACHE_TTL_MS;
use crate::types::{DEFAULT_LIMIT, DEFAULT_THRESHOLD, MAX_KEYWORDS};

/// Extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Text with no facts must be longer than this to become a general memory.
    pub fallback_min_length: usize,
    /// Confidence given to general fallback memories.
    pub fallback_confidence: f32,
    /// Keywords kept per memory.
    pub max_keywords: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fallback_min_length: 10,
            fallback_confidence: 0.3,
            max_keywords: MAX_KEYWORDS,
        }
    }
}

/// Ranked search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Limit used when callers do not pass one.
    pub default_limit: usize,
    /// Threshold used when callers do not pass one.
    pub default_threshold: f32,
    /// Candidates requested from the store per wanted result.
    pub oversample_factor: usize,
    /// Persist access count and last access for returned memories.
    ///
    /// When off, the access boost stays at zero for every memory.
    pub persist_access: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            default_threshold: DEFAULT_THRESHOLD,
            oversample_factor: 2,
            persist_access: true,
        }
    }
}

/// Search cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether search results are cached.
    pub enabled: bool,
    /// Staleness window in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: (DEFAULT_CACHE_TTL_MS / 1000) as u64,
        }
    }
}

impl CacheConfig {
    /// TTL in milliseconds.
    pub fn ttl_ms(&self) -> i64 {
        (self.ttl_secs as i64).saturating_mul(1000)
    }
}

/// Context formatting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Hard cap on the injected text length, in characters.
    pub max_length: usize,
    /// Append the memory type to each line in flat mode.
    pub include_metadata: bool,
    /// Group lines under category headers.
    pub group_by_category: bool,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            max_length: 1000,
            include_metadata: false,
            group_by_category: false,
        }
    }
}

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecollectConfig {
    /// Extraction settings.
    pub extraction: ExtractionConfig,
    /// Ranked search settings.
    pub retrieval: RetrievalConfig,
    /// Cache settings.
    pub cache: CacheConfig,
    /// Formatting settings.
    pub injection: InjectionConfig,
    /// Platform label used when none is given.
    pub platform: String,
    /// Path to the SQLite database.
    pub db_path: PathBuf,
}

impl Default for RecollectConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            retrieval: RetrievalConfig::default(),
            cache: CacheConfig::default(),
            injection: InjectionConfig::default(),
            platform: "cli".to_string(),
            db_path: default_data_dir().join("memories.db"),
        }
    }
}

/// `~/.recollect`, or `.recollect` when there is no home directory.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".recollect"))
        .unwrap_or_else(|| PathBuf::from(".recollect"))
}

impl RecollectConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> RecollectResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| RecollectError::Configuration(e.to_string()))?
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| RecollectError::Configuration(e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| RecollectError::Configuration(e.to_string()))?,
            _ => {
                return Err(RecollectError::Configuration(
                    "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables on top of defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `RECOLLECT_*` environment variables. Unparseable values are
    /// ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var("RECOLLECT_DB_PATH") {
            self.db_path = PathBuf::from(path);
        }
        if let Ok(platform) = std::env::var("RECOLLECT_PLATFORM") {
            self.platform = platform;
        }
        if let Some(limit) = env_parse("RECOLLECT_SEARCH_LIMIT") {
            self.retrieval.default_limit = limit;
        }
        if let Some(threshold) = env_parse("RECOLLECT_SEARCH_THRESHOLD") {
            self.retrieval.default_threshold = threshold;
        }
        if let Ok(value) = std::env::var("RECOLLECT_PERSIST_ACCESS") {
            self.retrieval.persist_access = parse_flag(&value);
        }
        if let Ok(value) = std::env::var("RECOLLECT_CACHE") {
            self.cache.enabled = parse_flag(&value);
        }
        if let Some(ttl) = env_parse("RECOLLECT_CACHE_TTL_SECS") {
            self.cache.ttl_secs = ttl;
        }
        if let Some(max_length) = env_parse("RECOLLECT_MAX_CONTEXT_LENGTH") {
            self.injection.max_length = max_length;
        }
        self
    }

    /// Reject values outside their valid ranges.
    pub fn validate(&self) -> RecollectResult<()> {
        let threshold = self.retrieval.default_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RecollectError::Configuration(format!(
                "retrieval.default_threshold must be between 0.0 and 1.0, got {}",
                threshold
            )));
        }
        if self.retrieval.default_limit == 0 {
            return Err(RecollectError::Configuration(
                "retrieval.default_limit must be at least 1".to_string(),
            ));
        }
        if self.retrieval.oversample_factor == 0 {
            return Err(RecollectError::Configuration(
                "retrieval.oversample_factor must be at least 1".to_string(),
            ));
        }
        if self.injection.max_length == 0 {
            return Err(RecollectError::Configuration(
                "injection.max_length must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.extraction.fallback_confidence) {
            return Err(RecollectError::Configuration(
                "extraction.fallback_confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        Ok(())
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> RecollectConfigBuilder {
        RecollectConfigBuilder::default()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

/// Builder for RecollectConfig.
#[derive(Default)]
pub struct RecollectConfigBuilder {
    config: RecollectConfig,
}

impl RecollectConfigBuilder {
    /// Set extraction configuration.
    pub fn extraction(mut self, config: ExtractionConfig) -> Self {
        self.config.extraction = config;
        self
    }

    /// Set retrieval configuration.
    pub fn retrieval(mut self, config: RetrievalConfig) -> Self {
        self.config.retrieval = config;
        self
    }

    /// Set cache configuration.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.config.cache = config;
        self
    }

    /// Set injection configuration.
    pub fn injection(mut self, config: InjectionConfig) -> Self {
        self.config.injection = config;
        self
    }

    /// Toggle persisted access tracking.
    pub fn persist_access(mut self, enabled: bool) -> Self {
        self.config.retrieval.persist_access = enabled;
        self
    }

    /// Set the default platform label.
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.config.platform = platform.into();
        self
    }

    /// Set the database path.
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_path = path.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> RecollectConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = RecollectConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retrieval.default_limit, 10);
        assert_eq!(config.cache.ttl_ms(), 300_000);
        assert!(config.retrieval.persist_access);
        assert!(config.db_path.ends_with("memories.db"));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "platform = \"claude\"\n[retrieval]\ndefault_threshold = 0.5\npersist_access = false\n[cache]\nttl_secs = 60"
        )
        .unwrap();

        let config = RecollectConfig::from_file(file.path()).unwrap();
        assert_eq!(config.platform, "claude");
        assert!((config.retrieval.default_threshold - 0.5).abs() < f32::EPSILON);
        assert!(!config.retrieval.persist_access);
        assert_eq!(config.cache.ttl_secs, 60);
        // Untouched sections keep defaults.
        assert_eq!(config.injection.max_length, 1000);
    }

    #[test]
    fn test_from_yaml_and_json_files() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(yaml, "injection:\n  group_by_category: true").unwrap();
        assert!(
            RecollectConfig::from_file(yaml.path())
                .unwrap()
                .injection
                .group_by_category
        );

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(json, r#"{{"retrieval": {{"default_limit": 4}}}}"#).unwrap();
        assert_eq!(
            RecollectConfig::from_file(json.path())
                .unwrap()
                .retrieval
                .default_limit,
            4
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = RecollectConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, RecollectError::Configuration(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = RecollectConfig::default();
        config.retrieval.default_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = RecollectConfig::default();
        config.injection.max_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder() {
        let config = RecollectConfig::builder()
            .platform("gemini")
            .persist_access(false)
            .db_path("/tmp/x.db")
            .build();
        assert_eq!(config.platform, "gemini");
        assert!(!config.retrieval.persist_access);
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("OFF"));
        assert!(!parse_flag(" no "));
    }
}
