//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::calculate::cards::CardStatsRequest;
use crate::calculate::colors::ColorStatsRequest;
use crate::calculate::report::ReportOptions;
use crate::calculate::synergy::SynergyStatsRequest;
use crate::calculate::Bucketing;
use crate::parse_duration;
use crate::storage::{CachePolicy, StorageConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Deck cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How often the cached corpus is dropped, e.g. "10s" or "5m"
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,

    /// When false the corpus is loaded once and kept
    #[serde(default = "default_auto_invalidate")]
    pub auto_invalidate: bool,
}

fn default_refresh_interval() -> String {
    "10s".to_string()
}

fn default_auto_invalidate() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            auto_invalidate: default_auto_invalidate(),
        }
    }
}

impl CacheConfig {
    pub fn interval(&self) -> Option<Duration> {
        parse_duration(&self.refresh_interval)
    }
}

/// Query language configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Reject queries with unsupported terms instead of ignoring the terms
    #[serde(default)]
    pub strict: bool,
}

/// Defaults for statistics requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default)]
    pub min_drafts: u32,

    #[serde(default)]
    pub min_games: u32,

    /// Minimum co-occurrences for a synergy pair
    #[serde(default = "default_min_decks")]
    pub min_decks: u32,

    /// Drafts per bucket; 0 disables bucketing
    #[serde(default)]
    pub bucket_size: usize,

    #[serde(default)]
    pub sliding: bool,
}

fn default_min_decks() -> u32 {
    3
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            min_drafts: 0,
            min_games: 0,
            min_decks: default_min_decks(),
            bucket_size: 0,
            sliding: false,
        }
    }
}

impl StatsConfig {
    pub fn bucketing(&self) -> Bucketing {
        Bucketing {
            bucket_size: self.bucket_size,
            sliding: self.sliding,
        }
    }

    /// Request options for a full report using these defaults.
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            cards: CardStatsRequest {
                bucketing: self.bucketing(),
                min_drafts: self.min_drafts,
                min_games: self.min_games,
                ..Default::default()
            },
            colors: ColorStatsRequest {
                bucketing: self.bucketing(),
                strict_colors: false,
            },
            bucketing: self.bucketing(),
            synergy: SynergyStatsRequest {
                min_decks: self.min_decks,
            },
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Cube name; decks live under `<data_dir>/<cube>`
    #[serde(default = "default_cube")]
    pub cube: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_cube() -> String {
    "polyverse".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cube: default_cube(),
            log_level: default_log_level(),
            cache: CacheConfig::default(),
            query: QueryConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cube.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Cube name must not be empty".to_string(),
            ));
        }

        match self.cache.interval() {
            None => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid cache refresh interval: {:?}",
                    self.cache.refresh_interval
                )));
            }
            Some(d) if d.is_zero() && self.cache.auto_invalidate => {
                return Err(ConfigError::ValidationError(
                    "Cache refresh interval must be greater than 0".to_string(),
                ));
            }
            Some(_) => {}
        }

        Ok(())
    }

    pub fn storage(&self) -> StorageConfig {
        StorageConfig::new(self.data_dir.clone(), self.cube.clone())
    }

    /// Periodic invalidation when enabled, otherwise a point-in-time snapshot.
    pub fn cache_policy(&self) -> CachePolicy {
        match self.cache.interval() {
            Some(every) if self.cache.auto_invalidate && !every.is_zero() => {
                CachePolicy::Periodic(every)
            }
            _ => CachePolicy::Snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.cube, "polyverse");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cache.refresh_interval, "10s");
        assert!(config.cache.auto_invalidate);
        assert!(!config.query.strict);
        assert_eq!(config.stats.min_decks, 3);
        assert_eq!(config.stats.bucket_size, 0);
    }

    #[test]
    fn test_cache_policy() {
        let mut config = AppConfig::default();
        assert_eq!(
            config.cache_policy(),
            CachePolicy::Periodic(Duration::from_secs(10))
        );

        config.cache.auto_invalidate = false;
        assert_eq!(config.cache_policy(), CachePolicy::Snapshot);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_cube() {
        let mut config = AppConfig::default();
        config.cube = " ".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_interval() {
        let mut config = AppConfig::default();
        config.cache.refresh_interval = "soon".to_string();
        assert!(config.validate().is_err());

        config.cache.refresh_interval = "0s".to_string();
        assert!(config.validate().is_err());

        config.cache.auto_invalidate = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cube-stats.toml");
        std::fs::write(
            &path,
            r#"
cube = "vintage"

[cache]
refresh_interval = "5m"

[stats]
bucket_size = 4
sliding = true
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.cube, "vintage");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cache.interval(), Some(Duration::from_secs(300)));
        assert_eq!(
            config.stats.bucketing(),
            Bucketing {
                bucket_size: 4,
                sliding: true
            }
        );
        assert_eq!(config.storage().cube_dir(), PathBuf::from("./data/vintage"));
    }

    #[test]
    fn test_report_options_follow_stats_defaults() {
        let stats = StatsConfig {
            min_games: 5,
            min_decks: 2,
            bucket_size: 3,
            ..Default::default()
        };
        let options = stats.report_options();
        assert_eq!(options.cards.min_games, 5);
        assert_eq!(options.cards.bucketing.bucket_size, 3);
        assert_eq!(options.bucketing.bucket_size, 3);
        assert_eq!(options.synergy.min_decks, 2);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.cube, "polyverse");
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "cube = \"\"\n").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.stats.min_decks, parsed.stats.min_decks);
    }
}
