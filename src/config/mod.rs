//! Configuration management.
//!
//! Settings come from built-in defaults, an optional TOML file, and
//! `CITATION_FINDER_*` environment variables, in increasing precedence.
//! Nested keys use a double underscore, e.g.
//! `CITATION_FINDER_SEARCH__PROVIDER_TIMEOUT_SECS=5`.

mod file_config;

pub use file_config::{load_config_file, save_config_file, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::DEFAULT_MAX_RESULTS;

/// File name looked up by [`find_config_file`]
pub const CONFIG_FILE_NAME: &str = "citation-finder.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Aggregation and merge settings
    #[serde(default)]
    pub search: SearchSettings,

    /// Runtime provider selection
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Patent index endpoint
    #[serde(default)]
    pub patent: PatentConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Aggregation and merge settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Title similarity above which two records are the same work
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Results requested from each provider
    #[serde(default = "default_max_results")]
    pub max_results_per_source: usize,

    /// Upper bound on a single provider call, in seconds
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,

    /// Results shown after refinement
    #[serde(default = "default_max_displayed")]
    pub max_displayed_results: usize,
}

impl SearchSettings {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            max_results_per_source: default_max_results(),
            provider_timeout_secs: default_provider_timeout(),
            max_displayed_results: default_max_displayed(),
        }
    }
}

fn default_similarity_threshold() -> f64 {
    0.65
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_provider_timeout() -> u64 {
    10
}

fn default_max_displayed() -> usize {
    10
}

/// Runtime provider selection.
///
/// `enabled_sources` restricts the fan-out to the listed providers;
/// `disabled_sources` always wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Comma-separated provider ids to use exclusively
    #[serde(default)]
    pub enabled_sources: Option<String>,

    /// Comma-separated provider ids to never use
    #[serde(default)]
    pub disabled_sources: Option<String>,
}

impl SourcesConfig {
    /// Whether the provider with this id takes part in searches
    pub fn is_enabled(&self, id: &str) -> bool {
        if list_contains(self.disabled_sources.as_deref(), id) {
            return false;
        }
        match self.enabled_sources.as_deref() {
            Some(list) if !list.trim().is_empty() => list_contains(Some(list), id),
            _ => true,
        }
    }
}

fn list_contains(list: Option<&str>, id: &str) -> bool {
    list.map(|l| l.split(',').any(|s| s.trim().eq_ignore_ascii_case(id)))
        .unwrap_or(false)
}

/// Patent index endpoint; the patent provider stays inert without one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatentConfig {
    #[serde(default)]
    pub api_url: Option<String>,
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_connect_timeout() -> u64 {
    5
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `"json"` for structured output, anything else for plain text
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Load configuration from an optional file layered under the environment
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix("CITATION_FINDER")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}

/// Look for a config file in the working directory, then the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("citation-finder").join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.similarity_threshold, 0.65);
        assert_eq!(config.search.max_results_per_source, 5);
        assert_eq!(config.search.provider_timeout(), Duration::from_secs(10));
        assert!(config.patent.api_url.is_none());
    }

    #[test]
    fn test_sources_enable_rules() {
        let all = SourcesConfig::default();
        assert!(all.is_enabled("crossref"));

        let only = SourcesConfig {
            enabled_sources: Some("crossref, openlibrary".to_string()),
            disabled_sources: None,
        };
        assert!(only.is_enabled("openlibrary"));
        assert!(!only.is_enabled("doaj"));

        let both = SourcesConfig {
            enabled_sources: Some("crossref,doaj".to_string()),
            disabled_sources: Some("DOAJ".to_string()),
        };
        assert!(both.is_enabled("crossref"));
        assert!(!both.is_enabled("doaj"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("citation-finder.toml");
        std::fs::write(
            &path,
            "[search]\nsimilarity_threshold = 0.8\n\n[patent]\napi_url = \"https://patents.example.org/search\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.search.similarity_threshold, 0.8);
        assert_eq!(config.search.max_results_per_source, 5);
        assert_eq!(
            config.patent.api_url.as_deref(),
            Some("https://patents.example.org/search")
        );
    }
}
