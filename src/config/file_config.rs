//! Configuration file support for citation-finder.
//!
//! # Configuration File Format
//!
//! ```toml
//! [search]
//! similarity_threshold = 0.65
//! max_results_per_source = 5
//! provider_timeout_secs = 10
//! max_displayed_results = 10
//!
//! [sources]
//! enabled_sources = "crossref,openlibrary,google"
//! disabled_sources = "loc"
//!
//! [patent]
//! api_url = "https://patents.example.org/search"
//!
//! [http]
//! request_timeout_secs = 15
//! connect_timeout_secs = 5
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use std::path::Path;

use super::Config;

/// Read a TOML configuration file without the environment layer
pub fn load_config_file(path: &Path) -> Result<Config, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
}

/// Write a configuration as TOML, creating parent directories as needed
pub fn save_config_file(config: &Config, path: &Path) -> Result<(), ConfigFileError> {
    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
    }

    std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
