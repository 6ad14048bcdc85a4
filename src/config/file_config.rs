//! Configuration file support for book-finder.
//!
//! Plain TOML load/save without the environment layering of
//! [`load_config`](super::load_config); used by `book-finder config init`
//! and `config show`.
//!
//! # Configuration File Format
//!
//! ```toml
//! [catalog]
//! base_url = "https://www.googleapis.com/books/v1"
//! api_key = "your-api-key"
//! page_size = 10
//!
//! [http]
//! timeout_seconds = 30
//! connect_timeout_seconds = 10
//! user_agent = "book-finder/0.1.0"
//!
//! [logging]
//! level = "warn"
//! format = "json"
//! ```

use std::path::Path;

use super::Config;

impl Config {
    /// Load configuration from a TOML file
    pub fn load_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }

        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }

    /// Render as TOML, with the API key masked
    pub fn to_redacted_toml(&self) -> Result<String, ConfigFileError> {
        let mut shown = self.clone();
        if shown.catalog.api_key.is_some() {
            shown.catalog.api_key = Some("********".to_string());
        }
        toml::to_string_pretty(&shown).map_err(|e| ConfigFileError::Serialize(e.to_string()))
    }
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
