//! Configuration management.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config`, `./book-finder.toml`, or the user config dir)
//! 3. environment variables prefixed `BOOK_FINDER_`, with `__` between
//!    section and key (e.g. `BOOK_FINDER_HTTP__TIMEOUT_SECONDS=5`)
//!
//! `GOOGLE_BOOKS_API_KEY` fills `catalog.api_key` when nothing else set it.

mod file_config;

pub use file_config::ConfigFileError;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::PAGE_SIZE;
use crate::sources::GOOGLE_BOOKS_API_BASE;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "BOOK_FINDER";

/// File name searched for in the working directory
pub const LOCAL_CONFIG_FILE: &str = "book-finder.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Catalog endpoint settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Catalog endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// API root, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional API key for a higher request quota
    #[serde(default)]
    pub api_key: Option<String>,

    /// Books requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            page_size: default_page_size(),
        }
    }
}

fn default_base_url() -> String {
    GOOGLE_BOOKS_API_BASE.to_string()
}

fn default_page_size() -> usize {
    PAGE_SIZE
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when neither `-v` nor `RUST_LOG` is given
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` for structured output, anything else for human-readable
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

impl Config {
    /// Fill settings that have a dedicated environment variable
    fn apply_env_fallbacks(mut self) -> Self {
        if self.catalog.api_key.is_none() {
            self.catalog.api_key = std::env::var("GOOGLE_BOOKS_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty());
        }
        self
    }

    /// Check values that serde cannot check
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        url::Url::parse(&self.catalog.base_url).map_err(|e| {
            config::ConfigError::Message(format!(
                "catalog.base_url '{}' is not a valid URL: {}",
                self.catalog.base_url, e
            ))
        })?;

        if self.catalog.page_size == 0 || self.catalog.page_size > 40 {
            return Err(config::ConfigError::Message(format!(
                "catalog.page_size must be between 1 and 40, got {}",
                self.catalog.page_size
            )));
        }

        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Load configuration from a file, layered under environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment())
        .build()?;

    let config = settings.try_deserialize::<Config>()?.apply_env_fallbacks();
    config.validate()?;
    Ok(config)
}

/// Get the configuration from defaults and environment variables only
pub fn get_config() -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder().add_source(environment()).build()?;

    let config = settings.try_deserialize::<Config>()?.apply_env_fallbacks();
    config.validate()?;
    Ok(config)
}

/// Look for a configuration file in the default locations
///
/// Checks `./book-finder.toml` first, then `<config dir>/book-finder/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    default_config_path().filter(|p| p.is_file())
}

/// Path of the per-user configuration file, whether or not it exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("book-finder").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::NamedTempFile;

    // load_config reads the process environment, which one test mutates
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.catalog.base_url, GOOGLE_BOOKS_API_BASE);
        assert_eq!(config.catalog.page_size, 10);
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.http.connect_timeout_seconds, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        let _env = env_lock();
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
[catalog]
base_url = "http://localhost:8080/books/v1"
api_key = "file-key"

[logging]
level = "debug"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.catalog.base_url, "http://localhost:8080/books/v1");
        assert_eq!(config.catalog.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.catalog.page_size, 10);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_config_rejects_bad_url() {
        let _env = env_lock();
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[catalog]\nbase_url = \"not a url\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_load_config_rejects_page_size() {
        let _env = env_lock();
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[catalog]\npage_size = 0").unwrap();

        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let _env = env_lock();
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[http]\nuser_agent = \"from-file\"").unwrap();

        std::env::set_var("BOOK_FINDER_HTTP__USER_AGENT", "from-env");
        let config = load_config(file.path());
        std::env::remove_var("BOOK_FINDER_HTTP__USER_AGENT");

        assert_eq!(config.unwrap().http.user_agent.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("book-finder/config.toml"));
        }
    }
}
