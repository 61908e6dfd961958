//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/randwiki/config.toml)
//! 3. Environment variables (RANDWIKI_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "RANDWIKI";

/// Browsers give a page roughly this much local storage
const DEFAULT_STORAGE_QUOTA: u64 = 5 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for device-local data (collections, session cookie)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Base URL of the account backend (optional)
    ///
    /// Without it the tool always runs anonymously.
    #[serde(default)]
    pub api_url: Option<String>,

    /// MediaWiki API endpoint used to list category members
    #[serde(default = "default_wiki_api_url")]
    pub wiki_api_url: String,

    /// Origin prepended to `/wiki/<Title>` article paths
    #[serde(default = "default_wiki_base_url")]
    pub wiki_base_url: String,

    /// Sources used by `roll` when none are given
    #[serde(default = "default_sources")]
    pub default_sources: Vec<String>,

    /// Maximum size in bytes of one locally stored collection
    #[serde(default = "default_storage_quota")]
    pub storage_quota_bytes: u64,

    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_url: None,
            wiki_api_url: default_wiki_api_url(),
            wiki_base_url: default_wiki_base_url(),
            default_sources: default_sources(),
            storage_quota_bytes: DEFAULT_STORAGE_QUOTA,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (RANDWIKI_DATA_DIR, RANDWIKI_API_URL, ...)
    /// 2. Config file (~/.config/randwiki/config.toml or RANDWIKI_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // Empty string clears it
        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            self.api_url = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_WIKI_API_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.wiki_api_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with RANDWIKI_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("randwiki")
            .join("config.toml")
    }

    /// Directory holding the device-local collections
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("local_storage")
    }

    /// File holding the session cookie between runs
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session")
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("randwiki")
}

fn default_wiki_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_wiki_base_url() -> String {
    "https://en.wikipedia.org".to_string()
}

fn default_sources() -> Vec<String> {
    vec!["vital_technology".to_string()]
}

fn default_storage_quota() -> u64 {
    DEFAULT_STORAGE_QUOTA
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "RANDWIKI_DATA_DIR",
        "RANDWIKI_API_URL",
        "RANDWIKI_WIKI_API_URL",
        "RANDWIKI_LOG_FILE",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_url.is_none());
        assert!(config.data_dir.ends_with("randwiki"));
        assert_eq!(config.wiki_api_url, "https://en.wikipedia.org/w/api.php");
        assert_eq!(config.default_sources, vec!["vital_technology"]);
        assert_eq!(config.storage_quota_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.storage_dir().ends_with("local_storage"));
        assert!(config.session_path().ends_with("session"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("RANDWIKI_DATA_DIR", "/tmp/randwiki-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/randwiki-test"));
    }

    #[test]
    fn test_env_override_api_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(config.api_url.is_none());

        env::set_var("RANDWIKI_API_URL", "http://localhost:8000");
        config.apply_env_overrides();
        assert_eq!(config.api_url, Some("http://localhost:8000".to_string()));

        env::set_var("RANDWIKI_API_URL", "");
        config.apply_env_overrides();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_env_override_wiki_api_url_ignores_empty() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("RANDWIKI_WIKI_API_URL", "");
        config.apply_env_overrides();
        assert_eq!(config.wiki_api_url, default_wiki_api_url());

        env::set_var("RANDWIKI_WIKI_API_URL", "http://127.0.0.1:9000/w/api.php");
        config.apply_env_overrides();
        assert_eq!(config.wiki_api_url, "http://127.0.0.1:9000/w/api.php");
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/randwiki"),
            api_url: Some("https://wiki.example.com".to_string()),
            default_sources: vec!["vital_mathematics".to_string(), "my_links".to_string()],
            ..Config::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("api_url"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.api_url, config.api_url);
        assert_eq!(parsed.default_sources, config.default_sources);
    }

    #[test]
    fn test_load_from_str_fills_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            api_url = "https://wiki.example.com"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.api_url, Some("https://wiki.example.com".to_string()));
        assert_eq!(config.wiki_base_url, "https://en.wikipedia.org");
        assert_eq!(config.default_sources, vec!["vital_technology"]);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("RANDWIKI_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(config.api_url.is_none());
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            api_url: Some("http://localhost:3000".to_string()),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.api_url, config.api_url);
        assert_eq!(loaded.data_dir, config.data_dir);
    }
}
