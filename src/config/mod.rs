//! Tool configuration.
//!
//! Read from `~/.config/eddy/config.toml` at startup. If the file doesn't
//! exist, a default one with comments is written. This is separate from the
//! settings blob: the blob holds feeds, items and filters, this file holds
//! how the tool itself runs.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fetcher::parallel::DEFAULT_WORKERS;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub fetch: FetchConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Settings file; defaults to `<data dir>/eddy/data.json`.
    pub settings_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub workers: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            workers: DEFAULT_WORKERS,
            user_agent: format!("eddy/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Refresh once as soon as `eddy watch` starts.
    pub refresh_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_on_start: true,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or the default path when `None`.
    ///
    /// A missing file is created with commented defaults. Missing fields use
    /// default values; an unparsable file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    /// `~/.config/eddy/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("eddy").join("config.toml"))
    }

    /// Where the settings blob lives.
    pub fn settings_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.storage.settings_path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        Ok(data_dir.join("eddy").join("data.json"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# Eddy configuration
#
# Feeds, filtered folders and read state are kept in the settings file,
# not here. Use the `eddy feed` and `eddy filter` commands to edit those.

[storage]
# Settings file location. Defaults to <data dir>/eddy/data.json
# settings_path = "/home/me/notes/.rss/data.json"

[fetch]
# Per-request timeout in seconds
timeout_secs = 10

# Feeds fetched at the same time during a refresh
workers = 4

# User-Agent header sent with every request
user_agent = "eddy/0.1.0"

[scheduler]
# Refresh immediately when `eddy watch` starts
refresh_on_start = true
"##
        .to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.fetch.timeout_secs, 10);
        assert_eq!(config.fetch.workers, 4);
        assert!(config.scheduler.refresh_on_start);
        assert!(config.storage.settings_path.is_none());
    }

    #[test]
    fn test_partial_config() {
        let content = r#"
[fetch]
workers = 1

[storage]
settings_path = "/tmp/eddy.json"
"#;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.fetch.workers, 1);
        assert_eq!(config.fetch.timeout_secs, 10);
        assert_eq!(
            config.settings_path().unwrap(),
            PathBuf::from("/tmp/eddy.json")
        );
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert!(config.scheduler.refresh_on_start);
        assert!(config.fetch.user_agent.starts_with("eddy/"));
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eddy").join("config.toml");

        let config = Config::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.fetch.workers, DEFAULT_WORKERS);

        // Second load reads the file it just wrote.
        let again = Config::load(Some(&path)).unwrap();
        assert_eq!(again.fetch.timeout_secs, 10);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[fetch\nworkers = ").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }
}
