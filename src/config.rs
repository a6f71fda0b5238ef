//! Application-level configuration loading.

use std::{env, fmt, fs, io::ErrorKind, path::PathBuf, str::FromStr};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the binary looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/scoresheet.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCORESHEET_CONFIG_PATH";
/// Environment variable that overrides the configured storage backend.
const STORAGE_ENV: &str = "SCORESHEET_STORAGE";

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local store, lost on exit.
    #[default]
    Memory,
    /// MongoDB, configured through `MONGO_URI` / `MONGO_DB`.
    Mongo,
    /// CouchDB, configured through `COUCH_BASE_URL` / `COUCH_DB`.
    Couch,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Mongo => "mongo",
            StorageBackend::Couch => "couch",
        })
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "couch" | "couchdb" => Ok(StorageBackend::Couch),
            other => Err(format!("unknown storage backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Immutable runtime configuration.
pub struct AppConfig {
    /// Where games and lists are kept.
    pub storage: StorageBackend,
    /// Write the demo games into an empty store at startup.
    pub seed_demo_games: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            seed_demo_games: true,
        }
    }
}

impl AppConfig {
    /// Load the configuration from disk, falling back to defaults, then apply environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), storage = %config.storage, "loaded config");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_storage_override(env::var(STORAGE_ENV).ok().as_deref())
    }

    fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }

    fn with_storage_override(mut self, raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
            return self;
        };
        match raw.parse() {
            Ok(storage) => self.storage = storage,
            Err(err) => warn!(
                var = STORAGE_ENV,
                error = %err,
                storage = %self.storage,
                "ignoring storage override"
            ),
        }
        self
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.seed_demo_games);
        assert_eq!(config.storage, StorageBackend::Memory);
    }

    #[test]
    fn parses_backend_and_seed_flag() {
        let config =
            AppConfig::from_json(r#"{"storage": "couch", "seed_demo_games": false}"#).unwrap();
        assert_eq!(config.storage, StorageBackend::Couch);
        assert!(!config.seed_demo_games);
        assert!(AppConfig::from_json(r#"{"storage": "sqlite"}"#).is_err());
    }

    #[test]
    fn environment_override() {
        let config = AppConfig::default();
        assert_eq!(
            config.clone().with_storage_override(Some("MongoDB")).storage,
            StorageBackend::Mongo
        );
        assert_eq!(
            config.clone().with_storage_override(Some("bogus")).storage,
            StorageBackend::Memory
        );
        assert_eq!(config.with_storage_override(None).storage, StorageBackend::Memory);
    }
}
