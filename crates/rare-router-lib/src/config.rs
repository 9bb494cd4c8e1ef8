//! Router configuration (`.config.json`) and data directory resolution.

use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::CacheSettings;
use crate::directory::{EdsmClient, DEFAULT_EDSM_BASE_URL, DEFAULT_USER_AGENT};
use crate::error::{Error, Result};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "RARE_ROUTER_DATA_DIR";

/// Environment variable pointing at a config file.
pub const CONFIG_PATH_ENV: &str = "RARE_ROUTER_CONFIG";

/// Environment variable supplying the EDSM user agent.
pub const USER_AGENT_ENV: &str = "EDSM_USER_AGENT";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".config.json";

/// Rare goods catalog file name inside the data directory.
pub const CATALOG_FILE: &str = "rares.json";
pub const CURATED_LEGALITY_FILE: &str = "curatedLegality.json";
pub const CURATED_PRICES_FILE: &str = "curatedPrices.json";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("net", "rare-router", "rare-router"));

/// User configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouterConfig {
    pub data_dir: Option<PathBuf>,
    pub edsm_user_agent: Option<String>,
    pub edsm_base_url: Option<String>,
    pub api_keys: HashMap<String, String>,
    pub lookup_timeout_secs: u64,
    pub search_ttl_secs: u64,
    pub persist_debounce_secs: u64,
    pub max_concurrency: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            edsm_user_agent: None,
            edsm_base_url: None,
            api_keys: HashMap::new(),
            lookup_timeout_secs: 10,
            search_ttl_secs: 15 * 60,
            persist_debounce_secs: 5,
            max_concurrency: 16,
        }
    }
}

impl RouterConfig {
    /// Load configuration from `explicit`, `RARE_ROUTER_CONFIG`,
    /// `./.config.json` or the platform config directory, in that order.
    ///
    /// A missing file yields defaults. A file that exists but cannot be
    /// parsed is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match config_path(explicit, env::var_os(CONFIG_PATH_ENV)) {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a specific config file; a missing file yields defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents).map_err(|err| Error::ConfigInvalid {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        config.validate(path)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |message: &str| Error::ConfigInvalid {
            path: path.to_path_buf(),
            message: message.to_string(),
        };
        if self.lookup_timeout_secs == 0 {
            return Err(invalid("lookupTimeoutSecs must be greater than zero"));
        }
        if self.max_concurrency == 0 {
            return Err(invalid("maxConcurrency must be greater than zero"));
        }
        Ok(())
    }

    /// Data directory from the CLI flag, `RARE_ROUTER_DATA_DIR`, the config
    /// file or the platform data directory, in that order.
    pub fn resolve_data_dir(&self, cli: Option<&Path>) -> Result<PathBuf> {
        self.resolve_data_dir_with(cli, env::var_os(DATA_DIR_ENV))
    }

    fn resolve_data_dir_with(
        &self,
        cli: Option<&Path>,
        env_dir: Option<OsString>,
    ) -> Result<PathBuf> {
        if let Some(path) = cli {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = env_dir.filter(|value| !value.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.data_dir {
            return Ok(path.clone());
        }
        PROJECT_DIRS
            .as_ref()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(Error::DataDirUnavailable)
    }

    /// User agent sent to EDSM.
    pub fn user_agent(&self) -> String {
        self.edsm_user_agent
            .clone()
            .filter(|agent| !agent.trim().is_empty())
            .or_else(|| env::var(USER_AGENT_ENV).ok().filter(|agent| !agent.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    /// API key for a named service: config entry first (name compared
    /// case-insensitively), then `<NAME>_API_KEY`.
    pub fn api_key(&self, name: &str) -> Option<String> {
        self.api_keys
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
            .or_else(|| env::var(api_key_env(name)).ok())
            .filter(|value| !value.is_empty())
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    /// Cache settings for the standard files inside `data_dir`.
    pub fn cache_settings(&self, data_dir: &Path) -> CacheSettings {
        CacheSettings {
            search_ttl: Duration::from_secs(self.search_ttl_secs),
            persist_debounce: Duration::from_secs(self.persist_debounce_secs),
            lookup_timeout: self.lookup_timeout(),
            ..CacheSettings::in_dir(data_dir)
        }
    }

    /// Live EDSM client honouring the configured base URL, user agent and
    /// timeout.
    pub fn edsm_client(&self) -> Result<EdsmClient> {
        let base_url = self
            .edsm_base_url
            .as_deref()
            .unwrap_or(DEFAULT_EDSM_BASE_URL);
        EdsmClient::new(base_url, &self.user_agent(), self.lookup_timeout())
    }
}

fn config_path(explicit: Option<&Path>, env_path: Option<OsString>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_path.filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    PROJECT_DIRS
        .as_ref()
        .map(|dirs| dirs.config_dir().join("config.json"))
}

/// `edsm` -> `EDSM_API_KEY`, `my-service` -> `MY_SERVICE_API_KEY`.
fn api_key_env(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}_API_KEY")
}

/// Catalog path inside `data_dir`.
pub fn catalog_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CATALOG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch process environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = RouterConfig::from_path(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.lookup_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".config.json");
        fs::write(
            &path,
            r#"{"dataDir": "/srv/rares", "edsmUserAgent": "tester/1.0", "searchTtlSecs": 60}"#,
        )
        .expect("write");

        let config = RouterConfig::from_path(&path).expect("load");
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/rares")));
        assert_eq!(config.user_agent(), "tester/1.0");
        assert_eq!(config.search_ttl_secs, 60);
        assert_eq!(config.max_concurrency, 16);

        let settings = config.cache_settings(Path::new("/srv/rares"));
        assert_eq!(settings.search_ttl, Duration::from_secs(60));
        assert_eq!(settings.lookup_timeout, Duration::from_secs(10));
        assert_eq!(
            settings.snapshot_path,
            Some(PathBuf::from("/srv/rares/systemCache.json"))
        );
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".config.json");
        fs::write(&path, "{ \"dataDir\": 42 }").expect("write");
        let err = RouterConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }), "got {err:?}");
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".config.json");
        fs::write(&path, r#"{"maxConcurrency": 0}"#).expect("write");
        assert!(RouterConfig::from_path(&path).is_err());
    }

    #[test]
    fn data_dir_precedence() {
        let config = RouterConfig {
            data_dir: Some(PathBuf::from("/from/config")),
            ..RouterConfig::default()
        };

        let cli = config
            .resolve_data_dir_with(Some(Path::new("/from/cli")), Some("/from/env".into()))
            .expect("cli");
        assert_eq!(cli, PathBuf::from("/from/cli"));

        let env_dir = config
            .resolve_data_dir_with(None, Some("/from/env".into()))
            .expect("env");
        assert_eq!(env_dir, PathBuf::from("/from/env"));

        let file = config.resolve_data_dir_with(None, None).expect("config");
        assert_eq!(file, PathBuf::from("/from/config"));
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = config_path(Some(Path::new("custom.json")), Some("env.json".into()));
        assert_eq!(path, Some(PathBuf::from("custom.json")));
        let path = config_path(None, Some("env.json".into()));
        assert_eq!(path, Some(PathBuf::from("env.json")));
    }

    #[test]
    fn api_key_prefers_file_then_env() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut config = RouterConfig::default();
        config
            .api_keys
            .insert("Inara".to_string(), "from-file".to_string());

        env::set_var("INARA_API_KEY", "from-env");
        env::set_var("EDDN_RELAY_API_KEY", "relay-env");
        assert_eq!(config.api_key("inara").as_deref(), Some("from-file"));
        assert_eq!(config.api_key("eddn-relay").as_deref(), Some("relay-env"));
        env::remove_var("INARA_API_KEY");
        env::remove_var("EDDN_RELAY_API_KEY");

        assert_eq!(config.api_key("unknown-service"), None);
    }

    #[test]
    fn user_agent_falls_back_to_env_then_default() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let config = RouterConfig::default();

        env::set_var(USER_AGENT_ENV, "env-agent/2.0");
        assert_eq!(config.user_agent(), "env-agent/2.0");
        env::remove_var(USER_AGENT_ENV);

        assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
    }
}
