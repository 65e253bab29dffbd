//! Configuration for the sitemgr CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `sitemgr_api::TransportConfig` and
//! `sitemgr_core::CoordinatorConfig`. The CLI layers its flag overrides on
//! top of what this crate resolves.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sitemgr_api::{DEFAULT_BASE_URL, TlsMode, TransportConfig};
use sitemgr_core::{CoordinatorConfig, ProjectionOptions};

/// Keyring service name for stored API keys.
pub const KEYRING_SERVICE: &str = "sitemgr";

/// Prefix for environment overrides (`SITEMGR_DEFAULTS__TIMEOUT=10`).
pub const ENV_PREFIX: &str = "SITEMGR_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the active profile: explicit choice, else the configured default.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Polling period in seconds for `watch`.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    900
}

/// A named Site Manager account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (plaintext, prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Site ids to surface. Empty means every site.
    #[serde(default)]
    pub sites: Vec<String>,

    /// Override polling period (seconds).
    pub refresh_interval: Option<u64>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,

    /// Replacement name for an admin site literally named "default".
    pub default_site_alias: Option<String>,

    /// Extra CA certificate (PEM) for intercepting proxies.
    pub ca_cert: Option<PathBuf>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: None,
            sites: Vec::new(),
            refresh_interval: None,
            timeout: None,
            default_site_alias: None,
            ca_cert: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "sitemgr", "sitemgr").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sitemgr");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credentials ─────────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key"))
}

/// Resolve an API key from the credential chain (no CLI flag step).
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(secret) = keyring_entry(profile_name).and_then(|e| e.get_password()) {
        return Ok(SecretString::from(secret));
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store an API key for `profile_name` in the system keyring.
pub fn store_api_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(key)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Profile {
    /// Effective request timeout.
    pub fn timeout(&self, defaults: &Defaults) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(defaults.timeout))
    }

    /// Effective polling period.
    pub fn refresh_interval(&self, defaults: &Defaults) -> Duration {
        Duration::from_secs(self.refresh_interval.unwrap_or(defaults.refresh_interval))
    }

    /// Reject values the client or scheduler cannot work with.
    pub fn validate(&self, defaults: &Defaults) -> Result<(), ConfigError> {
        let url: url::Url = self
            .base_url
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "base_url".into(),
                reason: format!("invalid URL: {}", self.base_url),
            })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "base_url".into(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.timeout(defaults).is_zero() {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        if self.refresh_interval(defaults).is_zero() {
            return Err(ConfigError::Validation {
                field: "refresh_interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        Ok(())
    }

    pub fn transport(&self, defaults: &Defaults) -> TransportConfig {
        let tls = self
            .ca_cert
            .clone()
            .map_or(TlsMode::System, TlsMode::CustomCa);
        TransportConfig {
            tls,
            timeout: self.timeout(defaults),
        }
    }

    pub fn projection(&self) -> ProjectionOptions {
        ProjectionOptions {
            selected_sites: self.sites.iter().cloned().collect::<BTreeSet<_>>(),
            default_site_alias: self.default_site_alias.clone(),
        }
    }
}

/// Build a `CoordinatorConfig` from a profile.
pub fn profile_to_coordinator_config(profile: &Profile, defaults: &Defaults) -> CoordinatorConfig {
    CoordinatorConfig {
        interval: profile.refresh_interval(defaults),
        projection: profile.projection(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "home"

[defaults]
output = "json"
timeout = 10

[profiles.home]
api_key = "plain-key"
sites = ["S1", "S2"]
refresh_interval = 300
default_site_alias = "home"

[profiles.lab]
base_url = "http://127.0.0.1:8080"
api_key_env = "SITEMGR_TEST_UNSET_VARIABLE"
"#;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults, Defaults::default());
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn loads_profiles_with_defaults_filled_in() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.active_profile_name(None), "home");
        assert_eq!(config.active_profile_name(Some("lab")), "lab");
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.refresh_interval, 900);

        let home = config.profile("home").unwrap();
        assert_eq!(home.base_url, DEFAULT_BASE_URL);
        assert_eq!(home.timeout(&config.defaults), Duration::from_secs(10));
        assert_eq!(home.refresh_interval(&config.defaults), Duration::from_secs(300));

        let lab = config.profile("lab").unwrap();
        assert_eq!(lab.base_url, "http://127.0.0.1:8080");
        assert!(lab.sites.is_empty());
        assert!(matches!(
            config.profile("nope"),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                api_key_env: Some("MY_KEY".into()),
                sites: vec!["S1".into()],
                ..Profile::default()
            },
        );
        save_config_to(&config, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn projection_and_schedule_follow_profile() {
        let profile = Profile {
            sites: vec!["S2".into(), "S1".into()],
            refresh_interval: Some(60),
            default_site_alias: Some("home".into()),
            ..Profile::default()
        };
        let cc = profile_to_coordinator_config(&profile, &Defaults::default());

        assert_eq!(cc.interval, Duration::from_secs(60));
        assert_eq!(
            cc.projection.selected_sites.into_iter().collect::<Vec<_>>(),
            vec!["S1".to_owned(), "S2".to_owned()]
        );
        assert_eq!(cc.projection.default_site_alias.as_deref(), Some("home"));
    }

    #[test]
    fn plaintext_key_is_last_resort() {
        let profile = Profile {
            api_key: Some("plain-key".into()),
            api_key_env: Some("SITEMGR_TEST_UNSET_VARIABLE".into()),
            ..Profile::default()
        };
        let key = resolve_api_key(&profile, "sitemgr-test-no-keyring-entry").unwrap();
        assert_eq!(key.expose_secret(), "plain-key");
    }

    #[test]
    fn no_key_anywhere_is_an_error() {
        let err = resolve_api_key(&Profile::default(), "sitemgr-test-no-keyring-entry");
        assert!(matches!(err, Err(ConfigError::NoCredentials { .. })));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let defaults = Defaults::default();
        let bad_url = Profile {
            base_url: "not a url".into(),
            ..Profile::default()
        };
        assert!(matches!(
            bad_url.validate(&defaults),
            Err(ConfigError::Validation { field, .. }) if field == "base_url"
        ));

        let zero_timeout = Profile {
            timeout: Some(0),
            ..Profile::default()
        };
        assert!(matches!(
            zero_timeout.validate(&defaults),
            Err(ConfigError::Validation { field, .. }) if field == "timeout"
        ));

        assert!(Profile::default().validate(&defaults).is_ok());
    }
}
