//! Shared configuration for the poolside CLI.
//!
//! TOML profiles, credential resolution (keyring + env + plaintext),
//! and translation to `poolside_core::AccountConfig`. The core crate
//! never reads config files -- this crate is the only place that does.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use poolside_core::AccountConfig;
use poolside_core::config::{DEFAULT_API_RATE_LIMIT, DEFAULT_UPDATE_INTERVAL_MINUTES};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

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
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
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

/// A named account profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Fluidra account email.
    pub username: Option<String>,

    /// Account password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Scheduled poll interval in minutes (5-120).
    pub update_interval: Option<u64>,

    /// Client-side request budget per minute (10-120).
    pub api_rate_limit: Option<u32>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// API base URL override (for staging or regional gateways).
    pub base_url: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("rs", "poolside", "poolside").map_or_else(
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
    p.push("poolside");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit path (tests use this).
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("POOLSIDE_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Save to an explicit path (tests use this).
pub fn save_config_to(cfg: &Config, path: &std::path::Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the account password from the credential chain:
/// profile env var, then system keyring, then plaintext config.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("poolside", &format!("{profile_name}/password")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store the account password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new("poolside", &format!("{profile_name}/password")).map_err(
        |e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        },
    )?;
    entry
        .set_password(password)
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Profile → AccountConfig ─────────────────────────────────────────

/// Build an `AccountConfig` from a profile.
///
/// Interval and rate-limit values pass through as configured; the core
/// clamps them to their documented bounds on session construction.
pub fn profile_to_account_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<AccountConfig, ConfigError> {
    let username = profile
        .username
        .clone()
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let password = resolve_password(profile, profile_name)?;

    let mut config = AccountConfig::new(username, password);
    config.update_interval = Duration::from_secs(
        profile
            .update_interval
            .unwrap_or(DEFAULT_UPDATE_INTERVAL_MINUTES)
            * 60,
    );
    config.api_rate_limit = profile.api_rate_limit.unwrap_or(DEFAULT_API_RATE_LIMIT);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(default_timeout()));

    if let Some(ref base) = profile.base_url {
        config.base_url = Some(base.parse().map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {base}"),
        })?);
    }

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            username: Some("pool-owner@example.com".into()),
            password: Some("hunter2".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn plaintext_password_resolves_last_in_chain() {
        let cfg = profile_to_account_config(&profile(), "default").unwrap();
        assert_eq!(cfg.username, "pool-owner@example.com");
    }

    #[test]
    fn missing_username_is_an_error() {
        let p = Profile {
            username: None,
            ..profile()
        };
        assert!(matches!(
            profile_to_account_config(&p, "default"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn missing_password_is_an_error() {
        let p = Profile {
            password: None,
            ..profile()
        };
        assert!(matches!(
            profile_to_account_config(&p, "default"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn defaults_flow_into_account_config() {
        let cfg = profile_to_account_config(&profile(), "default").unwrap();
        assert_eq!(cfg.update_interval, Duration::from_secs(30 * 60));
        assert_eq!(cfg.api_rate_limit, 60);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn profile_values_override_defaults() {
        let p = Profile {
            update_interval: Some(15),
            api_rate_limit: Some(90),
            timeout: Some(10),
            ..profile()
        };
        let cfg = profile_to_account_config(&p, "default").unwrap();
        assert_eq!(cfg.update_interval, Duration::from_secs(15 * 60));
        assert_eq!(cfg.api_rate_limit, 90);
        assert_eq!(cfg.timeout, Duration::from_secs(10));
    }

    #[test]
    fn invalid_base_url_is_a_validation_error() {
        let p = Profile {
            base_url: Some("not a url".into()),
            ..profile()
        };
        assert!(matches!(
            profile_to_account_config(&p, "default"),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("home".into(), profile());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.default_profile.as_deref(), Some("default"));
        assert_eq!(
            loaded.profiles["home"].username.as_deref(),
            Some("pool-owner@example.com")
        );
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert!(loaded.profiles.is_empty());
        assert_eq!(loaded.defaults.output, "table");
    }
}
