//! Shared configuration for the `unified` CLI.
//!
//! TOML profiles, API key resolution (env + keyring + plaintext), and
//! translation to [`unified_api::ClientConfig`]. The CLI layers its
//! flag overrides on top of [`profile_to_client_config`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use unified_api::ClientConfig;

/// Keyring service name under which API keys are stored.
pub const KEYRING_SERVICE: &str = "unified";

/// Environment variable consulted last in the API key chain.
pub const API_KEY_ENV: &str = "UNIFI_API_KEY";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found (available: {available})")]
    ProfileNotFound { name: String, available: String },

    #[error("keyring access failed: {0}")]
    Keyring(#[from] keyring::Error),

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
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named console profiles.
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
    /// Pick the profile name: explicit flag, then `default_profile`, then `"default"`.
    pub fn active_profile_name(&self, flag: Option<&str>) -> String {
        flag.map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: if self.profiles.is_empty() {
                    "none".into()
                } else {
                    self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
                },
            })
    }
}

/// Values applied when a profile leaves a setting unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// Keep-alive ping interval in humantime notation ("30s", "2m").
    #[serde(default = "default_keep_alive")]
    pub keep_alive_interval: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: default_insecure(),
            keep_alive_interval: default_keep_alive(),
        }
    }
}

fn default_output() -> String {
    "json".into()
}
fn default_insecure() -> bool {
    true
}
fn default_keep_alive() -> String {
    "30s".into()
}

/// A named UniFi console.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Console hostname, optionally `host:port`.
    pub host: String,

    /// API key in plaintext. Prefer the keyring or `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Name of an environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive_interval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "unified", "unified").map_or_else(
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
    p.push("unified");
    p
}

// ── Loading and saving ──────────────────────────────────────────────

/// Load the config from the canonical path and `UNIFIED_*` env vars.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Merge defaults, the TOML file at `path` (if present), and env vars.
///
/// Nested keys use a double underscore: `UNIFIED_PROFILES__HOME__HOST`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("UNIFIED_").split("__"))
        .extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

/// Serialize `cfg` as TOML to `path`, creating parent directories.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── API key resolution ──────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/api-key"),
    )?)
}

/// Store an API key for `profile_name` in the system keyring.
pub fn store_api_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(key)?;
    Ok(())
}

/// Resolve the API key: `api_key_env` → keyring → plaintext → `UNIFI_API_KEY`.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |name| keyring_entry(name).ok()?.get_password().ok(),
    )
}

fn resolve_api_key_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let found = profile
        .api_key_env
        .as_deref()
        .and_then(&env)
        .or_else(|| keyring(profile_name))
        .or_else(|| profile.api_key.clone())
        .or_else(|| env(API_KEY_ENV));

    found
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

// ── Translation ─────────────────────────────────────────────────────

/// Parse a humantime duration such as `"45s"` or `"2m"`.
pub fn parse_keep_alive(value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value).map_err(|e| ConfigError::Validation {
        field: "keep_alive_interval".into(),
        reason: format!("'{value}': {e}"),
    })
}

/// Build a `ClientConfig` from a profile, falling back to `defaults`.
///
/// No flag overrides are applied and the result is not yet validated;
/// `unified_api::Client::new` does that.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let api_key = resolve_api_key(profile, profile_name)?;
    let keep_alive = parse_keep_alive(
        profile
            .keep_alive_interval
            .as_deref()
            .unwrap_or(&defaults.keep_alive_interval),
    )?;

    let mut config = ClientConfig::new(api_key.expose_secret())
        .with_host(profile.host.clone())
        .with_keep_alive(keep_alive);
    config.insecure_skip_verify = profile.insecure.unwrap_or(defaults.insecure);
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    fn profile(host: &str) -> Profile {
        Profile {
            host: host.into(),
            ..Profile::default()
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.keep_alive_interval, "30s");
        assert!(cfg.defaults.insecure);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn saved_profile_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                host: "192.168.1.1".into(),
                api_key_env: Some("HOME_UNIFI_KEY".into()),
                keep_alive_interval: Some("45s".into()),
                ..Profile::default()
            },
        );
        save_config_to(&path, &cfg).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[profiles.home]"));
        assert!(!text.contains("api_key ="), "unset key is not written");

        let loaded = load_config_from(&path).unwrap();
        let home = loaded.profile("home").unwrap();
        assert_eq!(home.host, "192.168.1.1");
        assert_eq!(home.api_key_env.as_deref(), Some("HOME_UNIFI_KEY"));
        assert_eq!(home.keep_alive_interval.as_deref(), Some("45s"));
    }

    #[test]
    fn unknown_profile_lists_available() {
        let mut cfg = Config::default();
        cfg.profiles.insert("b".into(), profile("b"));
        cfg.profiles.insert("a".into(), profile("a"));
        match cfg.profile("c") {
            Err(ConfigError::ProfileNotFound { name, available }) => {
                assert_eq!(name, "c");
                assert_eq!(available, "a, b");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn active_profile_prefers_flag() {
        let cfg = Config {
            default_profile: Some("office".into()),
            ..Config::default()
        };
        assert_eq!(cfg.active_profile_name(Some("lab")), "lab");
        assert_eq!(cfg.active_profile_name(None), "office");
    }

    #[test]
    fn api_key_chain_order() {
        let mut p = Profile {
            host: "h".into(),
            api_key: Some("plain".into()),
            api_key_env: Some("MY_KEY".into()),
            ..Profile::default()
        };
        let env = |name: &str| match name {
            "MY_KEY" => Some("from-env".to_owned()),
            API_KEY_ENV => Some("fallback".to_owned()),
            _ => None,
        };
        let ring = |_: &str| Some("from-keyring".to_owned());
        let expose = |s: SecretString| s.expose_secret().to_owned();

        let key = resolve_api_key_with(&p, "x", env, ring).unwrap();
        assert_eq!(expose(key), "from-env");

        let only_fallback = |name: &str| (name == API_KEY_ENV).then(|| "fallback".to_owned());
        let key = resolve_api_key_with(&p, "x", only_fallback, ring).unwrap();
        assert_eq!(expose(key), "from-keyring");

        let key = resolve_api_key_with(&p, "x", no_env, |_: &str| None).unwrap();
        assert_eq!(expose(key), "plain");

        p.api_key = None;
        let key = resolve_api_key_with(&p, "x", env, |_: &str| None).unwrap();
        assert_eq!(expose(key), "from-env");

        p.api_key_env = None;
        let key = resolve_api_key_with(&p, "x", env, |_: &str| None).unwrap();
        assert_eq!(expose(key), "fallback");
    }

    #[test]
    fn missing_api_key_is_reported() {
        let err = resolve_api_key_with(&profile("h"), "lab", no_env, |_: &str| None).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { profile } if profile == "lab"));
    }

    #[test]
    fn keep_alive_parses_humantime() {
        assert_eq!(parse_keep_alive("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_keep_alive("1500ms").unwrap(), Duration::from_millis(1500));
        assert!(matches!(
            parse_keep_alive("soon"),
            Err(ConfigError::Validation { .. })
        ));
    }
}
