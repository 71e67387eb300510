//! CLI configuration: thin wrapper around `unified_config`.
//!
//! Adds the flag overrides from `GlobalOpts` (--host, --api-key,
//! --keep-alive-interval, --insecure, --plaintext) on top of the profile.

use clap::ValueEnum;
use tracing::debug;

use unified_api::{ClientConfig, Scheme};
use unified_config::{API_KEY_ENV, Config, ConfigError, parse_keep_alive, profile_to_client_config};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Output format: flag, then the config default, then JSON.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Json)
}

/// Build a `ClientConfig` from the active profile and CLI overrides.
///
/// Without a matching profile, `--host` plus an API key from `--api-key`
/// or `UNIFI_API_KEY` is enough.
pub fn build_client_config(global: &GlobalOpts, cfg: &Config) -> Result<ClientConfig, CliError> {
    let name = cfg.active_profile_name(global.profile.as_deref());
    if global.profile.is_some() {
        cfg.profile(&name)?;
    }
    let profile = cfg.profiles.get(&name);

    let mut config = match profile {
        Some(profile) if global.api_key.is_none() => {
            profile_to_client_config(profile, &name, &cfg.defaults)?
        }
        _ => {
            let host = global
                .host
                .clone()
                .or_else(|| profile.map(|p| p.host.clone()))
                .ok_or_else(|| CliError::NoConfig {
                    path: unified_config::config_path().display().to_string(),
                })?;
            let api_key = global
                .api_key
                .clone()
                .or_else(|| std::env::var(API_KEY_ENV).ok())
                .ok_or_else(|| ConfigError::NoCredentials {
                    profile: name.clone(),
                })?;
            let interval = profile
                .and_then(|p| p.keep_alive_interval.as_deref())
                .unwrap_or(&cfg.defaults.keep_alive_interval);

            let mut config = ClientConfig::new(api_key)
                .with_host(host)
                .with_keep_alive(parse_keep_alive(interval)?);
            config.insecure_skip_verify = profile
                .and_then(|p| p.insecure)
                .unwrap_or(cfg.defaults.insecure);
            config
        }
    };

    if let Some(ref host) = global.host {
        config.host_name.clone_from(host);
    }
    if let Some(interval) = global.keep_alive_interval {
        config.websocket_keep_alive_interval = interval;
    }
    if let Some(insecure) = global.insecure {
        config.insecure_skip_verify = insecure;
    }
    if global.plaintext {
        config.scheme = Scheme::Plaintext;
    }

    debug!(
        profile = %name,
        host = %config.host_name,
        keep_alive = ?config.websocket_keep_alive_interval,
        insecure = config.insecure_skip_verify,
        "resolved client config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use clap::Parser;
    use secrecy::ExposeSecret;
    use unified_config::Profile;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["unified"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["network", "info"]);
        Cli::parse_from(argv).global
    }

    fn config_with_profile() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                host: "10.0.0.1".into(),
                api_key: Some("profile-key".into()),
                keep_alive_interval: Some("45s".into()),
                insecure: Some(false),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let cfg = config_with_profile();
        let config = build_client_config(
            &global(&[
                "--host",
                "10.0.0.9:8443",
                "--keep-alive-interval",
                "2m",
                "--insecure",
                "true",
                "--plaintext",
            ]),
            &cfg,
        )
        .unwrap();

        assert_eq!(config.host_name, "10.0.0.9:8443");
        assert_eq!(config.websocket_keep_alive_interval, Duration::from_secs(120));
        assert!(config.insecure_skip_verify);
        assert_eq!(config.scheme, Scheme::Plaintext);
    }

    #[test]
    fn api_key_flag_beats_profile() {
        let cfg = config_with_profile();
        let config = build_client_config(&global(&["--api-key", "flag-key"]), &cfg).unwrap();
        assert_eq!(config.api_key.expose_secret(), "flag-key");
        assert_eq!(config.host_name, "10.0.0.1");
        assert_eq!(config.websocket_keep_alive_interval, Duration::from_secs(45));
        assert!(!config.insecure_skip_verify);
    }

    #[test]
    fn flags_alone_are_enough() {
        let config = build_client_config(
            &global(&["--host", "unifi.lan", "--api-key", "k"]),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(config.host_name, "unifi.lan");
        assert_eq!(config.websocket_keep_alive_interval, Duration::from_secs(30));
        assert!(config.insecure_skip_verify);
    }

    #[test]
    fn missing_host_reports_no_config() {
        let err = build_client_config(&global(&["--api-key", "k"]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let err = build_client_config(&global(&["--profile", "lab"]), &config_with_profile())
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn output_falls_back_to_config_default() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Yaml);
        assert_eq!(
            output_format(&global(&["-o", "json-compact"]), &cfg),
            OutputFormat::JsonCompact
        );
    }
}
