//! Config subcommand handlers.

use dialoguer::{Input, Password, Select};

use unified_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with plaintext API keys masked.
fn redacted(cfg: &Config) -> Config {
    let mut masked = cfg.clone();
    for profile in masked.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some("****".into());
        }
    }
    masked
}

/// Map a dialoguer failure into CliError.
fn prompt_err(e: dialoguer::Error) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask where the API key should live. Returns the plaintext key to put
/// in the profile, or `None` when it went to the keyring.
fn store_key(profile_name: &str) -> Result<Option<String>, CliError> {
    let key = Password::new()
        .with_prompt("API key")
        .interact()
        .map_err(prompt_err)?;
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the API key?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        unified_config::store_api_key(profile_name, &key)?;
        eprintln!("   API key stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(key))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init {
            name,
            api_key_env,
            set_default,
        } => {
            let mut cfg = unified_config::load_config_or_default();

            let profile_name = match name {
                Some(name) => name,
                None => Input::new()
                    .with_prompt("Profile name")
                    .default("default".into())
                    .interact_text()
                    .map_err(prompt_err)?,
            };
            let host = match global.host.clone() {
                Some(host) => host,
                None => Input::new()
                    .with_prompt("Console host")
                    .default("unifi".into())
                    .interact_text()
                    .map_err(prompt_err)?,
            };

            let api_key = match (&global.api_key, &api_key_env) {
                (Some(key), _) => Some(key.clone()),
                (None, Some(_)) => None,
                (None, None) => store_key(&profile_name)?,
            };

            let profile = Profile {
                host,
                api_key,
                api_key_env,
                keep_alive_interval: global
                    .keep_alive_interval
                    .map(|d| humantime::format_duration(d).to_string()),
                insecure: global.insecure,
            };
            cfg.profiles.insert(profile_name.clone(), profile);
            if set_default || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(profile_name.clone());
            }

            let path = unified_config::save_config(&cfg)?;
            eprintln!("Profile '{profile_name}' saved to {}", path.display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = unified_config::load_config_or_default();
            let text = toml::to_string_pretty(&redacted(&cfg))
                .map_err(|e| CliError::Render(e.to_string()))?;
            print!("{text}");
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", unified_config::config_path().display());
            Ok(())
        }

        ConfigCommand::SetKey { value } => {
            let cfg = unified_config::load_config_or_default();
            let profile_name = cfg.active_profile_name(global.profile.as_deref());
            let key = match value {
                Some(value) => value,
                None => Password::new()
                    .with_prompt(format!("API key for '{profile_name}'"))
                    .interact()
                    .map_err(prompt_err)?,
            };
            unified_config::store_api_key(&profile_name, &key)?;
            eprintln!("API key for '{profile_name}' stored in system keyring");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_plaintext_keys() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                host: "10.0.0.1".into(),
                api_key: Some("super-secret".into()),
                ..Profile::default()
            },
        );
        let masked = redacted(&cfg);
        assert_eq!(masked.profiles["home"].api_key.as_deref(), Some("****"));
        assert_eq!(cfg.profiles["home"].api_key.as_deref(), Some("super-secret"));
    }
}
