//! Config subcommand handlers.

use std::collections::BTreeMap;

use dialoguer::{Input, MultiSelect, Select};
use secrecy::SecretString;

use sitemgr_api::SiteManagerClient;
use sitemgr_core::{CoreError, Refresher};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output::Printer;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with plaintext keys masked, for structured output.
fn redact(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(REDACTED.into());
        }
    }
    cfg
}

/// Format config for display as TOML, masking secrets.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "refresh_interval = {}", cfg.defaults.refresh_interval);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "base_url = \"{}\"", p.base_url);
        if p.api_key.is_some() {
            let _ = writeln!(out, "api_key = \"{REDACTED}\"");
        }
        if let Some(ref env) = p.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        if !p.sites.is_empty() {
            let quoted: Vec<_> = p.sites.iter().map(|s| format!("\"{s}\"")).collect();
            let _ = writeln!(out, "sites = [{}]", quoted.join(", "));
        }
        if let Some(interval) = p.refresh_interval {
            let _ = writeln!(out, "refresh_interval = {interval}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref alias) = p.default_site_alias {
            let _ = writeln!(out, "default_site_alias = \"{alias}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
    }

    out.trim_end().to_owned()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_api_key() -> Result<String, CliError> {
    let key = rpassword::prompt_password("API key: ").map_err(prompt_err)?;
    if key.trim().is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }
    Ok(key.trim().to_owned())
}

/// Offer keyring storage. Returns `Some(key)` if the user chose plaintext.
fn prompt_key_storage(profile_name: &str, key: &str) -> Result<Option<String>, CliError> {
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
        sitemgr_config::store_api_key(profile_name, key)?;
        eprintln!("   ✓ API key stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(key.to_owned()))
    }
}

/// Fetch `{site_id -> "{host}-site"}` with the candidate key.
///
/// An auth failure aborts the wizard; anything else falls back to manual
/// entry.
async fn discover_sites(
    profile: &Profile,
    defaults: &Defaults,
    key: &str,
) -> Result<Option<BTreeMap<String, String>>, CliError> {
    let key = SecretString::from(key.to_owned());
    let client =
        SiteManagerClient::from_api_key(&profile.base_url, &key, &profile.transport(defaults))
            .map_err(CoreError::from)?;
    match Refresher::new(client).refresh().await {
        Ok(snapshot) => Ok(Some(snapshot.discover_sites())),
        Err(e @ CoreError::AuthenticationFailed { .. }) => Err(e.into()),
        Err(e) => {
            eprintln!("   ! Could not list sites: {e}");
            Ok(None)
        }
    }
}

/// Let the user pick from discovered sites. Nothing picked means all sites.
fn prompt_site_selection(found: &BTreeMap<String, String>) -> Result<Vec<String>, CliError> {
    let labels: Vec<String> = found
        .iter()
        .map(|(id, name)| format!("{name} ({id})"))
        .collect();
    let picked = MultiSelect::new()
        .with_prompt("Sites to track (space to toggle, none for all)")
        .items(&labels)
        .interact()
        .map_err(prompt_err)?;
    let ids: Vec<&String> = found.keys().collect();
    Ok(picked.into_iter().filter_map(|i| ids.get(i).map(|id| (*id).clone())).collect())
}

fn parse_secs(field: &str, value: &str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a number (seconds)".into(),
    })
}

/// Apply `key = value` to a profile.
fn set_value(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "base_url" | "base-url" => profile.base_url = value,
        "api_key" | "api-key" => profile.api_key = Some(value),
        "api_key_env" | "api-key-env" => profile.api_key_env = Some(value),
        "sites" => {
            profile.sites = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
        }
        "refresh_interval" | "refresh-interval" => {
            profile.refresh_interval = Some(parse_secs("refresh_interval", &value)?);
        }
        "timeout" => profile.timeout = Some(parse_secs("timeout", &value)?),
        "default_site_alias" | "default-site-alias" => {
            profile.default_site_alias = Some(value).filter(|v| !v.is_empty());
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: base_url, api_key, api_key_env, \
                     sites, refresh_interval, timeout, default_site_alias, ca_cert"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("✨ sitemgr configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let base_url: String = Input::new()
                .with_prompt("API base URL")
                .default(Profile::default().base_url)
                .interact_text()
                .map_err(prompt_err)?;

            let mut cfg = config::load_config_or_default();
            let mut profile = Profile {
                base_url,
                ..Profile::default()
            };
            profile.validate(&cfg.defaults)?;

            let key = prompt_api_key()?;
            eprintln!("   Checking key against {}...", profile.base_url);
            match discover_sites(&profile, &cfg.defaults, &key)
                .await
                .map_err(|e| e.for_profile(&profile_name))?
            {
                Some(found) if !found.is_empty() => {
                    profile.sites = prompt_site_selection(&found)?;
                }
                Some(_) => eprintln!("   No sites visible to this key yet"),
                None => {
                    let sites: String = Input::new()
                        .with_prompt("Site ids to track (comma-separated, empty for all)")
                        .allow_empty(true)
                        .interact_text()
                        .map_err(prompt_err)?;
                    set_value(&mut profile, "sites", sites)?;
                }
            }
            profile.api_key = prompt_key_storage(&profile_name, &key)?;

            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: sitemgr refresh");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redact(&config::load_config_or_default());
            Printer::new(global).single(&cfg, format_config_redacted, |_| {
                "config".into()
            });
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let defaults: Defaults = cfg.defaults.clone();

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_value(profile, &key, value)?;
            profile.validate(&defaults)?;

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── SetKey ──────────────────────────────────────────────────
        ConfigCommand::SetKey { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            let key = prompt_api_key()?;
            sitemgr_config::store_api_key(&profile_name, &key)?;
            eprintln!("✓ API key stored in system keyring for profile '{profile_name}'");
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            Printer::new(global).line(&config::config_path().display().to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sites_are_split_and_trimmed() {
        let mut profile = Profile::default();
        set_value(&mut profile, "sites", "S1, S2,,".into()).unwrap();
        assert_eq!(profile.sites, ["S1", "S2"]);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut profile = Profile::default();
        let err = set_value(&mut profile, "controller", "x".into()).unwrap_err();
        assert!(matches!(err, CliError::Validation { field, .. } if field == "controller"));
    }

    #[test]
    fn show_masks_plaintext_key() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                api_key: Some("secret-key".into()),
                sites: vec!["S1".into()],
                ..Profile::default()
            },
        );
        let shown = format_config_redacted(&redact(&cfg));
        assert!(shown.contains("[profiles.home]"));
        assert!(shown.contains("api_key = \"****\""));
        assert!(shown.contains("sites = [\"S1\"]"));
        assert!(!shown.contains("secret-key"));
    }
}
