//! CLI configuration: thin wrapper around `sitemgr_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--base-url,
//! --api-key, --timeout, --site) on top of the active profile.

use std::time::Duration;

use secrecy::SecretString;

use sitemgr_api::{SiteManagerClient, TransportConfig};
use sitemgr_core::{CoordinatorConfig, Refresher};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use sitemgr_config::{Config, Defaults, Profile, config_path, save_config};

/// Everything a command needs to talk to the API.
pub struct Resolved {
    pub profile_name: String,
    pub client: SiteManagerClient,
    pub coordinator: CoordinatorConfig,
}

impl Resolved {
    pub fn refresher(&self) -> Refresher {
        Refresher::new(self.client.clone())
    }
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    sitemgr_config::load_config().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "config not loaded, using defaults");
        Config::default()
    })
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Build client and coordinator settings from config + CLI overrides.
///
/// Without a matching profile, flags and `SITEMGR_*` env vars alone must
/// supply the API key.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
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
        None => Profile::default(),
    };
    resolve_profile(profile, &profile_name, &cfg.defaults, global)
}

/// Apply flag overrides to `profile` and build the client.
pub fn resolve_profile(
    mut profile: Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<Resolved, CliError> {
    // 1. Base URL (flag > env > profile)
    if let Some(ref url) = global.base_url {
        profile.base_url.clone_from(url);
    }
    // 2. Timeout
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    // 3. Site selection
    if !global.sites.is_empty() {
        profile.sites.clone_from(&global.sites);
    }
    profile.validate(defaults)?;

    // 4. API key (flag > profile chain)
    let api_key = resolve_api_key_with_flag(&profile, profile_name, global)?;

    let transport: TransportConfig = profile.transport(defaults);
    let client = SiteManagerClient::from_api_key(&profile.base_url, &api_key, &transport)
        .map_err(sitemgr_core::CoreError::from)?;

    Ok(Resolved {
        profile_name: profile_name.to_owned(),
        client,
        coordinator: sitemgr_config::profile_to_coordinator_config(&profile, defaults),
    })
}

/// Override the polling period for `watch --interval`.
pub fn with_interval(mut resolved: Resolved, secs: Option<u64>) -> Result<Resolved, CliError> {
    if let Some(secs) = secs {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        resolved.coordinator.interval = Duration::from_secs(secs);
    }
    Ok(resolved)
}

/// Resolve API key with CLI flag override, then fall through to shared resolution.
fn resolve_api_key_with_flag(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    if let Some(ref key) = global.api_key {
        return Ok(SecretString::from(key.clone()));
    }
    Ok(sitemgr_config::resolve_api_key(profile, profile_name)?)
}
