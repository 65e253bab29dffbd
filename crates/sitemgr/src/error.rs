//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use sitemgr_config::ConfigError;
use sitemgr_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach Site Manager at {url}")]
    #[diagnostic(
        code(sitemgr::connection_failed),
        help(
            "Check network access to the API.\n\
             URL: {url}\n\
             Override with: --base-url <URL>"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Rate limited by Site Manager")]
    #[diagnostic(
        code(sitemgr::rate_limited),
        help("Wait {retry_after_secs}s before retrying.")
    )]
    RateLimited { retry_after_secs: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(sitemgr::auth_failed),
        help(
            "The API key was rejected. Create a new one at unifi.ui.com > API.\n\
             Run: sitemgr config set-key --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(sitemgr::no_credentials),
        help(
            "Configure credentials with: sitemgr config init\n\
             Or set the SITEMGR_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(sitemgr::not_found),
        help("Run: sitemgr {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Refresh ──────────────────────────────────────────────────────
    #[error("Refresh failed while fetching {endpoint}: {message}")]
    #[diagnostic(code(sitemgr::update_failed))]
    UpdateFailed { endpoint: String, message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(sitemgr::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sitemgr::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(sitemgr::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: sitemgr config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(sitemgr::config))]
    Config { message: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(sitemgr::timeout),
        help("Increase timeout with --timeout or retry later.")
    )]
    Timeout,

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::RateLimited { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to an authentication failure.
    pub fn for_profile(self, profile: &str) -> Self {
        match self {
            Self::AuthFailed { .. } => Self::AuthFailed {
                profile: profile.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { .. } => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::UpdateFailed { endpoint, message } => {
                CliError::UpdateFailed { endpoint, message }
            }

            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout => CliError::Timeout,

            CoreError::RateLimited { retry_after_secs } => CliError::RateLimited { retry_after_secs },

            CoreError::SiteNotFound { identifier } => CliError::NotFound {
                resource_type: "site".into(),
                identifier,
                list_command: "sites".into(),
            },

            CoreError::HostNotFound { identifier } => CliError::NotFound {
                resource_type: "host".into(),
                identifier,
                list_command: "hosts".into(),
            },

            CoreError::Api { message, code, .. } => CliError::ApiError {
                code: code.unwrap_or_default(),
                message,
            },

            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let auth: CliError = CoreError::AuthenticationFailed {
            message: "bad key".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let missing: CliError = CoreError::SiteNotFound {
            identifier: "S9".into(),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let no_key: CliError = ConfigError::NoCredentials {
            profile: "default".into(),
        }
        .into();
        assert_eq!(no_key.exit_code(), exit_code::AUTH);

        assert_eq!(CliError::from(CoreError::Timeout).exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn auth_failure_names_profile() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "bad key".into(),
        })
        .for_profile("home");
        assert!(matches!(err, CliError::AuthFailed { profile } if profile == "home"));
    }
}
