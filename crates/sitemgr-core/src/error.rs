// ── Core error types ──
//
// User-facing errors from sitemgr-core. Consumers never see raw HTTP
// status codes or JSON parse failures directly: the refresher classifies
// every API error as either an authentication failure or a recoverable
// update failure, and `From<sitemgr_api::Error>` covers ad-hoc calls.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Refresh outcomes ─────────────────────────────────────────────
    /// The API key was rejected. Polling stops until new credentials arrive.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// A required fetch failed. The previous snapshot stays in place.
    #[error("Update failed while fetching {endpoint}: {message}")]
    UpdateFailed { endpoint: String, message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach Site Manager at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited by Site Manager -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Site not found: {identifier}")]
    SiteNotFound { identifier: String },

    #[error("Host not found: {identifier}")]
    HostNotFound { identifier: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` when only new credentials can fix this.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    /// Classify an API error raised while fetching `endpoint` during a
    /// refresh cycle.
    pub(crate) fn during_refresh(endpoint: &str, err: sitemgr_api::Error) -> Self {
        if err.is_auth_failure() {
            return Self::AuthenticationFailed {
                message: err.to_string(),
            };
        }
        Self::UpdateFailed {
            endpoint: endpoint.to_owned(),
            message: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<sitemgr_api::Error> for CoreError {
    fn from(err: sitemgr_api::Error) -> Self {
        match err {
            sitemgr_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            sitemgr_api::Error::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            sitemgr_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            sitemgr_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid base URL: {e}"),
            },
            sitemgr_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: msg,
            },
            sitemgr_api::Error::RateLimited { retry_after_secs } => {
                CoreError::RateLimited { retry_after_secs }
            }
            sitemgr_api::Error::Api {
                message,
                code,
                status,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            sitemgr_api::Error::Deserialization { message, .. } => CoreError::Api {
                message: format!("unexpected response: {message}"),
                code: None,
                status: None,
            },
        }
    }
}
