use thiserror::Error;

/// Top-level error type for the `sitemgr-api` crate.
///
/// Covers every failure mode of the Site Manager surface: credential
/// rejection, transport, HTTP status errors, and payload decoding.
/// `sitemgr-core` classifies these into fatal and recoverable outcomes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API key could not be turned into a header value.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The API key was rejected (HTTP 401).
    #[error("Invalid API key")]
    InvalidApiKey,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or client-builder error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Cloud ───────────────────────────────────────────────────────
    /// Rate limited by the cloud API. Includes retry-after in seconds.
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Non-success HTTP status with whatever message the API returned.
    #[error("Site Manager API error (HTTP {status}): {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: u16,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the credential was rejected and only a new
    /// API key can fix it.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::InvalidApiKey | Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the response arrived but could not be decoded.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Deserialization { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_errors() {
        let bad_request = Error::Api {
            message: "Bad Request".into(),
            code: None,
            status: 400,
        };
        assert!(!bad_request.is_transient());
        assert!(!bad_request.is_auth_failure());

        let unavailable = Error::Api {
            message: "Service Unavailable".into(),
            code: Some("UNAVAILABLE".into()),
            status: 503,
        };
        assert!(unavailable.is_transient());

        assert!(Error::InvalidApiKey.is_auth_failure());
        assert!(Error::RateLimited { retry_after_secs: 5 }.is_transient());
    }
}
