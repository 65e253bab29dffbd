// ── Host domain type ──

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// A UniFi console that owns sites and devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    /// Hostname as reported by the console itself.
    pub hostname: Option<String>,
    pub hardware_shortname: Option<String>,
    pub hardware_name: Option<String>,
    pub host_type: Option<String>,
    pub ip: Option<IpAddr>,
    pub firmware_version: Option<String>,
    pub is_blocked: bool,
    pub owner: bool,
}

impl Host {
    /// Human-readable prefix for the host's sites and devices.
    ///
    /// Lowercased hostname, falling back to the lowercased hardware
    /// short-name. `None` when neither is set.
    pub fn display_name(&self) -> Option<String> {
        [&self.hostname, &self.hardware_shortname]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(hostname: Option<&str>, shortname: Option<&str>) -> Host {
        Host {
            id: "H1".into(),
            hostname: hostname.map(Into::into),
            hardware_shortname: shortname.map(Into::into),
            hardware_name: None,
            host_type: None,
            ip: None,
            firmware_version: None,
            is_blocked: false,
            owner: true,
        }
    }

    #[test]
    fn display_name_prefers_hostname() {
        assert_eq!(
            host(Some("Office"), Some("UDMPRO")).display_name().as_deref(),
            Some("office")
        );
    }

    #[test]
    fn display_name_falls_back_to_shortname() {
        assert_eq!(
            host(None, Some("UDMPRO")).display_name().as_deref(),
            Some("udmpro")
        );
        assert_eq!(
            host(Some("  "), Some("UCG")).display_name().as_deref(),
            Some("ucg")
        );
        assert_eq!(host(None, None).display_name(), None);
    }
}
