// ── Identity types ──
//
// MacAddress normalizes hardware addresses; EntityKey is the stable unique
// id every published entity is registered under.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a normalized MAC address from any common format.
    /// Accepts colon-separated, dash-separated, or bare hex.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let lower = raw.as_ref().trim().to_lowercase();
        let is_bare_hex = lower.len() == 12 && lower.chars().all(|c| c.is_ascii_hexdigit());
        if is_bare_hex {
            let pairs: Vec<&str> = (0..12)
                .step_by(2)
                .filter_map(|i| lower.get(i..i + 2))
                .collect();
            return Self(pairs.join(":"));
        }
        Self(lower.replace('-', ":"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

// ── EntityKey ───────────────────────────────────────────────────────

const SDWAN_PREFIX: &str = "sdwan_";
const ISP_SUFFIX: &str = "_isp_metrics";

/// Stable unique id of a published entity.
///
/// The string forms are persisted by hosts' entity registries, so they
/// must never change shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    /// `{site_id}`
    Site { site_id: String },
    /// `{site_id}_{mac}`, with the MAC verbatim from the API.
    Device { site_id: String, mac: String },
    /// `{site_id}_isp_metrics`
    IspMetrics { site_id: String },
    /// `sdwan_config_{config_id}`
    SdWanConfig { config_id: String },
    /// `sdwan_hub_{config_id}_{hub_id}`
    SdWanHub { config_id: String, hub_id: String },
    /// `sdwan_spoke_{config_id}_{spoke_id}`
    SdWanSpoke { config_id: String, spoke_id: String },
}

impl EntityKey {
    /// The site an entity belongs to, if it is site-scoped.
    pub fn site_id(&self) -> Option<&str> {
        match self {
            Self::Site { site_id } | Self::Device { site_id, .. } | Self::IspMetrics { site_id } => {
                Some(site_id)
            }
            Self::SdWanConfig { .. } | Self::SdWanHub { .. } | Self::SdWanSpoke { .. } => None,
        }
    }

    /// Site scope of a raw registry id.
    ///
    /// SD-WAN ids are account-wide and return `None`. Every other id starts
    /// with the site id, up to the first underscore.
    pub fn site_scope(unique_id: &str) -> Option<&str> {
        if unique_id.starts_with(SDWAN_PREFIX) {
            return None;
        }
        let scope = unique_id
            .split_once('_')
            .map_or(unique_id, |(site, _)| site);
        (!scope.is_empty()).then_some(scope)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Site { site_id } => f.write_str(site_id),
            Self::Device { site_id, mac } => write!(f, "{site_id}_{mac}"),
            Self::IspMetrics { site_id } => write!(f, "{site_id}{ISP_SUFFIX}"),
            Self::SdWanConfig { config_id } => write!(f, "{SDWAN_PREFIX}config_{config_id}"),
            Self::SdWanHub { config_id, hub_id } => {
                write!(f, "{SDWAN_PREFIX}hub_{config_id}_{hub_id}")
            }
            Self::SdWanSpoke {
                config_id,
                spoke_id,
            } => write!(f, "{SDWAN_PREFIX}spoke_{config_id}_{spoke_id}"),
        }
    }
}

impl Serialize for EntityKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
