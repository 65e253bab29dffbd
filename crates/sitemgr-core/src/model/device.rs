// ── Device domain types ──

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::MacAddress;

/// Device reachability as reported by the cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceState {
    Online,
    Offline,
}

impl DeviceState {
    /// Anything other than the literal `online` status counts as offline.
    pub fn from_status(status: Option<&str>) -> Self {
        match status {
            Some(s) if s.eq_ignore_ascii_case("online") => Self::Online,
            _ => Self::Offline,
        }
    }

    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// A network device, tagged with the host whose device group it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: Option<String>,
    /// MAC exactly as the API reports it. Entity keys are built from this.
    pub mac: Option<String>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub shortname: Option<String>,
    pub product_line: Option<String>,
    pub ip: Option<IpAddr>,
    pub firmware_version: Option<String>,
    pub firmware_status: Option<String>,
    /// Raw status string from the API.
    pub status: Option<String>,
    pub state: DeviceState,
    pub is_managed: bool,
    pub adoption_time: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    pub uptime: Option<String>,
    pub host_id: Option<String>,
}

impl Device {
    /// Devices need an id, a MAC and a name before they can be surfaced.
    pub fn is_addressable(&self) -> bool {
        let present = |s: Option<&str>| s.is_some_and(|s| !s.is_empty());
        present(self.id.as_deref())
            && present(self.mac.as_deref())
            && present(self.name.as_deref())
    }

    /// Canonical form of [`Self::mac`] for display and comparison.
    pub fn normalized_mac(&self) -> Option<MacAddress> {
        self.mac.as_deref().map(MacAddress::new)
    }
}
