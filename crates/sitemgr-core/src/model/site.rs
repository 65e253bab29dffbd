// ── Site domain type ──

use serde::{Deserialize, Serialize};

use super::entity_id::MacAddress;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    /// Console that owns the site. Sites whose host never resolves stay in
    /// the snapshot but are not surfaced as entities.
    pub host_id: Option<String>,
    /// Internal reference name (e.g. "default").
    pub name: Option<String>,
    pub description: Option<String>,
    pub timezone: Option<String>,
    pub gateway_mac: Option<MacAddress>,
    /// Permission of the API key owner on this site ("admin", "readonly", ...).
    pub permission: Option<String>,
    pub is_owner: bool,
    pub stats: SiteStats,
}

/// Counters reported with the site listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteStats {
    pub total_devices: Option<u64>,
    pub offline_devices: Option<u64>,
    pub wifi_clients: Option<u64>,
    pub wired_clients: Option<u64>,
    pub guest_clients: Option<u64>,
    pub wan_uptime: Option<f64>,
    pub isp_name: Option<String>,
    pub isp_organization: Option<String>,
}

impl Site {
    /// A site is online unless it reports at least one offline device.
    pub fn is_online(&self) -> bool {
        self.stats.offline_devices.unwrap_or(0) == 0
    }

    /// Display name: the internal name, or the id when unnamed.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
