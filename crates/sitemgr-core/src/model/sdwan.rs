// ── SD-WAN domain types ──

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An SD-WAN topology. Hubs and spokes are empty when the detail fetch
/// failed or the config has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdWanConfig {
    pub id: String,
    pub name: Option<String>,
    pub config_type: Option<String>,
    pub variant: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Opaque topology settings.
    pub settings: Option<Value>,
    pub hubs: Vec<SdWanNode>,
    pub spokes: Vec<SdWanNode>,
    /// Whether the detail endpoint answered this cycle.
    pub detail_loaded: bool,
}

impl SdWanConfig {
    /// Configured name, or `SDWAN-{id}`.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map_or_else(|| format!("SDWAN-{}", self.id), str::to_owned)
    }
}

/// Hub or spoke membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdWanNode {
    pub id: String,
    pub name: Option<String>,
    pub site_id: Option<String>,
    pub host_id: Option<String>,
    pub network_ids: Vec<String>,
}

/// Deployment status of one config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdWanStatus {
    pub generate_status: Option<String>,
    pub last_generated_at: Option<String>,
    pub updated_at: Option<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub hubs: Vec<SdWanNodeStatus>,
    pub spokes: Vec<SdWanNodeStatus>,
}

impl SdWanStatus {
    pub fn hub(&self, hub_id: &str) -> Option<&SdWanNodeStatus> {
        self.hubs.iter().find(|h| h.id == hub_id)
    }

    pub fn spoke(&self, spoke_id: &str) -> Option<&SdWanNodeStatus> {
        self.spokes.iter().find(|s| s.id == spoke_id)
    }
}

/// Live state of a hub or spoke.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdWanNodeStatus {
    pub id: String,
    pub name: Option<String>,
    pub site_id: Option<String>,
    pub apply_status: Option<String>,
    pub primary_wan: Option<WanLinkStatus>,
    pub secondary_wan: Option<WanLinkStatus>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub tunnels_up: u32,
    pub tunnels_total: u32,
}

impl SdWanNodeStatus {
    /// Apply status when reported, otherwise derived from the error list.
    pub fn state(&self) -> String {
        match &self.apply_status {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ if self.errors.is_empty() => "ok".into(),
            _ => "error".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WanLinkStatus {
    pub wan_id: Option<String>,
    pub ip: Option<String>,
    pub latency_ms: Option<f64>,
    /// No internet issues reported on this link.
    pub connected: bool,
    pub issue_count: usize,
}
