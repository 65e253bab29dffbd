// ── Entity projection ──
//
// Turns a Snapshot into the flat set of entities a host platform
// registers: one per selected site, its devices and ISP metrics, plus the
// account-wide SD-WAN configs, hubs and spokes. Projection is a pure
// function of (snapshot, options, now).

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::model::{
    Device, EntityKey, MetricCategory, SdWanConfig, SdWanNode, SdWanNodeStatus, SdWanStatus,
    Site, SiteIspMetrics,
};
use crate::snapshot::Snapshot;

/// Placeholder state when nothing is known yet.
pub const STATE_UNKNOWN: &str = "unknown";

/// Default product line for devices that report none.
const DEFAULT_PRODUCT_LINE: &str = "network";

/// Site name that may be replaced by [`ProjectionOptions::default_site_alias`].
const LEGACY_DEFAULT_SITE: &str = "default";

// ── Types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Site,
    Device,
    IspMetrics,
    SdWanConfig,
    SdWanHub,
    SdWanSpoke,
}

/// One published entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub key: EntityKey,
    pub kind: EntityKind,
    pub name: String,
    pub state: String,
    pub attributes: Map<String, Value>,
    /// `false` when this entity has no data of its own this cycle.
    pub has_data: bool,
}

impl Entity {
    pub fn unique_id(&self) -> String {
        self.key.to_string()
    }

    /// Available only while the coordinator's last cycle succeeded.
    pub fn is_available(&self, last_update_success: bool) -> bool {
        last_update_success && self.has_data
    }
}

/// Knobs for which entities are surfaced and how they are named.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionOptions {
    /// Site ids to surface. Empty means every site.
    pub selected_sites: BTreeSet<String>,
    /// Replacement name for a site literally called "default" on which the
    /// key has admin permission. Unset keeps host-based naming everywhere.
    pub default_site_alias: Option<String>,
}

impl ProjectionOptions {
    pub fn is_selected(&self, site_id: &str) -> bool {
        self.selected_sites.is_empty() || self.selected_sites.contains(site_id)
    }
}

/// Desired entity set, keyed by unique id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EntitySet(BTreeMap<String, Entity>);

impl EntitySet {
    fn push(&mut self, entity: Entity) {
        self.0.insert(entity.unique_id(), entity);
    }

    pub fn get(&self, unique_id: &str) -> Option<&Entity> {
        self.0.get(unique_id)
    }

    pub fn contains(&self, unique_id: &str) -> bool {
        self.0.contains_key(unique_id)
    }

    pub fn ids(&self) -> BTreeSet<String> {
        self.0.keys().cloned().collect()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ── Projection ───────────────────────────────────────────────────────

/// Project `snapshot` into the entities a platform should hold.
///
/// `now` only feeds the ISP metrics entity's state, which reports when the
/// value was last observed.
pub fn project(snapshot: &Snapshot, options: &ProjectionOptions, now: DateTime<Utc>) -> EntitySet {
    let mut set = EntitySet::default();

    for site in snapshot.sites.iter().filter(|s| options.is_selected(&s.id)) {
        let Some(host_name) = snapshot.site_host_name(site) else {
            continue;
        };

        let site_name = site_display_name(site, &host_name, options);
        set.push(site_entity(site, site_name.clone()));

        for device in snapshot.site_devices(site).filter(|d| d.is_addressable()) {
            if let Some(entity) = device_entity(site, &site_name, &host_name, device) {
                set.push(entity);
            }
        }

        let empty = SiteIspMetrics::default();
        let metrics = snapshot.isp_metrics.get(&site.id).unwrap_or(&empty);
        set.push(isp_entity(site, metrics, now));
    }

    for config in &snapshot.sdwan_configs {
        let status = snapshot.sdwan_status(&config.id);
        set.push(sdwan_config_entity(config, status));
        for hub in &config.hubs {
            let node_status = status.and_then(|s| s.hub(&hub.id));
            set.push(sdwan_node_entity(config, hub, node_status, NodeRole::Hub));
        }
        for spoke in &config.spokes {
            let node_status = status.and_then(|s| s.spoke(&spoke.id));
            set.push(sdwan_node_entity(config, spoke, node_status, NodeRole::Spoke));
        }
    }

    set
}

fn site_display_name(site: &Site, host_name: &str, options: &ProjectionOptions) -> String {
    if let Some(alias) = options.default_site_alias.as_deref() {
        let is_default = site.name.as_deref() == Some(LEGACY_DEFAULT_SITE);
        let is_admin = site.permission.as_deref() == Some("admin");
        if is_default && is_admin {
            return format!("{alias}-site");
        }
    }
    format!("{host_name}-site")
}

fn site_entity(site: &Site, name: String) -> Entity {
    let stats = &site.stats;
    Entity {
        key: EntityKey::Site {
            site_id: site.id.clone(),
        },
        kind: EntityKind::Site,
        name,
        state: if site.is_online() { "online" } else { "offline" }.into(),
        attributes: object(json!({
            "site_id": site.id,
            "host_id": site.host_id,
            "description": site.description,
            "gateway_mac": site.gateway_mac,
            "timezone": site.timezone,
            "permission": site.permission,
            "total_devices": stats.total_devices,
            "offline_devices": stats.offline_devices,
            "wifi_clients": stats.wifi_clients,
            "wired_clients": stats.wired_clients,
            "guest_clients": stats.guest_clients,
            "wan_uptime": stats.wan_uptime,
            "isp_name": stats.isp_name,
            "isp_organization": stats.isp_organization,
        })),
        has_data: true,
    }
}

fn device_entity(site: &Site, site_name: &str, host_name: &str, device: &Device) -> Option<Entity> {
    let mac = device.mac.clone()?;
    let device_name = device.name.as_deref()?.to_lowercase();

    let mut attributes = object(json!({
        "id": device.id,
        "mac": mac,
        "model": device.model,
        "type": device.shortname.as_deref().unwrap_or("Unknown"),
        "product_line": title_case(device.product_line.as_deref().unwrap_or(DEFAULT_PRODUCT_LINE)),
        "ip": device.ip,
        "firmware_version": device.firmware_version,
        "firmware_status": device.firmware_status,
        "status": device.status,
        "last_seen": device.last_seen,
        "adoption_time": device.adoption_time,
        "is_managed": device.is_managed,
        "site_name": site_name,
        "site_id": site.id,
        "host_id": device.host_id,
    }));
    if device.state.is_online() {
        attributes.insert("uptime".into(), json!(device.uptime));
    }

    Some(Entity {
        key: EntityKey::Device {
            site_id: site.id.clone(),
            mac,
        },
        kind: EntityKind::Device,
        name: format!("{host_name}-{device_name}"),
        state: device.state.to_string(),
        attributes,
        has_data: true,
    })
}

fn isp_entity(site: &Site, metrics: &SiteIspMetrics, now: DateTime<Utc>) -> Entity {
    let latency = metrics.latest(MetricCategory::Latency);
    let loss = metrics.latest(MetricCategory::PacketLoss);
    let bandwidth = metrics.latest(MetricCategory::Bandwidth);
    let wan = metrics.latest(MetricCategory::Wan);
    let last_sample = metrics
        .get(MetricCategory::Wan)
        .latest()
        .map(|(time, _)| time.to_owned());

    let avg = latency.and_then(|s| s.avg_latency);
    let mbps = |kbps: Option<f64>| round2(kbps.unwrap_or(0.0) / 1000.0);

    Entity {
        key: EntityKey::IspMetrics {
            site_id: site.id.clone(),
        },
        kind: EntityKind::IspMetrics,
        name: format!("{} ISP Metrics", site.label()),
        state: now.to_rfc3339(),
        attributes: object(json!({
            "site_id": site.id,
            "last_sample_time": last_sample,
            "latency_avg": avg,
            // The series carries no minimum, so the average stands in.
            "latency_min": avg,
            "latency_max": latency.and_then(|s| s.max_latency),
            "packet_loss_percentage": loss.and_then(|s| s.packet_loss).unwrap_or(0.0),
            "download_mbps": mbps(bandwidth.and_then(|s| s.download_kbps)),
            "upload_mbps": mbps(bandwidth.and_then(|s| s.upload_kbps)),
            "wan_latency_avg": wan.and_then(|s| s.avg_latency),
            "wan_latency_max": wan.and_then(|s| s.max_latency),
            "wan_packet_loss": wan.and_then(|s| s.packet_loss),
            "wan_download_kbps": wan.and_then(|s| s.download_kbps),
            "wan_upload_kbps": wan.and_then(|s| s.upload_kbps),
            "wan_uptime": wan.and_then(|s| s.uptime),
            "wan_downtime": wan.and_then(|s| s.downtime),
            "isp_name": wan.and_then(|s| s.isp_name.clone()),
            "isp_asn": wan.and_then(|s| s.isp_asn.clone()),
        })),
        has_data: !metrics.is_empty(),
    }
}

fn sdwan_config_entity(config: &SdWanConfig, status: Option<&SdWanStatus>) -> Entity {
    let state = status
        .and_then(|s| s.generate_status.as_deref())
        .filter(|s| !s.is_empty())
        .map_or_else(|| STATE_UNKNOWN.to_owned(), str::to_lowercase);

    Entity {
        key: EntityKey::SdWanConfig {
            config_id: config.id.clone(),
        },
        kind: EntityKind::SdWanConfig,
        name: config.display_name(),
        state,
        attributes: object(json!({
            "id": config.id,
            "name": config.name,
            "description": config.description,
            "type": config.config_type,
            "variant": config.variant,
            "created": config.created_at,
            "last_updated": config.updated_at,
            "status": status.and_then(|s| s.generate_status.clone()),
            "last_generated": status.and_then(|s| s.last_generated_at.clone()),
            "errors": status.map(|s| s.errors.clone()).unwrap_or_default(),
            "warnings": status.map(|s| s.warnings.clone()).unwrap_or_default(),
            "details": config.settings,
            "hub_count": config.hubs.len(),
            "spoke_count": config.spokes.len(),
        })),
        has_data: status.is_some(),
    }
}

#[derive(Debug, Clone, Copy)]
enum NodeRole {
    Hub,
    Spoke,
}

fn sdwan_node_entity(
    config: &SdWanConfig,
    node: &SdWanNode,
    status: Option<&SdWanNodeStatus>,
    role: NodeRole,
) -> Entity {
    let (key, kind, label) = match role {
        NodeRole::Hub => (
            EntityKey::SdWanHub {
                config_id: config.id.clone(),
                hub_id: node.id.clone(),
            },
            EntityKind::SdWanHub,
            "Hub",
        ),
        NodeRole::Spoke => (
            EntityKey::SdWanSpoke {
                config_id: config.id.clone(),
                spoke_id: node.id.clone(),
            },
            EntityKind::SdWanSpoke,
            "Spoke",
        ),
    };
    let node_name = node
        .name
        .clone()
        .or_else(|| status.and_then(|s| s.name.clone()))
        .unwrap_or_else(|| node.id.clone());

    Entity {
        key,
        kind,
        name: format!("{} {label} {node_name}", config.display_name()),
        state: status.map_or_else(|| STATE_UNKNOWN.to_owned(), SdWanNodeStatus::state),
        attributes: object(json!({
            "config_id": config.id,
            "node_id": node.id,
            "site_id": node.site_id,
            "host_id": node.host_id,
            "network_ids": node.network_ids,
            "primary_wan": status.and_then(|s| s.primary_wan.clone()),
            "secondary_wan": status.and_then(|s| s.secondary_wan.clone()),
            "tunnels_up": status.map(|s| s.tunnels_up),
            "tunnels_total": status.map(|s| s.tunnels_total),
            "errors": status.map(|s| s.errors.clone()).unwrap_or_default(),
            "warnings": status.map(|s| s.warnings.clone()).unwrap_or_default(),
        })),
        has_data: status.is_some(),
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// "unifi protect" -> "Unifi Protect"
fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
