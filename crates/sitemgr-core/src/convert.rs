// ── API-to-domain type conversions ──
//
// Bridges raw `sitemgr_api` response types into canonical
// `sitemgr_core::model` domain types. Records without an identifier are
// dropped here; every other missing field stays `None`.

use std::collections::HashMap;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde_json::Value;

use sitemgr_api::types;

use crate::model::{
    Device, DeviceState, Host, MacAddress, SdWanConfig, SdWanNode, SdWanNodeStatus, SdWanStatus,
    Site, SiteStats, WanLinkStatus,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an optional string to an `IpAddr`, silently dropping unparseable values.
fn parse_ip(raw: Option<&String>) -> Option<IpAddr> {
    raw.and_then(|s| s.trim().parse().ok())
}

/// Parse an ISO-8601 datetime string.
fn parse_datetime(raw: Option<&String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Drop empty strings so "missing" has a single representation.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

/// Render a scalar JSON value as text (numbers, strings, bools).
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Error and warning entries are strings on some firmware and objects on others.
fn issue_text(value: &Value) -> String {
    match value {
        Value::Object(map) => ["message", "msg", "code", "type"]
            .iter()
            .find_map(|k| map.get(*k).and_then(value_text))
            .unwrap_or_else(|| value.to_string()),
        other => value_text(other).unwrap_or_else(|| other.to_string()),
    }
}

fn issues(values: &[Value]) -> Vec<String> {
    values.iter().map(issue_text).collect()
}

// ━━ Hosts ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub(crate) fn host_from_api(resp: types::HostResponse) -> Option<Host> {
    let id = non_empty(resp.id)?;
    let state = resp.reported_state;
    let hardware = state.as_ref().and_then(|s| s.hardware.as_ref());

    Some(Host {
        id,
        hostname: state.as_ref().and_then(|s| non_empty(s.hostname.clone())),
        hardware_shortname: hardware.and_then(|h| non_empty(h.shortname.clone())),
        hardware_name: hardware.and_then(|h| h.name.clone()),
        host_type: resp.host_type,
        ip: parse_ip(resp.ip_address.as_ref()),
        firmware_version: state
            .as_ref()
            .and_then(|s| s.version.clone())
            .or_else(|| hardware.and_then(|h| h.firmware_version.clone())),
        is_blocked: resp.is_blocked.unwrap_or(false),
        owner: resp.owner.unwrap_or(false),
    })
}

// ━━ Sites ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub(crate) fn site_from_api(resp: types::SiteResponse) -> Option<Site> {
    let id = non_empty(resp.site_id)?;
    let meta = resp.meta;
    let statistics = resp.statistics;
    let counts = statistics.as_ref().and_then(|s| s.counts.as_ref());
    let isp = statistics.as_ref().and_then(|s| s.isp_info.as_ref());

    Some(Site {
        id,
        host_id: non_empty(resp.host_id),
        name: meta.as_ref().and_then(|m| non_empty(m.name.clone())),
        description: meta.as_ref().and_then(|m| non_empty(m.desc.clone())),
        timezone: meta.as_ref().and_then(|m| m.timezone.clone()),
        gateway_mac: meta
            .as_ref()
            .and_then(|m| non_empty(m.gateway_mac.clone()))
            .map(MacAddress::new),
        permission: resp.permission,
        is_owner: resp.is_owner.unwrap_or(false),
        stats: SiteStats {
            total_devices: counts.and_then(|c| c.total_device),
            offline_devices: counts.and_then(|c| c.offline_device),
            wifi_clients: counts.and_then(|c| c.wifi_client),
            wired_clients: counts.and_then(|c| c.wired_client),
            guest_clients: counts.and_then(|c| c.guest_client),
            wan_uptime: statistics
                .as_ref()
                .and_then(|s| s.percentages.as_ref())
                .and_then(|p| p.wan_uptime),
            isp_name: isp.and_then(|i| i.name.clone()),
            isp_organization: isp.and_then(|i| i.organization.clone()),
        },
    })
}

// ━━ Devices ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub(crate) fn device_from_api(resp: types::DeviceResponse, host_id: Option<&str>) -> Device {
    Device {
        state: DeviceState::from_status(resp.status.as_deref()),
        id: non_empty(resp.id),
        mac: non_empty(resp.mac),
        name: non_empty(resp.name),
        model: resp.model,
        shortname: resp.shortname,
        product_line: non_empty(resp.product_line),
        ip: parse_ip(resp.ip.as_ref()),
        firmware_version: resp.version,
        firmware_status: resp.firmware_status,
        status: resp.status,
        is_managed: resp.is_managed.unwrap_or(false),
        adoption_time: parse_datetime(resp.adoption_time.as_ref()),
        last_seen: parse_datetime(resp.last_seen.as_ref()),
        uptime: resp
            .uptime
            .as_ref()
            .and_then(value_text)
            .or(resp.startup_time),
        host_id: host_id.map(str::to_owned),
    }
}

/// Flatten host groups into one list, tagging each device with its group's host.
pub(crate) fn flatten_devices(groups: Vec<types::HostDevicesResponse>) -> Vec<Device> {
    groups
        .into_iter()
        .flat_map(|group| {
            let host_id = non_empty(group.host_id);
            group
                .devices
                .into_iter()
                .map(move |d| device_from_api(d, host_id.as_deref()))
        })
        .collect()
}

// ━━ SD-WAN ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn sdwan_node_from_api(resp: types::SdWanNodeResponse) -> Option<SdWanNode> {
    Some(SdWanNode {
        id: non_empty(resp.id)?,
        name: resp.name,
        site_id: resp.site_id,
        host_id: resp.host_id,
        network_ids: resp.network_ids,
    })
}

/// Merge the list summary with the detail response (when it arrived).
pub(crate) fn sdwan_config_from_api(
    id: String,
    summary: types::SdWanConfigSummary,
    detail: Option<types::SdWanConfigResponse>,
) -> SdWanConfig {
    let detail_loaded = detail.is_some();
    let detail = detail.unwrap_or_default();

    SdWanConfig {
        id,
        name: non_empty(detail.name).or_else(|| non_empty(summary.name)),
        config_type: detail.config_type.or(summary.config_type),
        variant: detail.variant,
        description: detail.description,
        created_at: detail.created_at,
        updated_at: detail.updated_at,
        settings: detail.settings,
        hubs: detail
            .hubs
            .into_iter()
            .filter_map(sdwan_node_from_api)
            .collect(),
        spokes: detail
            .spokes
            .into_iter()
            .filter_map(sdwan_node_from_api)
            .collect(),
        detail_loaded,
    }
}

fn wan_link_from_api(resp: &types::SdWanWanStatus) -> WanLinkStatus {
    WanLinkStatus {
        wan_id: resp.wan_id.clone(),
        ip: resp.ip.clone(),
        latency_ms: resp.latency,
        connected: resp.internet_issues.is_empty(),
        issue_count: resp.internet_issues.len(),
    }
}

fn tunnel_is_up(tunnel: &types::SdWanTunnel) -> bool {
    tunnel.status.as_deref().is_some_and(|s| {
        ["connected", "up", "ok", "active"]
            .iter()
            .any(|ok| s.eq_ignore_ascii_case(ok))
    })
}

fn node_status_from_api(resp: &types::SdWanNodeStatusResponse) -> Option<SdWanNodeStatus> {
    let id = non_empty(resp.id.clone())?;
    let tunnels = resp.connections.iter().flat_map(|c| c.tunnels.iter());
    let (up, total) = tunnels.fold((0u32, 0u32), |(up, total), t| {
        (up + u32::from(tunnel_is_up(t)), total + 1)
    });

    Some(SdWanNodeStatus {
        id,
        name: resp.name.clone(),
        site_id: resp.site_id.clone(),
        apply_status: resp.apply_status.clone(),
        primary_wan: resp.primary_wan.as_ref().map(wan_link_from_api),
        secondary_wan: resp.secondary_wan.as_ref().map(wan_link_from_api),
        errors: issues(&resp.errors),
        warnings: issues(&resp.warnings),
        tunnels_up: up,
        tunnels_total: total,
    })
}

/// Convert a status payload. Hub tunnel counts are gathered from the
/// spokes' connections, which is where the API reports them.
pub(crate) fn sdwan_status_from_api(resp: &types::SdWanStatusResponse) -> SdWanStatus {
    let mut hub_tunnels: HashMap<&str, (u32, u32)> = HashMap::new();
    for connection in resp.spokes.iter().flat_map(|s| s.connections.iter()) {
        let Some(hub_id) = connection.hub_id.as_deref() else {
            continue;
        };
        let entry = hub_tunnels.entry(hub_id).or_default();
        for tunnel in &connection.tunnels {
            entry.0 += u32::from(tunnel_is_up(tunnel));
            entry.1 += 1;
        }
    }

    let hubs = resp
        .hubs
        .iter()
        .filter_map(node_status_from_api)
        .map(|mut hub| {
            if let Some((up, total)) = hub_tunnels.get(hub.id.as_str()) {
                hub.tunnels_up = *up;
                hub.tunnels_total = *total;
            }
            hub
        })
        .collect();

    SdWanStatus {
        generate_status: resp.generate_status.clone(),
        last_generated_at: resp.last_generated_at.as_ref().and_then(value_text),
        updated_at: resp.updated_at.as_ref().and_then(value_text),
        errors: issues(&resp.errors),
        warnings: issues(&resp.warnings),
        hubs,
        spokes: resp.spokes.iter().filter_map(node_status_from_api).collect(),
    }
}
