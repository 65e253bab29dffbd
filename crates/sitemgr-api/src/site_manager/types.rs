//! Site Manager API response types (`https://api.ui.com/ea/...`).
//!
//! Every payload is wrapped in a `{ "data": ... }` envelope. Fields are
//! optional almost everywhere: the cloud API omits keys freely depending on
//! console firmware, so absence is modelled as `None` rather than failing
//! the whole decode. Field names use camelCase unless noted.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Envelope ─────────────────────────────────────────────────────────

/// Generic `{ "data": ... }` wrapper returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default, rename = "httpStatusCode")]
    pub http_status_code: Option<u16>,
    #[serde(default, rename = "traceId")]
    pub trace_id: Option<String>,
}

// ── Hosts ────────────────────────────────────────────────────────────

/// Console/host record from `GET /ea/hosts` and `GET /ea/hosts/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostResponse {
    pub id: Option<String>,
    pub hardware_id: Option<String>,
    #[serde(rename = "type")]
    pub host_type: Option<String>,
    pub ip_address: Option<String>,
    pub owner: Option<bool>,
    pub is_blocked: Option<bool>,
    pub registration_time: Option<String>,
    pub last_connection_state_change: Option<String>,
    pub latest_backup_time: Option<String>,
    pub reported_state: Option<ReportedState>,
    /// User metadata, kept opaque.
    pub user_data: Option<Value>,
}

/// State the console reports about itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedState {
    pub hostname: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub state: Option<String>,
    pub hardware: Option<HostHardware>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostHardware {
    pub shortname: Option<String>,
    pub name: Option<String>,
    pub mac: Option<String>,
    pub firmware_version: Option<String>,
}

// ── Sites ────────────────────────────────────────────────────────────

/// Site record from `GET /ea/sites`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResponse {
    pub site_id: Option<String>,
    pub host_id: Option<String>,
    pub meta: Option<SiteMeta>,
    pub statistics: Option<SiteStatistics>,
    pub permission: Option<String>,
    pub is_owner: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMeta {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub timezone: Option<String>,
    pub gateway_mac: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStatistics {
    pub counts: Option<SiteCounts>,
    pub percentages: Option<SitePercentages>,
    pub isp_info: Option<IspInfo>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteCounts {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_device: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub offline_device: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub wifi_client: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub wired_client: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub guest_client: Option<u64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePercentages {
    pub wan_uptime: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IspInfo {
    pub name: Option<String>,
    pub organization: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

/// Devices grouped under their host for one element of `GET /ea/devices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDevicesResponse {
    pub host_id: Option<String>,
    pub host_name: Option<String>,
    #[serde(default)]
    pub devices: Vec<DeviceResponse>,
    pub updated_at: Option<String>,
}

/// A single network device inside a host group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub id: Option<String>,
    pub mac: Option<String>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub shortname: Option<String>,
    pub ip: Option<String>,
    pub product_line: Option<String>,
    pub status: Option<String>,
    pub version: Option<String>,
    pub firmware_status: Option<String>,
    pub is_managed: Option<bool>,
    pub is_console: Option<bool>,
    pub adoption_time: Option<String>,
    pub startup_time: Option<String>,
    pub last_seen: Option<String>,
    /// Seconds or a pre-formatted string depending on firmware.
    pub uptime: Option<Value>,
}

// ── ISP metrics ──────────────────────────────────────────────────────

/// Per-site metric series for one element of `GET /ea/isp-metrics/{interval}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IspMetricsResponse {
    pub metric_type: Option<String>,
    pub site_id: Option<String>,
    pub host_id: Option<String>,
    #[serde(default)]
    pub periods: Vec<IspMetricPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IspMetricPeriod {
    pub metric_time: Option<String>,
    pub version: Option<String>,
    pub data: Option<IspPeriodData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IspPeriodData {
    pub wan: Option<WanMetrics>,
}

/// WAN sample. The API mixes camelCase and snake_case here, so every
/// field is renamed explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WanMetrics {
    #[serde(rename = "avgLatency")]
    pub avg_latency: Option<f64>,
    #[serde(rename = "maxLatency")]
    pub max_latency: Option<f64>,
    #[serde(rename = "download_kbps")]
    pub download_kbps: Option<f64>,
    #[serde(rename = "upload_kbps")]
    pub upload_kbps: Option<f64>,
    #[serde(rename = "packetLoss")]
    pub packet_loss: Option<f64>,
    #[serde(rename = "ispName")]
    pub isp_name: Option<String>,
    #[serde(rename = "ispAsn", default, deserialize_with = "string_or_number")]
    pub isp_asn: Option<String>,
    pub uptime: Option<f64>,
    pub downtime: Option<f64>,
}

// ── SD-WAN ───────────────────────────────────────────────────────────

/// Config summary from `GET /ea/sd-wan-configs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdWanConfigSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub config_type: Option<String>,
}

/// Full config from `GET /ea/sd-wan-configs/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdWanConfigResponse {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub config_type: Option<String>,
    pub variant: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Topology settings, kept as opaque JSON.
    pub settings: Option<Value>,
    #[serde(default)]
    pub hubs: Vec<SdWanNodeResponse>,
    #[serde(default)]
    pub spokes: Vec<SdWanNodeResponse>,
}

/// Hub or spoke membership inside a config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdWanNodeResponse {
    pub id: Option<String>,
    pub host_id: Option<String>,
    pub site_id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub network_ids: Vec<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Deployment status from `GET /ea/sd-wan-configs/{id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdWanStatusResponse {
    pub id: Option<String>,
    pub fingerprint: Option<String>,
    pub updated_at: Option<Value>,
    pub generate_status: Option<String>,
    pub last_generated_at: Option<Value>,
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(default)]
    pub warnings: Vec<Value>,
    #[serde(default)]
    pub hubs: Vec<SdWanNodeStatusResponse>,
    #[serde(default)]
    pub spokes: Vec<SdWanNodeStatusResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdWanNodeStatusResponse {
    pub id: Option<String>,
    pub host_id: Option<String>,
    pub site_id: Option<String>,
    pub name: Option<String>,
    pub apply_status: Option<String>,
    pub primary_wan: Option<SdWanWanStatus>,
    pub secondary_wan: Option<SdWanWanStatus>,
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(default)]
    pub warnings: Vec<Value>,
    #[serde(default)]
    pub connections: Vec<SdWanConnection>,
    pub number_of_tunnels_used_by_other_hubs: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdWanWanStatus {
    pub wan_id: Option<String>,
    pub ip: Option<String>,
    pub mac: Option<String>,
    pub latency: Option<f64>,
    #[serde(default)]
    pub internet_issues: Vec<Value>,
}

/// A spoke's link to one hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdWanConnection {
    pub hub_id: Option<String>,
    #[serde(default)]
    pub tunnels: Vec<SdWanTunnel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdWanTunnel {
    pub hub_wan_interface: Option<String>,
    pub spoke_wan_interface: Option<String>,
    pub status: Option<String>,
}

// ── Helpers ──────────────────────────────────────────────────────────

/// ASNs arrive either as `"AS7922"` or as a bare number.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Site counters arrive as integers, as floats (`1.0`) or as numeric strings.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.round() as u64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wan_metrics_accept_mixed_field_styles() {
        let wan: WanMetrics = serde_json::from_value(json!({
            "avgLatency": 12,
            "maxLatency": 40.5,
            "download_kbps": 90000,
            "upload_kbps": 20000,
            "packetLoss": 0.1,
            "ispName": "Comcast",
            "ispAsn": 7922,
            "uptime": 100,
            "downtime": 0
        }))
        .unwrap();

        assert_eq!(wan.avg_latency, Some(12.0));
        assert_eq!(wan.download_kbps, Some(90000.0));
        assert_eq!(wan.isp_asn.as_deref(), Some("7922"));
    }

    #[test]
    fn site_counts_accept_floats_and_strings() {
        let counts: SiteCounts = serde_json::from_value(json!({
            "totalDevice": 4,
            "offlineDevice": 1.0,
            "wifiClient": "12",
            "wiredClient": null,
            "guestClient": -3
        }))
        .unwrap();

        assert_eq!(counts.total_device, Some(4));
        assert_eq!(counts.offline_device, Some(1));
        assert_eq!(counts.wifi_client, Some(12));
        assert_eq!(counts.wired_client, None);
        assert_eq!(counts.guest_client, None);
    }

    #[test]
    fn envelope_tolerates_null_data() {
        let env: Envelope<Vec<SiteResponse>> =
            serde_json::from_value(json!({ "data": null })).unwrap();
        assert!(env.data.is_none());

        let env: Envelope<Vec<SiteResponse>> = serde_json::from_value(json!({})).unwrap();
        assert!(env.data.is_none());
    }

    #[test]
    fn host_devices_default_to_empty() {
        let group: HostDevicesResponse =
            serde_json::from_value(json!({ "hostId": "H1" })).unwrap();
        assert_eq!(group.host_id.as_deref(), Some("H1"));
        assert!(group.devices.is_empty());
    }
}
