#![allow(clippy::unwrap_used)]
// Integration tests for `SiteManagerClient` using wiremock.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sitemgr_api::{Error, MetricInterval, MetricWindow, SiteManagerClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SiteManagerClient) {
    let server = MockServer::start().await;
    let key: secrecy::SecretString = "test-api-key".to_string().into();
    let client =
        SiteManagerClient::from_api_key(&server.uri(), &key, &TransportConfig::default()).unwrap();
    (server, client)
}

// ── Headers / auth ──────────────────────────────────────────────────

#[tokio::test]
async fn test_sends_api_key_and_accept_headers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ea/hosts"))
        .and(header("X-API-KEY", "test-api-key"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "H1",
                "type": "console",
                "ipAddress": "203.0.113.7",
                "reportedState": {
                    "hostname": "Office",
                    "hardware": { "shortname": "UDMPRO" }
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let hosts = client.list_hosts().await.unwrap();
    assert_eq!(hosts.len(), 1);
    let state = hosts[0].reported_state.as_ref().unwrap();
    assert_eq!(state.hostname.as_deref(), Some("Office"));
    assert_eq!(
        state.hardware.as_ref().unwrap().shortname.as_deref(),
        Some("UDMPRO")
    );
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ea/sites"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "unauthorized",
            "message": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let result = client.list_sites().await;
    assert!(
        matches!(result, Err(Error::InvalidApiKey)),
        "expected InvalidApiKey, got: {result:?}"
    );
}

// ── Status handling ─────────────────────────────────────────────────

#[tokio::test]
async fn test_not_found_is_no_data() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ea/sd-wan-configs/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = client.get_sdwan_config("missing").await.unwrap();
    assert!(config.is_none());

    let sites = client.list_sites().await.unwrap();
    assert!(sites.is_empty(), "unmatched path should read as no data");
}

#[tokio::test]
async fn test_server_error_carries_status_and_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ea/devices"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({
            "code": "bad_gateway",
            "message": "upstream unavailable"
        })))
        .mount(&server)
        .await;

    let err = client.list_devices().await.unwrap_err();
    match &err {
        Error::Api {
            status,
            message,
            code,
        } => {
            assert_eq!(*status, 502);
            assert_eq!(message, "upstream unavailable");
            assert_eq!(code.as_deref(), Some("bad_gateway"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ea/hosts"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "17"))
        .mount(&server)
        .await;

    let result = client.list_hosts().await;
    assert!(
        matches!(result, Err(Error::RateLimited { retry_after_secs: 17 })),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ea/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.list_sites().await.unwrap_err();
    assert!(err.is_malformed(), "got: {err:?}");
}

#[tokio::test]
async fn test_null_data_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ea/sd-wan-configs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .mount(&server)
        .await;

    assert!(client.list_sdwan_configs().await.unwrap().is_empty());
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices_grouped_by_host() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ea/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "hostId": "H1",
                    "hostName": "office",
                    "devices": [
                        { "id": "D1", "mac": "aa:bb", "name": "sw1", "status": "online" },
                        { "id": "D2", "mac": "cc:dd", "name": "ap1", "status": "offline" }
                    ]
                },
                { "hostId": "H2", "devices": [] }
            ]
        })))
        .mount(&server)
        .await;

    let groups = client.list_devices().await.unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].devices.len(), 2);
    assert_eq!(groups[0].devices[1].status.as_deref(), Some("offline"));
    assert!(groups[1].devices.is_empty());
}

// ── SD-WAN ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sdwan_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ea/sd-wan-configs/cfg-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "cfg-1",
                "generateStatus": "OK",
                "errors": [],
                "warnings": ["hub without secondary WAN"],
                "hubs": [{
                    "id": "hub-1",
                    "siteId": "S1",
                    "applyStatus": "OK",
                    "primaryWan": { "wanId": "WAN1", "latency": 11.5, "internetIssues": [] }
                }],
                "spokes": [{
                    "id": "spoke-1",
                    "connections": [{
                        "hubId": "hub-1",
                        "tunnels": [{ "status": "connected" }, { "status": "disconnected" }]
                    }]
                }]
            }
        })))
        .mount(&server)
        .await;

    let status = client.get_sdwan_config_status("cfg-1").await.unwrap().unwrap();
    assert_eq!(status.generate_status.as_deref(), Some("OK"));
    assert_eq!(status.warnings.len(), 1);
    assert_eq!(
        status.hubs[0].primary_wan.as_ref().unwrap().latency,
        Some(11.5)
    );
    assert_eq!(status.spokes[0].connections[0].tunnels.len(), 2);
}

// ── ISP metrics ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_isp_metrics_window_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ea/isp-metrics/5m"))
        .and(query_param("beginTimestamp", "2024-05-01T00:00:00Z"))
        .and(query_param("endTimestamp", "2024-05-02T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "metricType": "5m",
                "siteId": "S1",
                "hostId": "H1",
                "periods": [{
                    "metricTime": "2024-05-01T23:55:00Z",
                    "data": { "wan": { "avgLatency": 9, "packetLoss": 0 } }
                }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let end = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
    let series = client
        .get_isp_metrics(MetricInterval::FiveMinutes, &MetricWindow::last_day(end))
        .await
        .unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series[0].site_id.as_deref(), Some("S1"));
    let wan = series[0].periods[0]
        .data
        .as_ref()
        .unwrap()
        .wan
        .as_ref()
        .unwrap();
    assert_eq!(wan.avg_latency, Some(9.0));
}
