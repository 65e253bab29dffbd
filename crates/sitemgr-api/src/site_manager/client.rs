// Async HTTP client for the UniFi Site Manager cloud API.
//
// Base URL: https://api.ui.com
// Auth: X-API-KEY header
// Every response body is wrapped in `{ "data": ... }`.

use chrono::{DateTime, Duration, Utc};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::types;
use crate::{Error, TransportConfig};

/// Default cloud endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.ui.com";

/// Query-string timestamp format expected by the metrics endpoints.
pub const METRIC_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Seconds to wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Endpoint paths ───────────────────────────────────────────────────

/// Relative endpoint paths, joined onto the base URL.
///
/// The defaults target the early-access (`ea/`) surface. Override them when
/// the API is served under a different prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub sites: String,
    pub hosts: String,
    pub devices: String,
    pub sdwan_configs: String,
    pub isp_metrics: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            sites: "ea/sites".into(),
            hosts: "ea/hosts".into(),
            devices: "ea/devices".into(),
            sdwan_configs: "ea/sd-wan-configs".into(),
            isp_metrics: "ea/isp-metrics".into(),
        }
    }
}

// ── ISP metric queries ───────────────────────────────────────────────

/// Sampling interval of an ISP metric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
pub enum MetricInterval {
    #[strum(serialize = "5m")]
    FiveMinutes,
    #[strum(serialize = "1h")]
    OneHour,
}

/// Closed time window for a metric query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricWindow {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MetricWindow {
    /// The 24 hours ending at `end`.
    pub fn last_day(end: DateTime<Utc>) -> Self {
        Self {
            begin: end - Duration::hours(24),
            end,
        }
    }

    fn query(&self) -> [(&'static str, String); 2] {
        [
            (
                "beginTimestamp",
                self.begin.format(METRIC_TIME_FORMAT).to_string(),
            ),
            (
                "endTimestamp",
                self.end.format(METRIC_TIME_FORMAT).to_string(),
            ),
        ]
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Site Manager API.
///
/// Read-only: every call is a GET. Not-found responses are reported as
/// "no data" (`None` or an empty list) rather than as errors.
#[derive(Debug, Clone)]
pub struct SiteManagerClient {
    http: reqwest::Client,
    base_url: Url,
    endpoints: Endpoints,
}

impl SiteManagerClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects `X-API-KEY` (marked sensitive) and `Accept: application/json`
    /// as default headers on every request.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("X-API-KEY", key_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            endpoints: Endpoints::default(),
        })
    }

    /// Replace the endpoint paths.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP ─────────────────────────────────────────────────────────

    /// GET an enveloped payload. `Ok(None)` covers 404 and `data: null`.
    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        if params.is_empty() {
            debug!("GET {url}");
        } else {
            debug!("GET {url} params={params:?}");
        }

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    /// GET a list payload and decode each record on its own, so one
    /// unreadable record is skipped instead of failing the whole list.
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let items: Option<Vec<Value>> = self.get_data(path, params).await?;
        Ok(decode_records(path, items.unwrap_or_default()))
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<Option<T>, Error> {
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("404 from {}, treating as no data", resp.url());
            return Ok(None);
        }
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        let envelope: types::Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })?;
        Ok(envelope.data)
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidApiKey;
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Error::RateLimited { retry_after_secs };
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Api {
                status: status.as_u16(),
                message: err.message.unwrap_or_else(|| status.to_string()),
                code: err.code,
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            }
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Hosts ────────────────────────────────────────────────────────

    pub async fn list_hosts(&self) -> Result<Vec<types::HostResponse>, Error> {
        self.get_list(&self.endpoints.hosts, &[]).await
    }

    pub async fn get_host(&self, host_id: &str) -> Result<Option<types::HostResponse>, Error> {
        self.get_data(&format!("{}/{host_id}", self.endpoints.hosts), &[])
            .await
    }

    // ── Sites ────────────────────────────────────────────────────────

    pub async fn list_sites(&self) -> Result<Vec<types::SiteResponse>, Error> {
        self.get_list(&self.endpoints.sites, &[]).await
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// Devices grouped by owning host.
    pub async fn list_devices(&self) -> Result<Vec<types::HostDevicesResponse>, Error> {
        self.get_list(&self.endpoints.devices, &[]).await
    }

    // ── SD-WAN ───────────────────────────────────────────────────────

    pub async fn list_sdwan_configs(&self) -> Result<Vec<types::SdWanConfigSummary>, Error> {
        self.get_list(&self.endpoints.sdwan_configs, &[]).await
    }

    pub async fn get_sdwan_config(
        &self,
        config_id: &str,
    ) -> Result<Option<types::SdWanConfigResponse>, Error> {
        self.get_data(
            &format!("{}/{config_id}", self.endpoints.sdwan_configs),
            &[],
        )
        .await
    }

    pub async fn get_sdwan_config_status(
        &self,
        config_id: &str,
    ) -> Result<Option<types::SdWanStatusResponse>, Error> {
        self.get_data(
            &format!("{}/{config_id}/status", self.endpoints.sdwan_configs),
            &[],
        )
        .await
    }

    // ── ISP metrics ──────────────────────────────────────────────────

    /// Metric series for every site the key can see, over `window`.
    pub async fn get_isp_metrics(
        &self,
        interval: MetricInterval,
        window: &MetricWindow,
    ) -> Result<Vec<types::IspMetricsResponse>, Error> {
        let path = format!("{}/{interval}", self.endpoints.isp_metrics);
        self.get_list(&path, &window.query()).await
    }
}

fn decode_records<T: DeserializeOwned>(path: &str, items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path, index, error = %e, "skipping unreadable record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = SiteManagerClient::normalize_base_url("https://api.ui.com").unwrap();
        assert_eq!(url.as_str(), "https://api.ui.com/");

        let url = SiteManagerClient::normalize_base_url("http://127.0.0.1:9000/proxy/").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/proxy/");
    }

    #[test]
    fn metric_window_formats_query() {
        let end = Utc.with_ymd_and_hms(2024, 3, 2, 12, 30, 0).unwrap();
        let window = MetricWindow::last_day(end);
        let [begin, end] = window.query();

        assert_eq!(begin, ("beginTimestamp", "2024-03-01T12:30:00Z".to_owned()));
        assert_eq!(end, ("endTimestamp", "2024-03-02T12:30:00Z".to_owned()));
    }

    #[test]
    fn unreadable_records_are_skipped() {
        let items = vec![
            serde_json::json!({ "siteId": "S1" }),
            serde_json::json!({ "siteId": 42 }),
            serde_json::json!({ "siteId": "S3" }),
        ];
        let sites: Vec<types::SiteResponse> = decode_records("ea/sites", items);
        let ids: Vec<_> = sites.iter().filter_map(|s| s.site_id.as_deref()).collect();
        assert_eq!(ids, ["S1", "S3"]);
    }

    #[test]
    fn interval_path_segment() {
        assert_eq!(MetricInterval::FiveMinutes.to_string(), "5m");
        assert_eq!(MetricInterval::OneHour.as_ref(), "1h");
    }
}
