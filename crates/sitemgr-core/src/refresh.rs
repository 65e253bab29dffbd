// ── Snapshot refresher ──
//
// One refresh cycle against the Site Manager API. Fetches run in
// dependency order: sites gate everything, the SD-WAN config list gates
// per-config detail/status, and ISP metrics are split per fetched site.
// Only the sites fetch can fail a cycle; an authentication failure on any
// fetch aborts it.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use sitemgr_api::{MetricInterval, MetricWindow, SiteManagerClient};

use crate::convert;
use crate::error::CoreError;
use crate::metrics;
use crate::model::{Host, SdWanConfig, SdWanStatus, Site};
use crate::snapshot::Snapshot;

/// Builds a complete [`Snapshot`] from one pass over the API.
#[derive(Debug, Clone)]
pub struct Refresher {
    client: SiteManagerClient,
}

impl Refresher {
    pub fn new(client: SiteManagerClient) -> Self {
        Self { client }
    }

    /// Run one cycle.
    ///
    /// Returns [`CoreError::AuthenticationFailed`] on any 401,
    /// [`CoreError::UpdateFailed`] when the sites fetch fails for another
    /// reason, and otherwise a full snapshot in which failed optional fetches
    /// appear as empty collections. An empty or undecodable sites response
    /// yields an empty snapshot without touching the other endpoints, so
    /// account-wide SD-WAN configs are not fetched either. Individual site
    /// records that fail to decode are skipped by the client.
    pub async fn refresh(&self) -> Result<Snapshot, CoreError> {
        // ── Sites (required) ─────────────────────────────────────────
        let sites: Vec<Site> = match self.client.list_sites().await {
            Ok(raw) => raw.into_iter().filter_map(convert::site_from_api).collect(),
            Err(e) if e.is_malformed() => {
                warn!(error = %e, "sites response unreadable, publishing empty snapshot");
                return Ok(Snapshot::default());
            }
            Err(e) => return Err(CoreError::during_refresh("sites", e)),
        };
        if sites.is_empty() {
            info!("no sites visible to this API key");
            return Ok(Snapshot::default());
        }

        // ── Hosts, devices (optional) ────────────────────────────────
        let hosts = optional("hosts", self.client.list_hosts().await)?
            .into_iter()
            .filter_map(convert::host_from_api)
            .collect();
        let devices =
            convert::flatten_devices(optional("devices", self.client.list_devices().await)?);

        // ── SD-WAN (optional) ────────────────────────────────────────
        let (sdwan_configs, sdwan_statuses) = self.fetch_sdwan().await?;

        // ── ISP metrics (optional, per site) ─────────────────────────
        let isp_entries = optional(
            "isp-metrics",
            self.client
                .get_isp_metrics(
                    MetricInterval::FiveMinutes,
                    &MetricWindow::last_day(Utc::now()),
                )
                .await,
        )?;
        let isp_metrics = metrics::extract_all(&isp_entries, sites.iter().map(|s| s.id.as_str()));

        let snapshot = Snapshot {
            hosts,
            sites,
            devices,
            isp_metrics,
            sdwan_configs,
            sdwan_statuses,
        };
        info!(
            sites = snapshot.sites.len(),
            hosts = snapshot.hosts.len(),
            devices = snapshot.devices.len(),
            sdwan_configs = snapshot.sdwan_configs.len(),
            "refresh complete"
        );
        Ok(snapshot)
    }

    /// Look up one host directly, outside a cycle.
    pub async fn host(&self, host_id: &str) -> Result<Host, CoreError> {
        self.client
            .get_host(host_id)
            .await?
            .and_then(convert::host_from_api)
            .ok_or_else(|| CoreError::HostNotFound {
                identifier: host_id.to_owned(),
            })
    }

    /// Config list, then detail and status for every config concurrently.
    async fn fetch_sdwan(
        &self,
    ) -> Result<(Vec<SdWanConfig>, BTreeMap<String, SdWanStatus>), CoreError> {
        let summaries = optional("sd-wan-configs", self.client.list_sdwan_configs().await)?;
        if summaries.is_empty() {
            return Ok((Vec::new(), BTreeMap::new()));
        }
        debug!(config_count = summaries.len(), "fetching SD-WAN details");

        let client = &self.client;
        let futs = summaries.into_iter().filter_map(|summary| {
            let id = summary.id.clone().filter(|id| !id.is_empty())?;
            Some(async move {
                let (detail, status) = tokio::join!(
                    client.get_sdwan_config(&id),
                    client.get_sdwan_config_status(&id),
                );
                (id, summary, detail, status)
            })
        });
        let results = futures_util::future::join_all(futs).await;

        let mut configs = Vec::with_capacity(results.len());
        let mut statuses = BTreeMap::new();
        for (id, summary, detail, status) in results {
            let detail = optional_item("sd-wan-config detail", &id, detail)?;
            if let Some(status) = optional_item("sd-wan-config status", &id, status)? {
                statuses.insert(id.clone(), convert::sdwan_status_from_api(&status));
            }
            configs.push(convert::sdwan_config_from_api(id, summary, detail));
        }
        Ok((configs, statuses))
    }
}

// ── Degradation helpers ──────────────────────────────────────────────

/// An optional list endpoint: errors become an empty list, except auth.
fn optional<T>(
    endpoint: &str,
    result: Result<Vec<T>, sitemgr_api::Error>,
) -> Result<Vec<T>, CoreError> {
    match result {
        Ok(items) => Ok(items),
        Err(e) if e.is_auth_failure() => Err(CoreError::during_refresh(endpoint, e)),
        Err(e) => {
            warn!(endpoint, error = %e, "fetch failed, treating as empty (non-fatal)");
            Ok(Vec::new())
        }
    }
}

/// An optional per-item endpoint: errors leave the item absent, except auth.
fn optional_item<T>(
    endpoint: &str,
    id: &str,
    result: Result<Option<T>, sitemgr_api::Error>,
) -> Result<Option<T>, CoreError> {
    match result {
        Ok(item) => Ok(item),
        Err(e) if e.is_auth_failure() => Err(CoreError::during_refresh(endpoint, e)),
        Err(e) => {
            warn!(endpoint, id, error = %e, "fetch failed, leaving absent (non-fatal)");
            Ok(None)
        }
    }
}
