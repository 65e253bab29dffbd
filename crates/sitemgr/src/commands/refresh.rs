//! One-shot refresh summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sitemgr_core::{Snapshot, project};

use crate::cli::GlobalOpts;
use crate::config::Resolved;
use crate::error::CliError;
use crate::output::{self, Printer};

use super::util;

#[derive(Debug, Serialize)]
struct RefreshSummary {
    profile: String,
    refreshed_at: DateTime<Utc>,
    hosts: usize,
    sites: usize,
    devices: usize,
    offline_devices: usize,
    sites_with_isp_metrics: usize,
    sdwan_configs: usize,
    entities: usize,
}

impl RefreshSummary {
    fn new(profile: &str, snapshot: &Snapshot, entities: usize, at: DateTime<Utc>) -> Self {
        Self {
            profile: profile.to_owned(),
            refreshed_at: at,
            hosts: snapshot.hosts.len(),
            sites: snapshot.sites.len(),
            devices: snapshot.devices.len(),
            offline_devices: snapshot
                .devices
                .iter()
                .filter(|d| !d.state.is_online())
                .count(),
            sites_with_isp_metrics: snapshot
                .isp_metrics
                .values()
                .filter(|m| !m.is_empty())
                .count(),
            sdwan_configs: snapshot.sdwan_configs.len(),
            entities,
        }
    }
}

fn detail(s: &RefreshSummary) -> String {
    output::detail(&[
        ("Profile", s.profile.clone()),
        ("Refreshed", s.refreshed_at.to_rfc3339()),
        ("Hosts", s.hosts.to_string()),
        ("Sites", s.sites.to_string()),
        ("Devices", format!("{} ({} offline)", s.devices, s.offline_devices)),
        ("ISP metrics", format!("{} sites", s.sites_with_isp_metrics)),
        ("SD-WAN configs", s.sdwan_configs.to_string()),
        ("Entities", s.entities.to_string()),
    ])
}

pub async fn handle(resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = util::fetch_snapshot(resolved, global).await?;
    let now = Utc::now();
    let entities = project(&snapshot, &resolved.coordinator.projection, now).len();
    let summary = RefreshSummary::new(&resolved.profile_name, &snapshot, entities, now);

    Printer::new(global).single(&summary, detail, |s| s.entities.to_string());
    Ok(())
}
