//! Site command handler.

use tabled::Tabled;

use sitemgr_core::{Site, Snapshot};

use crate::cli::GlobalOpts;
use crate::config::Resolved;
use crate::error::CliError;
use crate::output::Printer;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Devices")]
    devices: String,
    #[tabled(rename = "Offline")]
    offline: String,
    #[tabled(rename = "Clients")]
    clients: String,
    #[tabled(rename = "ISP")]
    isp: String,
}

fn site_row(snapshot: &Snapshot, site: &Site, out: &Printer) -> SiteRow {
    let stats = &site.stats;
    let clients = match (stats.wifi_clients, stats.wired_clients) {
        (None, None) => None,
        (wifi, wired) => Some(wifi.unwrap_or(0) + wired.unwrap_or(0)),
    };
    let state = if site.is_online() { "online" } else { "offline" };
    SiteRow {
        id: site.id.clone(),
        name: site.label().to_owned(),
        host: snapshot.site_host_name(site).unwrap_or_default(),
        state: out.state(state),
        devices: util::cell(stats.total_devices),
        offline: util::cell(stats.offline_devices),
        clients: util::cell(clients),
        isp: stats.isp_name.clone().unwrap_or_default(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = util::fetch_snapshot(resolved, global).await?;
    let selection = &resolved.coordinator.projection;
    let sites: Vec<Site> = snapshot
        .sites
        .iter()
        .filter(|s| selection.is_selected(&s.id))
        .cloned()
        .collect();

    let out = Printer::new(global);
    out.list(&sites, |s| site_row(&snapshot, s, &out), |s| s.id.clone());
    Ok(())
}
