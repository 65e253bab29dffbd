//! Device command handler.

use std::collections::BTreeSet;

use tabled::Tabled;

use sitemgr_core::{Device, Snapshot};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output::Printer;

use super::util;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
    #[tabled(rename = "Host")]
    host: String,
}

fn device_row(d: &Device, out: &Printer) -> DeviceRow {
    DeviceRow {
        mac: util::cell(d.normalized_mac()),
        name: d.name.clone().unwrap_or_default(),
        model: d.model.clone().or_else(|| d.shortname.clone()).unwrap_or_default(),
        ip: util::cell(d.ip),
        state: out.state(&d.state.to_string()),
        firmware: d.firmware_version.clone().unwrap_or_default(),
        host: d.host_id.clone().unwrap_or_default(),
    }
}

/// Host ids behind the selected sites, or `None` when every site is selected.
fn selected_hosts(snapshot: &Snapshot, resolved: &Resolved) -> Option<BTreeSet<String>> {
    let selection = &resolved.coordinator.projection;
    if selection.selected_sites.is_empty() {
        return None;
    }
    Some(
        snapshot
            .sites
            .iter()
            .filter(|s| selection.is_selected(&s.id))
            .filter_map(|s| s.host_id.clone())
            .collect(),
    )
}

pub async fn handle(resolved: &Resolved, args: &DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = util::fetch_snapshot(resolved, global).await?;
    let hosts = selected_hosts(&snapshot, resolved);

    let devices: Vec<Device> = snapshot
        .devices
        .iter()
        .filter(|d| match &hosts {
            Some(hosts) => d.host_id.as_ref().is_some_and(|h| hosts.contains(h)),
            None => true,
        })
        .filter(|d| !args.offline || !d.state.is_online())
        .cloned()
        .collect();

    let out = Printer::new(global);
    out.list(&devices, |d| device_row(d, &out), |d| util::cell(d.mac.as_ref()));
    Ok(())
}
