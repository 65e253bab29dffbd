//! Host command handler.

use tabled::Tabled;

use sitemgr_core::Host;

use crate::cli::{GlobalOpts, HostsArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output::{self, Printer};

use super::util;

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Hardware")]
    hardware: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
    #[tabled(rename = "Owner")]
    owner: String,
}

impl From<&Host> for HostRow {
    fn from(h: &Host) -> Self {
        Self {
            id: h.id.clone(),
            name: h.display_name().unwrap_or_default(),
            hardware: h
                .hardware_name
                .clone()
                .or_else(|| h.hardware_shortname.clone())
                .unwrap_or_default(),
            ip: util::cell(h.ip),
            firmware: h.firmware_version.clone().unwrap_or_default(),
            owner: if h.owner { "yes" } else { "no" }.into(),
        }
    }
}

fn detail(h: &Host) -> String {
    output::detail(&[
        ("ID", h.id.clone()),
        ("Hostname", h.hostname.clone().unwrap_or_default()),
        ("Display name", h.display_name().unwrap_or_default()),
        ("Hardware", h.hardware_name.clone().unwrap_or_default()),
        ("Shortname", h.hardware_shortname.clone().unwrap_or_default()),
        ("Type", h.host_type.clone().unwrap_or_default()),
        ("IP", util::cell(h.ip)),
        ("Firmware", h.firmware_version.clone().unwrap_or_default()),
        ("Blocked", h.is_blocked.to_string()),
        ("Owner", h.owner.to_string()),
    ])
}

pub async fn handle(resolved: &Resolved, args: HostsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let out = Printer::new(global);
    match args.id {
        Some(id) => {
            let host = resolved.refresher().host(&id).await?;
            out.single(&host, detail, |h| h.id.clone());
        }
        None => {
            let snapshot = util::fetch_snapshot(resolved, global).await?;
            out.list(&snapshot.hosts, |h| HostRow::from(h), |h| h.id.clone());
        }
    }
    Ok(())
}
