//! SD-WAN command handler.

use serde::Serialize;
use tabled::Tabled;

use sitemgr_core::{STATE_UNKNOWN, SdWanConfig, SdWanNode, SdWanNodeStatus, SdWanStatus, Snapshot};

use crate::cli::GlobalOpts;
use crate::config::Resolved;
use crate::error::CliError;
use crate::output::Printer;

use super::util;

/// Flattened view of one config, hub or spoke.
#[derive(Serialize)]
struct TopologyRow {
    config_id: String,
    config: String,
    role: &'static str,
    node_id: Option<String>,
    name: String,
    site_id: Option<String>,
    state: String,
    tunnels_up: Option<u32>,
    tunnels_total: Option<u32>,
    errors: Vec<String>,
}

#[derive(Tabled)]
struct TopologyCells {
    #[tabled(rename = "Config")]
    config: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Tunnels")]
    tunnels: String,
}

fn cells(row: &TopologyRow, out: &Printer) -> TopologyCells {
    let tunnels = match (row.tunnels_up, row.tunnels_total) {
        (Some(up), Some(total)) => format!("{up}/{total}"),
        _ => String::new(),
    };
    TopologyCells {
        config: row.config.clone(),
        role: row.role.into(),
        name: row.name.clone(),
        site: row.site_id.clone().unwrap_or_default(),
        state: out.state(&row.state),
        tunnels,
    }
}

fn config_row(config: &SdWanConfig, status: Option<&SdWanStatus>) -> TopologyRow {
    TopologyRow {
        config_id: config.id.clone(),
        config: config.display_name(),
        role: "config",
        node_id: None,
        name: config.display_name(),
        site_id: None,
        state: status
            .and_then(|s| s.generate_status.as_deref())
            .filter(|s| !s.is_empty())
            .map_or_else(|| STATE_UNKNOWN.to_owned(), str::to_lowercase),
        tunnels_up: None,
        tunnels_total: None,
        errors: status.map(|s| s.errors.clone()).unwrap_or_default(),
    }
}

fn node_row(
    config: &SdWanConfig,
    node: &SdWanNode,
    status: Option<&SdWanNodeStatus>,
    role: &'static str,
) -> TopologyRow {
    TopologyRow {
        config_id: config.id.clone(),
        config: config.display_name(),
        role,
        node_id: Some(node.id.clone()),
        name: node
            .name
            .clone()
            .or_else(|| status.and_then(|s| s.name.clone()))
            .unwrap_or_else(|| node.id.clone()),
        site_id: node.site_id.clone(),
        state: status.map_or_else(|| STATE_UNKNOWN.to_owned(), SdWanNodeStatus::state),
        tunnels_up: status.map(|s| s.tunnels_up),
        tunnels_total: status.map(|s| s.tunnels_total),
        errors: status.map(|s| s.errors.clone()).unwrap_or_default(),
    }
}

fn topology(snapshot: &Snapshot) -> Vec<TopologyRow> {
    let mut rows = Vec::new();
    for config in &snapshot.sdwan_configs {
        let status = snapshot.sdwan_status(&config.id);
        rows.push(config_row(config, status));
        for hub in &config.hubs {
            rows.push(node_row(config, hub, status.and_then(|s| s.hub(&hub.id)), "hub"));
        }
        for spoke in &config.spokes {
            rows.push(node_row(
                config,
                spoke,
                status.and_then(|s| s.spoke(&spoke.id)),
                "spoke",
            ));
        }
    }
    rows
}

pub async fn handle(resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = util::fetch_snapshot(resolved, global).await?;
    let rows = topology(&snapshot);

    let out = Printer::new(global);
    out.list(
        &rows,
        |r| cells(r, &out),
        |r| r.node_id.clone().unwrap_or_else(|| r.config_id.clone()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> SdWanNode {
        SdWanNode {
            id: id.into(),
            name: None,
            site_id: Some("S1".into()),
            host_id: None,
            network_ids: Vec::new(),
        }
    }

    #[test]
    fn nodes_without_status_are_unknown() {
        let snapshot = Snapshot {
            sdwan_configs: vec![SdWanConfig {
                id: "c1".into(),
                name: None,
                config_type: None,
                variant: None,
                description: None,
                created_at: None,
                updated_at: None,
                settings: None,
                hubs: vec![node("h1")],
                spokes: vec![node("s1")],
                detail_loaded: true,
            }],
            ..Snapshot::default()
        };

        let rows = topology(&snapshot);
        let roles: Vec<_> = rows.iter().map(|r| r.role).collect();
        assert_eq!(roles, ["config", "hub", "spoke"]);
        assert_eq!(rows[0].name, "SDWAN-c1");
        assert!(rows.iter().all(|r| r.state == STATE_UNKNOWN));
        assert_eq!(rows[1].name, "h1");
    }
}
