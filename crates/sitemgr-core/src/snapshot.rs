// ── Snapshot ──
//
// Everything one refresh cycle learned, frozen. Published behind an
// `Arc` and replaced wholesale by the next successful cycle.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Device, Host, SdWanConfig, SdWanStatus, Site, SiteIspMetrics};

/// Aggregate result of one refresh cycle.
///
/// Collections keep response order; keyed data lives in ordered maps so two
/// cycles over identical responses compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub hosts: Vec<Host>,
    pub sites: Vec<Site>,
    pub devices: Vec<Device>,
    /// Keyed by site id.
    pub isp_metrics: BTreeMap<String, SiteIspMetrics>,
    pub sdwan_configs: Vec<SdWanConfig>,
    /// Keyed by config id. Missing when the status fetch failed.
    pub sdwan_statuses: BTreeMap<String, SdWanStatus>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
            && self.hosts.is_empty()
            && self.devices.is_empty()
            && self.sdwan_configs.is_empty()
    }

    pub fn host(&self, host_id: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.id == host_id)
    }

    pub fn site(&self, site_id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == site_id)
    }

    /// Display name of the host owning `site`, if it resolves.
    pub fn site_host_name(&self, site: &Site) -> Option<String> {
        site.host_id
            .as_deref()
            .and_then(|id| self.host(id))
            .and_then(crate::model::Host::display_name)
    }

    /// Devices reported under the host that owns `site`.
    pub fn site_devices<'a>(&'a self, site: &'a Site) -> impl Iterator<Item = &'a Device> + 'a {
        self.devices.iter().filter(move |d| {
            d.host_id.is_some() && d.host_id.as_deref() == site.host_id.as_deref()
        })
    }

    pub fn sdwan_status(&self, config_id: &str) -> Option<&SdWanStatus> {
        self.sdwan_statuses.get(config_id)
    }

    /// Sites that can be offered for selection, as `site_id -> "{host}-site"`.
    ///
    /// Sites whose host does not resolve are left out.
    pub fn discover_sites(&self) -> BTreeMap<String, String> {
        self.sites
            .iter()
            .filter_map(|site| {
                let host = self.site_host_name(site)?;
                Some((site.id.clone(), format!("{host}-site")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::SiteStats;

    fn site(id: &str, host_id: Option<&str>) -> Site {
        Site {
            id: id.into(),
            host_id: host_id.map(Into::into),
            name: None,
            description: None,
            timezone: None,
            gateway_mac: None,
            permission: None,
            is_owner: true,
            stats: SiteStats::default(),
        }
    }

    fn host(id: &str, hostname: &str) -> Host {
        Host {
            id: id.into(),
            hostname: Some(hostname.into()),
            hardware_shortname: None,
            hardware_name: None,
            host_type: None,
            ip: None,
            firmware_version: None,
            is_blocked: false,
            owner: true,
        }
    }

    #[test]
    fn discover_skips_sites_without_a_resolvable_host() {
        let snapshot = Snapshot {
            hosts: vec![host("H1", "Office"), host("H2", "Lab")],
            sites: vec![site("S1", Some("H1")), site("S2", Some("H9")), site("S3", None)],
            ..Snapshot::default()
        };

        let found = snapshot.discover_sites();
        assert_eq!(
            found.into_iter().collect::<Vec<_>>(),
            vec![("S1".to_owned(), "office-site".to_owned())]
        );
    }

    #[test]
    fn site_devices_match_on_host() {
        let device = |host: Option<&str>| Device {
            id: Some("D".into()),
            mac: None,
            name: None,
            model: None,
            shortname: None,
            product_line: None,
            ip: None,
            firmware_version: None,
            firmware_status: None,
            status: None,
            state: crate::model::DeviceState::Offline,
            is_managed: false,
            adoption_time: None,
            last_seen: None,
            uptime: None,
            host_id: host.map(Into::into),
        };
        let snapshot = Snapshot {
            devices: vec![device(Some("H1")), device(Some("H2")), device(None)],
            ..Snapshot::default()
        };

        assert_eq!(snapshot.site_devices(&site("S1", Some("H1"))).count(), 1);
        assert_eq!(snapshot.site_devices(&site("S3", None)).count(), 0);
    }
}
