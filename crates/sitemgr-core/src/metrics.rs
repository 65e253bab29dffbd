// ── ISP metric extraction ──
//
// Turns the account-wide `isp-metrics/{interval}` response into per-site
// series. Filtering and projection are pure functions of the response.

use std::collections::BTreeMap;

use sitemgr_api::types::{IspMetricsResponse, WanMetrics};

use crate::model::{IspSample, MetricCategory, MetricSeries, SiteIspMetrics};

fn sample_from_wan(entry: &IspMetricsResponse, wan: &WanMetrics) -> IspSample {
    IspSample {
        metric_type: entry.metric_type.clone(),
        host_id: entry.host_id.clone(),
        avg_latency: wan.avg_latency,
        max_latency: wan.max_latency,
        download_kbps: wan.download_kbps,
        upload_kbps: wan.upload_kbps,
        packet_loss: wan.packet_loss,
        isp_name: wan.isp_name.clone(),
        isp_asn: wan.isp_asn.clone(),
        uptime: wan.uptime,
        downtime: wan.downtime,
    }
}

/// Every WAN sample reported for `site_id`, keyed by `metricTime`.
///
/// Periods without a timestamp or a `wan` block are skipped. An unknown
/// site yields an empty series.
pub fn site_series(entries: &[IspMetricsResponse], site_id: &str) -> MetricSeries {
    let mut series = MetricSeries::default();
    for entry in entries
        .iter()
        .filter(|e| e.site_id.as_deref() == Some(site_id))
    {
        for period in &entry.periods {
            let Some(time) = period.metric_time.as_ref() else {
                continue;
            };
            let Some(wan) = period.data.as_ref().and_then(|d| d.wan.as_ref()) else {
                continue;
            };
            series.insert(time.clone(), sample_from_wan(entry, wan));
        }
    }
    series
}

/// One category view for one site.
pub fn extract(
    entries: &[IspMetricsResponse],
    site_id: &str,
    category: MetricCategory,
) -> MetricSeries {
    site_series(entries, site_id).project(category)
}

/// All four category views for every site in `site_ids`.
///
/// Sites absent from the response still get an (empty) slot.
pub fn extract_all<'a>(
    entries: &[IspMetricsResponse],
    site_ids: impl IntoIterator<Item = &'a str>,
) -> BTreeMap<String, SiteIspMetrics> {
    site_ids
        .into_iter()
        .map(|id| {
            let raw = site_series(entries, id);
            (id.to_owned(), SiteIspMetrics::from_series(&raw))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn two_site_response() -> Vec<IspMetricsResponse> {
        serde_json::from_value(json!([
            {
                "metricType": "5m",
                "siteId": "A",
                "hostId": "HA",
                "periods": [
                    { "metricTime": "2024-06-01T10:00:00Z", "data": { "wan": {
                        "avgLatency": 10, "maxLatency": 30, "download_kbps": 50000,
                        "upload_kbps": 10000, "packetLoss": 0.0, "ispName": "Fiber Co",
                        "ispAsn": "AS64500", "uptime": 100, "downtime": 0
                    }}},
                    { "metricTime": "2024-06-01T10:05:00Z", "data": { "wan": {
                        "avgLatency": 12, "maxLatency": 35, "download_kbps": 48000,
                        "upload_kbps": 9000, "packetLoss": 1.5, "ispName": "Fiber Co",
                        "ispAsn": "AS64500", "uptime": 100, "downtime": 0
                    }}}
                ]
            },
            {
                "metricType": "5m",
                "siteId": "B",
                "hostId": "HB",
                "periods": [
                    { "metricTime": "2024-06-01T10:00:00Z", "data": { "wan": { "avgLatency": 99 } } },
                    { "metricTime": "2024-06-01T10:10:00Z", "data": { "wan": { "avgLatency": 98 } } }
                ]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn latency_view_is_filtered_by_site_and_projected() {
        let entries = two_site_response();
        let latency = extract(&entries, "A", MetricCategory::Latency);

        assert_eq!(latency.len(), 2);
        let t1 = latency.get("2024-06-01T10:00:00Z").unwrap();
        assert_eq!(
            *t1,
            IspSample {
                avg_latency: Some(10.0),
                max_latency: Some(30.0),
                ..IspSample::default()
            }
        );

        let (time, latest) = latency.latest().unwrap();
        assert_eq!(time, "2024-06-01T10:05:00Z");
        assert_eq!(latest.avg_latency, Some(12.0));
        assert!(latency.get("2024-06-01T10:10:00Z").is_none(), "site B leaked in");
    }

    #[test]
    fn bandwidth_and_packet_loss_views() {
        let entries = two_site_response();

        let bandwidth = extract(&entries, "A", MetricCategory::Bandwidth);
        let latest = bandwidth.latest().unwrap().1;
        assert_eq!(latest.download_kbps, Some(48000.0));
        assert_eq!(latest.upload_kbps, Some(9000.0));
        assert_eq!(latest.avg_latency, None);

        let loss = extract(&entries, "A", MetricCategory::PacketLoss);
        assert_eq!(loss.latest().unwrap().1.packet_loss, Some(1.5));
    }

    #[test]
    fn wan_view_keeps_every_field() {
        let entries = two_site_response();
        let wan = extract(&entries, "A", MetricCategory::Wan);
        let latest = wan.latest().unwrap().1;

        assert_eq!(latest.metric_type.as_deref(), Some("5m"));
        assert_eq!(latest.host_id.as_deref(), Some("HA"));
        assert_eq!(latest.isp_asn.as_deref(), Some("AS64500"));
        assert_eq!(latest.uptime, Some(100.0));
        assert_eq!(latest.avg_latency, Some(12.0));
    }

    #[test]
    fn unknown_site_and_gaps_yield_empty() {
        let mut entries = two_site_response();
        entries.push(
            serde_json::from_value(json!({
                "siteId": "C",
                "periods": [
                    { "metricTime": "2024-06-01T10:00:00Z" },
                    { "data": { "wan": { "avgLatency": 1 } } }
                ]
            }))
            .unwrap(),
        );

        assert!(extract(&entries, "C", MetricCategory::Wan).is_empty());
        assert!(extract(&entries, "Z", MetricCategory::Latency).is_empty());
    }

    #[test]
    fn extract_all_gives_every_site_a_slot() {
        let entries = two_site_response();
        let all = extract_all(&entries, ["A", "B", "Z"]);

        assert_eq!(all.len(), 3);
        assert_eq!(all["A"].latency.len(), 2);
        assert_eq!(
            all["B"].latest(MetricCategory::Latency).unwrap().avg_latency,
            Some(98.0)
        );
        assert!(all["Z"].is_empty());
    }
}
