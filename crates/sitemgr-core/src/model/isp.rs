// ── ISP metric types ──
//
// One sample per `metricTime`, grouped into four category views per site.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Category view over the WAN sample stream.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MetricCategory {
    Latency,
    PacketLoss,
    Bandwidth,
    Wan,
}

/// A flat WAN sample. Category views keep only their own fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IspSample {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_latency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_latency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_kbps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_kbps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packet_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isp_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isp_asn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downtime: Option<f64>,
}

impl IspSample {
    /// Keep only the fields relevant to `category`.
    pub fn project(&self, category: MetricCategory) -> Self {
        match category {
            MetricCategory::Latency => Self {
                avg_latency: self.avg_latency,
                max_latency: self.max_latency,
                ..Self::default()
            },
            MetricCategory::PacketLoss => Self {
                packet_loss: self.packet_loss,
                ..Self::default()
            },
            MetricCategory::Bandwidth => Self {
                download_kbps: self.download_kbps,
                upload_kbps: self.upload_kbps,
                ..Self::default()
            },
            MetricCategory::Wan => self.clone(),
        }
    }
}

/// Samples keyed by ISO-8601 `metricTime`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSeries(BTreeMap<String, IspSample>);

impl MetricSeries {
    pub fn insert(&mut self, metric_time: String, sample: IspSample) {
        self.0.insert(metric_time, sample);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, metric_time: &str) -> Option<&IspSample> {
        self.0.get(metric_time)
    }

    pub fn samples(&self) -> impl Iterator<Item = (&String, &IspSample)> {
        self.0.iter()
    }

    /// The newest sample, ordered by parsed timestamp.
    ///
    /// Keys that fail to parse sort by their raw text after every parsed
    /// key; for uniform `...Z` timestamps both orders agree.
    pub fn latest(&self) -> Option<(&str, &IspSample)> {
        self.0
            .iter()
            .max_by(|(a, _), (b, _)| compare_timestamps(a, b))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Category view of this series.
    pub fn project(&self, category: MetricCategory) -> Self {
        Self(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.project(category)))
                .collect(),
        )
    }
}

fn compare_timestamps(a: &str, b: &str) -> Ordering {
    match (
        DateTime::parse_from_rfc3339(a),
        DateTime::parse_from_rfc3339(b),
    ) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// All four category views for one site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteIspMetrics {
    pub latency: MetricSeries,
    pub packet_loss: MetricSeries,
    pub bandwidth: MetricSeries,
    pub wan: MetricSeries,
}

impl SiteIspMetrics {
    /// Build every category view from a site's raw series.
    pub fn from_series(raw: &MetricSeries) -> Self {
        Self {
            latency: raw.project(MetricCategory::Latency),
            packet_loss: raw.project(MetricCategory::PacketLoss),
            bandwidth: raw.project(MetricCategory::Bandwidth),
            wan: raw.project(MetricCategory::Wan),
        }
    }

    pub fn get(&self, category: MetricCategory) -> &MetricSeries {
        match category {
            MetricCategory::Latency => &self.latency,
            MetricCategory::PacketLoss => &self.packet_loss,
            MetricCategory::Bandwidth => &self.bandwidth,
            MetricCategory::Wan => &self.wan,
        }
    }

    /// Latest sample of one category.
    pub fn latest(&self, category: MetricCategory) -> Option<&IspSample> {
        self.get(category).latest().map(|(_, sample)| sample)
    }

    pub fn is_empty(&self) -> bool {
        self.latency.is_empty()
            && self.packet_loss.is_empty()
            && self.bandwidth.is_empty()
            && self.wan.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn sample(avg: f64) -> IspSample {
        IspSample {
            avg_latency: Some(avg),
            max_latency: Some(avg * 2.0),
            download_kbps: Some(1000.0),
            packet_loss: Some(0.5),
            isp_name: Some("Fiber Co".into()),
            ..IspSample::default()
        }
    }

    #[test]
    fn category_names() {
        assert_eq!(MetricCategory::PacketLoss.to_string(), "packet-loss");
        assert_eq!(
            MetricCategory::from_str("bandwidth").unwrap(),
            MetricCategory::Bandwidth
        );
    }

    #[test]
    fn latency_projection_drops_other_fields() {
        let projected = sample(10.0).project(MetricCategory::Latency);
        assert_eq!(projected.avg_latency, Some(10.0));
        assert_eq!(projected.max_latency, Some(20.0));
        assert_eq!(projected.download_kbps, None);
        assert_eq!(projected.packet_loss, None);
        assert_eq!(projected.isp_name, None);
    }

    #[test]
    fn latest_orders_by_time_not_insertion() {
        let mut series = MetricSeries::default();
        series.insert("2024-01-01T10:05:00Z".into(), sample(2.0));
        series.insert("2024-01-01T10:00:00Z".into(), sample(1.0));
        series.insert("2024-01-01T09:55:00Z".into(), sample(0.5));

        let (time, latest) = series.latest().unwrap();
        assert_eq!(time, "2024-01-01T10:05:00Z");
        assert_eq!(latest.avg_latency, Some(2.0));
    }

    #[test]
    fn latest_handles_offsets() {
        let mut series = MetricSeries::default();
        series.insert("2024-01-01T12:00:00+02:00".into(), sample(1.0));
        series.insert("2024-01-01T11:00:00Z".into(), sample(2.0));

        let (time, _) = series.latest().unwrap();
        assert_eq!(time, "2024-01-01T11:00:00Z");
    }

    #[test]
    fn empty_series_has_no_latest() {
        let metrics = SiteIspMetrics::default();
        assert!(metrics.is_empty());
        assert!(metrics.latest(MetricCategory::Wan).is_none());
    }
}
