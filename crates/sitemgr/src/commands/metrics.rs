//! ISP metrics command handler.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use sitemgr_core::{IspSample, MetricCategory};

use crate::cli::{GlobalOpts, MetricsArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output::Printer;

use super::util;

/// One sample tagged with its category and timestamp.
#[derive(Serialize)]
struct MetricPoint {
    category: MetricCategory,
    time: String,
    #[serde(flatten)]
    sample: IspSample,
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Avg ms")]
    avg_latency: String,
    #[tabled(rename = "Max ms")]
    max_latency: String,
    #[tabled(rename = "Loss %")]
    packet_loss: String,
    #[tabled(rename = "Down kbps")]
    download: String,
    #[tabled(rename = "Up kbps")]
    upload: String,
    #[tabled(rename = "ISP")]
    isp: String,
}

impl From<&MetricPoint> for MetricRow {
    fn from(p: &MetricPoint) -> Self {
        let s = &p.sample;
        Self {
            category: p.category.to_string(),
            time: p.time.clone(),
            avg_latency: util::cell(s.avg_latency),
            max_latency: util::cell(s.max_latency),
            packet_loss: util::cell(s.packet_loss),
            download: util::cell(s.download_kbps),
            upload: util::cell(s.upload_kbps),
            isp: s.isp_name.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(resolved: &Resolved, args: &MetricsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = util::fetch_snapshot(resolved, global).await?;
    util::find_site(&snapshot, &args.site)?;

    let points: Vec<MetricPoint> = match snapshot.isp_metrics.get(&args.site) {
        None => Vec::new(),
        Some(metrics) => match args.category {
            // Every sample of one category
            Some(category) => {
                let category = MetricCategory::from(category);
                metrics
                    .get(category)
                    .samples()
                    .map(|(time, sample)| MetricPoint {
                        category,
                        time: time.clone(),
                        sample: sample.clone(),
                    })
                    .collect()
            }
            // Latest sample per category
            None => MetricCategory::iter()
                .filter_map(|category| {
                    metrics.get(category).latest().map(|(time, sample)| MetricPoint {
                        category,
                        time: time.to_owned(),
                        sample: sample.clone(),
                    })
                })
                .collect(),
        },
    };

    if points.is_empty() && !global.quiet {
        eprintln!("No ISP metrics for site '{}'", args.site);
    }

    Printer::new(global).list(
        &points,
        |p| MetricRow::from(p),
        |p| format!("{}\t{}", p.category, p.time),
    );
    Ok(())
}
