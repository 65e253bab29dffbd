// Site Manager API client for the UniFi cloud (api.ui.com).
//
// Hand-crafted async HTTP client over the read-only `/ea/` endpoints.
// Uses X-API-KEY authentication and `{ "data": ... }` response envelopes.

pub mod client;
pub mod types;

pub use client::{
    DEFAULT_BASE_URL, Endpoints, METRIC_TIME_FORMAT, MetricInterval, MetricWindow,
    SiteManagerClient,
};
