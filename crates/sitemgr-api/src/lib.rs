// sitemgr-api: Async Rust client for the UniFi Site Manager cloud API

pub mod error;
pub mod site_manager;
pub mod transport;

pub use error::Error;
pub use site_manager::types;
pub use site_manager::{
    DEFAULT_BASE_URL, Endpoints, METRIC_TIME_FORMAT, MetricInterval, MetricWindow,
    SiteManagerClient,
};
pub use transport::{DEFAULT_TIMEOUT, TlsMode, TransportConfig};
