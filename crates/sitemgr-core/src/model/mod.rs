// ── Domain model ──
//
// Canonical types built from Site Manager responses. Everything the
// refresher publishes is expressed in these types; raw wire structs never
// leave `convert`.

pub mod device;
pub mod entity_id;
pub mod host;
pub mod isp;
pub mod sdwan;
pub mod site;

pub use device::{Device, DeviceState};
pub use entity_id::{EntityKey, MacAddress};
pub use host::Host;
pub use isp::{IspSample, MetricCategory, MetricSeries, SiteIspMetrics};
pub use sdwan::{SdWanConfig, SdWanNode, SdWanNodeStatus, SdWanStatus, WanLinkStatus};
pub use site::{Site, SiteStats};
