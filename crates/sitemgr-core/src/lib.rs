//! Refresh pipeline between `sitemgr-api` and entity consumers.
//!
//! This crate turns raw Site Manager responses into a coherent, published
//! view of an account:
//!
//! - **[`Refresher`]** runs one dependency-ordered cycle (sites, hosts,
//!   devices, SD-WAN, ISP metrics) and returns a complete [`Snapshot`].
//!   Optional fetches degrade to empty data; an authentication failure on
//!   any fetch is fatal for the cycle.
//!
//! - **[`Coordinator`]** schedules cycles on a fixed interval, publishes the
//!   snapshot and projected [`EntitySet`] by pointer swap, and broadcasts a
//!   [`RefreshStatus`] on a `watch` channel ([`StatusStream`]).
//!
//! - **Entity projection** ([`entity`]) maps a snapshot onto stable entity
//!   keys with names, states and attributes. [`EntityReconciler`] diffs
//!   successive projections against an injected [`EntityRegistry`].
//!
//! - **Domain model** ([`model`]) holds the canonical types. ISP metric
//!   series are split per site and category by [`metrics`].

mod convert;

pub mod coordinator;
pub mod entity;
pub mod error;
pub mod metrics;
pub mod model;
pub mod refresh;
pub mod registry;
pub mod snapshot;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use coordinator::{Coordinator, CoordinatorConfig, DEFAULT_REFRESH_INTERVAL, RefreshStatus};
pub use entity::{Entity, EntityKind, EntitySet, ProjectionOptions, STATE_UNKNOWN, project};
pub use error::CoreError;
pub use refresh::Refresher;
pub use registry::{EntityReconciler, EntityRegistry, MemoryRegistry, prune_unselected};
pub use snapshot::Snapshot;
pub use stream::StatusStream;

pub use model::{
    Device, DeviceState, EntityKey, Host, IspSample, MacAddress, MetricCategory, MetricSeries,
    SdWanConfig, SdWanNode, SdWanNodeStatus, SdWanStatus, Site, SiteIspMetrics, SiteStats,
    WanLinkStatus,
};
