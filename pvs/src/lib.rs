//! Rough potentially-visible-set builder for BSP levels.
//!
//! The leaves are the subsectors of a GL-noded level and the portals are the
//! partnered segs between them. Every portal is tested against every other
//! with a cheap two-plane reject, then the leaves reachable through the
//! portals that survive are flooded. The result is conservative: it may
//! claim a leaf is visible when it isn't, never the reverse.
//!
//! The per-portal work runs on a pool of worker threads pulling portal
//! numbers from a shared counter, see [`run_portal_vis`].

mod bits;
mod builder;
mod error;
mod flood;
mod leaf_vis;
pub mod level;
mod portals;
mod scheduler;
pub mod synth;

#[cfg(test)]
mod tests;

pub use bits::{VisBits, bytes_for};
pub use builder::{build_portal_graph, build_pvs, build_pvs_or_fallback, fallback_on_error};
pub use error::PvsError;
pub use flood::PortalVis;
pub use leaf_vis::LeafVis;
pub use level::{LevelGeometry, LevelSeg, LevelSubsector};
pub use portals::{MAX_PORTALS_ON_LEAF, Portal, PvsInfo, SubsectorExtra};
pub use scheduler::{
    BuildConfig, BuildContext, BuildState, MAX_THREADS, NullProgress, ProgressSink,
    default_threads, run_portal_vis,
};

pub use log;
