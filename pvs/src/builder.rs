//! Entry points for building the PVS of a whole level.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::{debug, info, warn};
use std::time::Instant;

use crate::PvsError;
use crate::leaf_vis::LeafVis;
use crate::level::LevelGeometry;
use crate::portals::PvsInfo;
use crate::scheduler::{BuildConfig, ProgressSink, run_portal_vis};

/// Build the rough PVS for `level`.
///
/// Creates the portal graph, computes every portal on the worker pool, and
/// merges the portal results into one row per leaf. Any error aborts the
/// build, nothing partial is returned.
pub fn build_pvs<S: ProgressSink>(
    level: &LevelGeometry,
    config: &BuildConfig,
    sink: &mut S,
) -> Result<LeafVis, PvsError> {
    #[cfg(feature = "hprof")]
    profile!("build_pvs");
    info!("building PVS...");
    let start = Instant::now();

    let nfo = PvsInfo::from_level(level)?;
    let vis = build_portal_graph(&nfo, config, sink)?;

    info!(
        "PVS building (rough) complete in {:.2}s",
        start.elapsed().as_secs_f32()
    );
    Ok(vis)
}

/// Same as `build_pvs`, for a portal graph that already exists
pub fn build_portal_graph<S: ProgressSink>(
    nfo: &PvsInfo,
    config: &BuildConfig,
    sink: &mut S,
) -> Result<LeafVis, PvsError> {
    let threads = config.thread_count();
    debug!(
        "PVS: {} leaves, {} bytes ({} longs) of result per portal",
        nfo.num_leaves(),
        nfo.bitbytes(),
        nfo.bitlongs()
    );
    info!(
        "using {} thread{} for PVS builder",
        threads,
        if threads != 1 { "s" } else { "" }
    );

    let start = Instant::now();
    run_portal_vis(nfo, config, sink)?;
    info!(
        "Portal vis for {} portals took {:.2}ms",
        nfo.num_portals(),
        start.elapsed().as_secs_f32() * 1000.0
    );

    LeafVis::from_portals(nfo)
}

/// Build the PVS, or hand back the all-visible table when the level can't be
/// vised.
///
/// Only a level that can't be turned into a usable portal graph falls back.
/// Worker pool failures still abort.
pub fn build_pvs_or_fallback<S: ProgressSink>(
    level: &LevelGeometry,
    config: &BuildConfig,
    sink: &mut S,
) -> Result<LeafVis, PvsError> {
    if !config.enabled {
        info!("PVS disabled, everything is visible");
        return Ok(LeafVis::all_visible(level.num_subsectors()));
    }

    fallback_on_error(build_pvs(level, config, sink), level.num_subsectors())
}

/// Swap a non-fatal build error for the all-visible table of `num_leaves`
/// leaves. Worker pool failures are passed through.
pub fn fallback_on_error(
    result: Result<LeafVis, PvsError>,
    num_leaves: usize,
) -> Result<LeafVis, PvsError> {
    match result {
        Ok(vis) => Ok(vis),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!("PVS building failed: {e}");
            Ok(LeafVis::all_visible(num_leaves))
        }
    }
}
