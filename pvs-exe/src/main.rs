//! `rough-pvs`: builds the rough PVS for a synthetic grid level and reports
//! what it found.

mod cli;
mod config;
mod progress;

use cli::*;
use mimalloc::MiMalloc;
use simplelog::TermLogger;
use std::error::Error;
use std::fmt;
use std::time::Instant;

use crate::config::UserConfig;
use crate::progress::BuildProgress;
use pvs::log::{self, info, warn};
use pvs::synth::{carved_grid_level, grid_level};
use pvs::{
    BuildConfig, LeafVis, LevelGeometry, NullProgress, PvsInfo, build_portal_graph,
    build_pvs_or_fallback, fallback_on_error,
};

const BASE_DIR: &str = "rough-pvs/";

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Two builds of the same level that disagree
#[derive(Debug)]
struct CompareError {
    threads: usize,
    other: usize,
    leaf: usize,
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "builds with {} and {} threads differ at leaf {}",
            self.threads, self.other, self.leaf
        )
    }
}

impl Error for CompareError {}

fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();

    TermLogger::init(
        options.verbose.unwrap_or(log::LevelFilter::Info),
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut user_config = UserConfig::load()?;
    user_config.sync_cli(&mut options);
    user_config.write()?;

    let level = match options.seed {
        Some(seed) => carved_grid_level(options.width, options.height, seed),
        None => grid_level(options.width, options.height),
    };
    info!(
        "Level: {}x{} grid, {} subsectors, {} segs",
        options.width,
        options.height,
        level.num_subsectors(),
        level.num_segs()
    );

    let mut config = user_config.build_config();
    config.enabled = !options.no_vis;

    let start = Instant::now();
    let (vis, portals) = build(&level, &config, &options, user_config.interactive)?;
    info!("Total time: {:.2}s", start.elapsed().as_secs_f32());

    print_summary(&vis, portals);

    #[cfg(feature = "hprof")]
    coarse_prof::write(&mut std::io::stdout())?;
    Ok(())
}

/// Build the table, and the comparison build if one was asked for. Returns
/// the table and the number of portals it was built from.
fn build(
    level: &LevelGeometry,
    config: &BuildConfig,
    options: &CLIOptions,
    interactive: bool,
) -> Result<(LeafVis, usize), Box<dyn Error>> {
    if !config.enabled {
        return Ok((build_pvs_or_fallback(level, config, &mut NullProgress)?, 0));
    }
    let mut nfo = match PvsInfo::from_level(level) {
        Ok(nfo) => nfo,
        Err(e) => return Ok((fallback_on_error(Err(e), level.num_subsectors())?, 0)),
    };

    let built = build_portal_graph(&nfo, config, &mut BuildProgress::new(interactive));
    let vis = fallback_on_error(built, nfo.num_leaves())?;
    if vis.is_fallback() {
        return Ok((vis, nfo.num_portals()));
    }

    if let Some(other) = options.compare {
        info!("Rebuilding with {} threads to compare", other);
        nfo.clear_results();
        let other_config = config.clone().with_threads(other);
        let other_vis = build_portal_graph(&nfo, &other_config, &mut NullProgress)?;
        if let Some(leaf) = (0..vis.num_leaves()).find(|l| vis.row(*l) != other_vis.row(*l)) {
            return Err(Box::new(CompareError {
                threads: config.thread_count(),
                other: other_config.thread_count(),
                leaf,
            }));
        }
        info!("Builds match");
    }

    Ok((vis, nfo.num_portals()))
}

fn print_summary(vis: &LeafVis, portals: usize) {
    let leaves = vis.num_leaves();
    if vis.is_fallback() {
        warn!("No vis data, every leaf sees every other leaf");
    }
    info!("Leaves: {}", leaves);
    info!("Portals: {}", portals);
    info!(
        "Average visible leaves: {:.1}",
        vis.visible_count() as f32 / leaves.max(1) as f32
    );
    info!("Memory: {:.1} KiB", vis.memory_usage() as f32 / 1024.0);
}
