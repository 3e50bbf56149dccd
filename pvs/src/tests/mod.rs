//! Whole-build scenarios, run through the worker pool.


use std::time::Duration;

use math::{Plane2D, Vec2D, Winding};

use crate::level::{LevelGeometry, LevelSeg, LevelSubsector};
use crate::portals::Portal;
use crate::scheduler::BuildConfig;

/// Report on every claim so small builds still exercise the progress path
fn chatty(threads: usize) -> BuildConfig {
    BuildConfig {
        report_every: 1,
        report_interval: Duration::ZERO,
        ..BuildConfig::interactive()
    }
    .with_threads(threads)
}

/// Axis aligned box as a clockwise run of segs. `left_splits` lists extra
/// vertices on the left edge, bottom to top.
fn boxed(x0: f64, y0: f64, x1: f64, y1: f64, left_splits: &[f64]) -> Vec<LevelSeg> {
    let p = Vec2D::new;
    let mut segs = vec![
        LevelSeg::new(p(x0, y1), p(x1, y1), None),
        LevelSeg::new(p(x1, y1), p(x1, y0), None),
        LevelSeg::new(p(x1, y0), p(x0, y0), None),
    ];
    let mut y = y0;
    for &split in left_splits.iter().chain(std::iter::once(&y1)) {
        segs.push(LevelSeg::new(p(x0, y), p(x0, split), None));
        y = split;
    }
    segs
}

/// Stack the runs into a level, one subsector per run
fn level_from_runs(runs: Vec<Vec<LevelSeg>>) -> LevelGeometry {
    let mut segs = Vec::new();
    let mut subsectors = Vec::new();
    for run in runs {
        subsectors.push(LevelSubsector::new(segs.len(), run.len()));
        segs.extend(run);
    }
    LevelGeometry::new(segs, subsectors)
}

fn partner(level: &mut LevelGeometry, a: usize, b: usize) {
    level.segs[a].partner = Some(b);
    level.segs[b].partner = Some(a);
}

/// Unit squares L0 and L2 stacked on the left of the tall L1, and L3 to the
/// right of L1:
///
/// ```text
///  +----+----+----+
///  | L2 |    |    |
///  +----+ L1 | L3 |
///  | L0 |    |    |
///  +----+----+----+
/// ```
///
/// L0 and L2 are walled off from each other.
fn t_junction() -> LevelGeometry {
    let mut level = level_from_runs(vec![
        boxed(0.0, 0.0, 1.0, 1.0, &[]),
        boxed(1.0, 0.0, 2.0, 2.0, &[1.0]),
        boxed(0.0, 1.0, 1.0, 2.0, &[]),
        boxed(2.0, 0.0, 3.0, 2.0, &[]),
    ]);
    // L0 right / L1 lower left
    partner(&mut level, 1, 7);
    // L1 upper left / L2 right
    partner(&mut level, 8, 10);
    // L1 right / L3 left
    partner(&mut level, 5, 16);
    level
}

/// Portal on the vertical line `x` between `y0` and `y1`, facing +X into
/// `leaf` when `facing_pos_x`
fn vertical(x: f64, y0: f64, y1: f64, facing_pos_x: bool, leaf: usize) -> Portal {
    let (a, b) = (Vec2D::new(x, y0), Vec2D::new(x, y1));
    let plane = if facing_pos_x {
        Plane2D::from_points(a, b)
    } else {
        Plane2D::from_points(b, a)
    };
    Portal::new(plane, Winding::new(a, b), leaf)
}

/// Both directions of the boundary at `x` between `left` and `right`
fn doorway(x: f64, left: usize, right: usize) -> [(usize, Portal); 2] {
    [
        (left, vertical(x, 0.0, 1.0, true, right)),
        (right, vertical(x, 0.0, 1.0, false, left)),
    ]
}
