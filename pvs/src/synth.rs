//! Synthetic levels: grids of square subsectors.
//!
//! Cell `(x, y)` is subsector `y * width + x` and owns segs `4 * cell ..
//! 4 * cell + 4`, clockwise: top, right, bottom, left. Interior edges are
//! partnered unless carved into a wall.

use math::Vec2D;
use math::random::TableRandom;

use crate::level::{LevelGeometry, LevelSeg, LevelSubsector};

/// Edge length of a grid cell in map units
pub const CELL_SIZE: f64 = 64.0;

/// Out of 256, the chance that an interior edge becomes a wall when carving
const WALL_CHANCE: i32 = 64;

const TOP: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const LEFT: usize = 3;

/// A fully open `width` by `height` grid
pub fn grid_level(width: usize, height: usize) -> LevelGeometry {
    build_grid(width, height, |_| true)
}

/// A grid with roughly a quarter of the interior edges walled off, picked
/// with the Doom random table starting at `seed`
pub fn carved_grid_level(width: usize, height: usize, seed: u8) -> LevelGeometry {
    let mut rng = TableRandom::new(seed);
    build_grid(width, height, move |_| !rng.chance(WALL_CHANCE))
}

/// Directed portals in an open grid
pub const fn grid_portal_count(width: usize, height: usize) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    2 * (width * (height - 1) + height * (width - 1))
}

fn build_grid(
    width: usize,
    height: usize,
    mut open: impl FnMut((usize, usize)) -> bool,
) -> LevelGeometry {
    let cells = width * height;
    let mut segs = Vec::with_capacity(cells * 4);
    let mut subsectors = Vec::with_capacity(cells);

    for cy in 0..height {
        for cx in 0..width {
            let x0 = cx as f64 * CELL_SIZE;
            let y0 = cy as f64 * CELL_SIZE;
            let (x1, y1) = (x0 + CELL_SIZE, y0 + CELL_SIZE);

            subsectors.push(LevelSubsector::new(segs.len(), 4));
            segs.push(LevelSeg::new(Vec2D::new(x0, y1), Vec2D::new(x1, y1), None));
            segs.push(LevelSeg::new(Vec2D::new(x1, y1), Vec2D::new(x1, y0), None));
            segs.push(LevelSeg::new(Vec2D::new(x1, y0), Vec2D::new(x0, y0), None));
            segs.push(LevelSeg::new(Vec2D::new(x0, y0), Vec2D::new(x0, y1), None));
        }
    }

    let mut link = |a: usize, b: usize| {
        segs[a].partner = Some(b);
        segs[b].partner = Some(a);
    };
    for cy in 0..height {
        for cx in 0..width {
            let cell = cy * width + cx;
            if cx + 1 < width && open((cell, RIGHT)) {
                link(cell * 4 + RIGHT, (cell + 1) * 4 + LEFT);
            }
            if cy + 1 < height && open((cell, TOP)) {
                link(cell * 4 + TOP, (cell + width) * 4 + BOTTOM);
            }
        }
    }

    LevelGeometry::new(segs, subsectors)
}
