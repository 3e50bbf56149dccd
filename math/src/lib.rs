//! 2D geometry used by the PVS builder.
//!
//! Portals are vertical walls in a 2.5D level, so everything the reject tests
//! need can be done on the XY cross-section: a line segment (`Winding`) and the
//! half-plane it lies on (`Plane2D`), all in double precision.

mod plane;
pub mod random;
mod winding;

pub use glam::DVec2;
pub use plane::*;
pub use winding::*;

/// A 2D point or direction in map space
pub type Vec2D = DVec2;

/// Distance from a plane inside which a point is considered to be on it
pub const ON_EPSILON: f64 = 0.001;

/// Signed distance of `point` from the line `normal . p == dist`
#[inline]
pub fn plane_distance(normal: Vec2D, dist: f64, point: Vec2D) -> f64 {
    normal.dot(point) - dist
}
