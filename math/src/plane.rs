use crate::{ON_EPSILON, Vec2D, plane_distance};

/// Which side of a `Plane2D` a point lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    Front,
    Back,
    On,
}

/// A vertical plane seen from above: a line with a unit normal.
///
/// Points `p` on the line satisfy `normal . p - dist == 0`. The positive side
/// is on the right of the direction the plane was built from, which for a seg
/// is the side facing into its own subsector.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Plane2D {
    pub normal: Vec2D,
    pub dist: f64,
}

impl Plane2D {
    #[inline]
    pub const fn new(normal: Vec2D, dist: f64) -> Self {
        Self { normal, dist }
    }

    /// Plane through `point` running along `dir`
    #[inline]
    pub fn from_point_dir(point: Vec2D, dir: Vec2D) -> Self {
        let mut plane = Self::default();
        plane.set_point_dir_xy(point, dir);
        plane
    }

    /// Plane running from `v1` to `v2`
    #[inline]
    pub fn from_points(v1: Vec2D, v2: Vec2D) -> Self {
        Self::from_point_dir(v1, v2 - v1)
    }

    /// Initialises the plane from a point and a direction. The direction is
    /// rotated clockwise by 90 degrees to get the normal.
    ///
    /// A zero-length `dir` gives a NaN normal, callers must not pass one.
    #[inline]
    pub fn set_point_dir_xy(&mut self, point: Vec2D, dir: Vec2D) {
        self.normal = Vec2D::new(dir.y, -dir.x).normalize();
        self.dist = point.dot(self.normal);
    }

    /// Initialises the plane from two points
    #[inline]
    pub fn set_2_points(&mut self, v1: Vec2D, v2: Vec2D) {
        self.set_point_dir_xy(v1, v2 - v1);
    }

    #[inline]
    pub fn distance(&self, point: Vec2D) -> f64 {
        plane_distance(self.normal, self.dist, point)
    }

    /// Classify `point` using `ON_EPSILON` as the on-plane band
    #[inline]
    pub fn classify(&self, point: Vec2D) -> PlaneSide {
        let d = self.distance(point);
        if d > ON_EPSILON {
            PlaneSide::Front
        } else if d < -ON_EPSILON {
            PlaneSide::Back
        } else {
            PlaneSide::On
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_is_right_hand() {
        // Heading +Y, the right side is +X
        let p = Plane2D::from_points(Vec2D::new(4.0, 0.0), Vec2D::new(4.0, 10.0));
        assert_eq!(p.normal, Vec2D::new(1.0, 0.0));
        assert_eq!(p.dist, 4.0);
        assert_eq!(p.classify(Vec2D::new(5.0, 3.0)), PlaneSide::Front);
        assert_eq!(p.classify(Vec2D::new(3.0, 3.0)), PlaneSide::Back);
        assert_eq!(p.classify(Vec2D::new(4.0, -30.0)), PlaneSide::On);
    }

    #[test]
    fn normal_is_unit_length() {
        let p = Plane2D::from_points(Vec2D::new(1.0, 1.0), Vec2D::new(7.0, 9.0));
        assert!((p.normal.length() - 1.0).abs() < 1e-12);
        // Both construction points sit on the plane
        assert!(p.distance(Vec2D::new(1.0, 1.0)).abs() < 1e-12);
        assert!(p.distance(Vec2D::new(7.0, 9.0)).abs() < 1e-12);
    }

    #[test]
    fn epsilon_band() {
        let p = Plane2D::new(Vec2D::new(0.0, 1.0), 0.0);
        assert_eq!(p.classify(Vec2D::new(0.0, ON_EPSILON * 0.5)), PlaneSide::On);
        assert_eq!(p.classify(Vec2D::new(0.0, -ON_EPSILON * 0.5)), PlaneSide::On);
        assert_eq!(p.classify(Vec2D::new(0.0, ON_EPSILON * 2.0)), PlaneSide::Front);
        assert_eq!(p.classify(Vec2D::new(0.0, -ON_EPSILON * 2.0)), PlaneSide::Back);
    }
}
