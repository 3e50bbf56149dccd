use crate::{ON_EPSILON, Plane2D, Vec2D};

/// The cross-section of a portal: the two ends of the seg it was made from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Winding {
    /// Set when the winding is stored inside its portal rather than produced
    /// by clipping. The rough builder never clips, so this is always true for
    /// windings it creates.
    pub original: bool,
    pub points: [Vec2D; 2],
}

impl Winding {
    #[inline]
    pub const fn new(v1: Vec2D, v2: Vec2D) -> Self {
        Self {
            original: true,
            points: [v1, v2],
        }
    }

    /// True if at least one point is in front of `plane` by more than
    /// `ON_EPSILON`
    #[inline]
    pub fn check_positive_dist(&self, plane: &Plane2D) -> bool {
        self.points.iter().any(|p| plane.distance(*p) > ON_EPSILON)
    }

    /// True if at least one point is behind `plane` by more than `ON_EPSILON`
    #[inline]
    pub fn check_negative_dist(&self, plane: &Plane2D) -> bool {
        self.points.iter().any(|p| plane.distance(*p) < -ON_EPSILON)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.points[1] - self.points[0]).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_plane(x: f64) -> Plane2D {
        Plane2D::new(Vec2D::new(1.0, 0.0), x)
    }

    #[test]
    fn straddling_winding_is_both() {
        let w = Winding::new(Vec2D::new(-1.0, 0.0), Vec2D::new(1.0, 5.0));
        let plane = vertical_plane(0.0);
        assert!(w.check_positive_dist(&plane));
        assert!(w.check_negative_dist(&plane));
    }

    #[test]
    fn on_plane_winding_is_neither() {
        let w = Winding::new(Vec2D::new(2.0, 0.0), Vec2D::new(2.0 + ON_EPSILON * 0.5, 8.0));
        let plane = vertical_plane(2.0);
        assert!(!w.check_positive_dist(&plane));
        assert!(!w.check_negative_dist(&plane));
    }

    #[test]
    fn one_sided() {
        let w = Winding::new(Vec2D::new(3.0, 0.0), Vec2D::new(2.0, 1.0));
        let plane = vertical_plane(2.0);
        // One point on the plane, one in front
        assert!(w.check_positive_dist(&plane));
        assert!(!w.check_negative_dist(&plane));
        assert!(w.original);
    }

    #[test]
    fn length() {
        let w = Winding::new(Vec2D::new(0.0, 0.0), Vec2D::new(6.0, 8.0));
        assert_eq!(w.length(), 10.0);
    }
}
