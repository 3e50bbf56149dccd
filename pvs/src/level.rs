//! The slice of a loaded level that the PVS builder needs: GL segs with their
//! partners, and the subsectors (leaves) that own runs of them.
//!
//! Loading these from a WAD or GL nodes lump is the loader's job, this module
//! only describes what it hands over.

use math::Vec2D;

use crate::PvsError;

/// A seg as produced by a GL nodes builder.
///
/// Segs run clockwise around their subsector, so the right hand side of
/// `v1 -> v2` faces into the subsector that owns the seg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSeg {
    pub v1: Vec2D,
    pub v2: Vec2D,
    /// The seg on the other side of the same boundary, running the opposite
    /// way in the neighbouring subsector. `None` for one-sided walls.
    pub partner: Option<usize>,
}

impl LevelSeg {
    pub const fn new(v1: Vec2D, v2: Vec2D, partner: Option<usize>) -> Self {
        Self { v1, v2, partner }
    }
}

/// A convex leaf of the BSP: a run of consecutive segs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSubsector {
    pub start_seg: usize,
    pub seg_count: usize,
}

impl LevelSubsector {
    pub const fn new(start_seg: usize, seg_count: usize) -> Self {
        Self {
            start_seg,
            seg_count,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct LevelGeometry {
    pub segs: Vec<LevelSeg>,
    pub subsectors: Vec<LevelSubsector>,
}

impl LevelGeometry {
    pub fn new(segs: Vec<LevelSeg>, subsectors: Vec<LevelSubsector>) -> Self {
        Self { segs, subsectors }
    }

    #[inline]
    pub fn num_segs(&self) -> usize {
        self.segs.len()
    }

    #[inline]
    pub fn num_subsectors(&self) -> usize {
        self.subsectors.len()
    }

    /// Map every seg to the subsector that owns it.
    ///
    /// Fails if a subsector's run goes past the end of the seg array, or if a
    /// seg (or a partner index) is left without an owner.
    pub fn seg_leaves(&self) -> Result<Vec<usize>, PvsError> {
        let mut leaves = vec![usize::MAX; self.segs.len()];
        for (i, ss) in self.subsectors.iter().enumerate() {
            let end = match ss.start_seg.checked_add(ss.seg_count) {
                Some(end) if end <= self.segs.len() => end,
                _ => return Err(PvsError::BadSubsector { subsector: i }),
            };
            leaves[ss.start_seg..end].fill(i);
        }

        if let Some(seg) = leaves.iter().position(|l| *l == usize::MAX) {
            log::warn!("PVS: seg {seg} is not part of any subsector");
            return Err(PvsError::BadSubsector {
                subsector: self.subsectors.len(),
            });
        }
        if let Some(seg) = self
            .segs
            .iter()
            .position(|s| s.partner.is_some_and(|p| p >= self.segs.len()))
        {
            log::warn!("PVS: seg {seg} has a partner outside the seg array");
            return Err(PvsError::BadSubsector {
                subsector: leaves[seg],
            });
        }
        Ok(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(partner: Option<usize>) -> LevelSeg {
        LevelSeg::new(Vec2D::ZERO, Vec2D::X, partner)
    }

    #[test]
    fn seg_leaves_follow_runs() {
        let level = LevelGeometry::new(
            vec![seg(None), seg(None), seg(None), seg(None), seg(None)],
            vec![LevelSubsector::new(0, 2), LevelSubsector::new(2, 3)],
        );
        assert_eq!(level.seg_leaves(), Ok(vec![0, 0, 1, 1, 1]));
    }

    #[test]
    fn run_past_end_is_rejected() {
        let level = LevelGeometry::new(
            vec![seg(None), seg(None)],
            vec![LevelSubsector::new(0, 1), LevelSubsector::new(1, 4)],
        );
        assert_eq!(
            level.seg_leaves(),
            Err(PvsError::BadSubsector { subsector: 1 })
        );
    }

    #[test]
    fn huge_run_is_rejected() {
        let level = LevelGeometry::new(
            vec![seg(None), seg(None)],
            vec![LevelSubsector::new(1, usize::MAX)],
        );
        assert_eq!(
            level.seg_leaves(),
            Err(PvsError::BadSubsector { subsector: 0 })
        );
    }

    #[test]
    fn orphan_seg_is_rejected() {
        let level = LevelGeometry::new(
            vec![seg(None), seg(None), seg(None)],
            vec![LevelSubsector::new(0, 2)],
        );
        assert!(level.seg_leaves().is_err());
    }

    #[test]
    fn dangling_partner_is_rejected() {
        let level = LevelGeometry::new(
            vec![seg(Some(7)), seg(None)],
            vec![LevelSubsector::new(0, 2)],
        );
        assert_eq!(
            level.seg_leaves(),
            Err(PvsError::BadSubsector { subsector: 0 })
        );
    }
}
