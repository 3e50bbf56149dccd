#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::warn;

use crate::PvsError;
use crate::bits::{VisBits, bytes_for};
use crate::portals::PvsInfo;

/// Leaf-to-leaf visibility table, one row of `rowbytes` bytes per leaf.
///
/// Row `from` has bit `to` set when leaf `to` is potentially visible from
/// anywhere in leaf `from`. Rows use the same bit layout as the per-portal
/// bits, so a writer can store them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafVis {
    num_leaves: usize,
    rowbytes: usize,
    data: Vec<u8>,
    fallback: bool,
}

impl LeafVis {
    /// An empty table for `num_leaves` leaves
    pub fn new(num_leaves: usize) -> Self {
        let rowbytes = bytes_for(num_leaves);
        Self {
            num_leaves,
            rowbytes,
            data: vec![0; rowbytes * num_leaves],
            fallback: false,
        }
    }

    /// The table used when a level can't be vised: everything sees
    /// everything
    pub fn all_visible(num_leaves: usize) -> Self {
        let mut vis = Self::new(num_leaves);
        vis.data.fill(0xff);
        vis.fallback = true;
        vis
    }

    /// Merge the results of every portal out of each leaf into that leaf's
    /// row, then mark the leaf as seeing itself.
    ///
    /// The portals of a convex leaf can never see back into it, so finding
    /// the leaf's own bit already set means the portal graph is broken.
    pub fn from_portals(nfo: &PvsInfo) -> Result<Self, PvsError> {
        #[cfg(feature = "hprof")]
        profile!("leaf_vis_from_portals");
        let mut vis = Self::new(nfo.num_leaves());
        for leaf in 0..nfo.num_leaves() {
            vis.leaf_flow(leaf, nfo)?;
        }
        Ok(vis)
    }

    fn leaf_flow(&mut self, leafnum: usize, nfo: &PvsInfo) -> Result<(), PvsError> {
        let mut row = VisBits::new(self.num_leaves);
        for &pnum in &nfo.subsector_extra(leafnum).portals {
            if let Some(visbits) = nfo.portal(pnum).visbits() {
                row.or_assign(visbits.as_bytes());
            }
        }

        if row.test_and_set(leafnum) {
            warn!("Leaf portals saw into leaf {leafnum}");
            return Err(PvsError::LeafSawItself { leaf: leafnum });
        }
        let start = leafnum * self.rowbytes;
        self.data[start..start + self.rowbytes].copy_from_slice(row.as_bytes());
        Ok(())
    }

    #[inline]
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    #[inline]
    pub fn rowbytes(&self) -> usize {
        self.rowbytes
    }

    /// True for the all-visible table
    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// The raw row for `leaf`
    #[inline]
    pub fn row(&self, leaf: usize) -> &[u8] {
        &self.data[leaf * self.rowbytes..(leaf + 1) * self.rowbytes]
    }

    /// All rows back to back, ready to be written out
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns true if leaf `to` is potentially visible from leaf `from`.
    /// Out of range leaves are never visible.
    pub fn is_visible(&self, from: usize, to: usize) -> bool {
        if from >= self.num_leaves || to >= self.num_leaves {
            return false;
        }
        self.row(from)[to >> 3] & (1 << (to & 7)) != 0
    }

    /// Returns all leaves visible from the given leaf
    pub fn visible_leaves(&self, from: usize) -> Vec<usize> {
        #[cfg(feature = "hprof")]
        profile!("leaf_vis_visible_leaves");
        (0..self.num_leaves)
            .filter(|to| self.is_visible(from, *to))
            .collect()
    }

    /// Total number of visible pairs, a leaf seeing itself included
    pub fn visible_count(&self) -> usize {
        (0..self.num_leaves)
            .map(|from| {
                (0..self.num_leaves)
                    .filter(|to| self.is_visible(from, *to))
                    .count()
            })
            .sum()
    }

    /// Returns memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use math::{Plane2D, Vec2D, Winding};

    use super::*;
    use crate::portals::Portal;

    #[test]
    fn fallback_sees_everything() {
        let vis = LeafVis::all_visible(11);
        assert!(vis.is_fallback());
        assert_eq!(vis.rowbytes(), 2);
        assert_eq!(vis.as_bytes().len(), 22);
        assert_eq!(vis.visible_leaves(4), (0..11).collect::<Vec<_>>());
        assert_eq!(vis.visible_count(), 121);
        assert!(!vis.is_visible(0, 11));
    }

    #[test]
    fn rows_merge_portal_bits() {
        let w = Winding::new(Vec2D::new(1.0, 0.0), Vec2D::new(1.0, 1.0));
        let plane = Plane2D::from_points(w.points[0], w.points[1]);
        let nfo = PvsInfo::from_portals(
            3,
            [(0, Portal::new(plane, w, 1)), (0, Portal::new(plane, w, 2))],
        )
        .unwrap();

        let mut a = VisBits::new(3);
        a.set(1);
        let mut b = VisBits::new(3);
        b.set(2);
        assert!(nfo.portal(0).store_visbits(a));
        assert!(nfo.portal(1).store_visbits(b));

        let vis = LeafVis::from_portals(&nfo).unwrap();
        assert!(!vis.is_fallback());
        assert_eq!(vis.visible_leaves(0), vec![0, 1, 2]);
        // Leaves without portals only see themselves
        assert_eq!(vis.visible_leaves(1), vec![1]);
        assert_eq!(vis.visible_leaves(2), vec![2]);
        assert_eq!(vis.visible_count(), 5);
    }

    #[test]
    fn portal_seeing_own_leaf_fails() {
        let w = Winding::new(Vec2D::new(1.0, 0.0), Vec2D::new(1.0, 1.0));
        let plane = Plane2D::from_points(w.points[0], w.points[1]);
        let nfo = PvsInfo::from_portals(2, [(0, Portal::new(plane, w, 1))]).unwrap();
        let mut bits = VisBits::new(2);
        bits.set(0);
        bits.set(1);
        assert!(nfo.portal(0).store_visbits(bits));
        assert_eq!(
            LeafVis::from_portals(&nfo).unwrap_err(),
            PvsError::LeafSawItself { leaf: 0 }
        );
    }
}
