//! Per-portal visibility: the two-plane reject test against every other
//! portal, then a flood through the leaves along the portals that survived.
//!
//! This is a rough first-order approximation. There is no separator clipping
//! afterwards, the flood result is the final answer for the portal.

#[cfg(feature = "hprof")]
use coarse_prof::profile;

use crate::bits::VisBits;
use crate::portals::PvsInfo;

/// Worker-side state for computing portal visibility.
///
/// Holds the scratch bits for "which portals survived the reject test
/// against the current source portal". One per worker thread, never shared.
pub struct PortalVis<'a> {
    nfo: &'a PvsInfo,
    portalsee: VisBits,
    stack: Vec<usize>,
}

impl<'a> PortalVis<'a> {
    pub fn new(nfo: &'a PvsInfo) -> Self {
        Self {
            nfo,
            portalsee: VisBits::new(nfo.num_portals()),
            stack: Vec::with_capacity(64),
        }
    }

    /// Compute and freeze the result for portal `pnum`. Returns false if the
    /// portal already had a result, which means it was claimed twice.
    pub fn process(&mut self, pnum: usize) -> bool {
        let mightsee = self.compute(pnum);
        self.nfo.portal(pnum).store_visbits(mightsee)
    }

    /// The leaves that might be seen through portal `pnum`, starting with the
    /// leaf it opens into
    pub fn compute(&mut self, pnum: usize) -> VisBits {
        #[cfg(feature = "hprof")]
        profile!("portal_vis_compute");
        let mut mightsee = VisBits::new(self.nfo.num_leaves());
        self.base_portal_vis(pnum);
        self.simple_flood(&mut mightsee, self.nfo.portal(pnum).leaf);
        mightsee
    }

    /// Portals not trivially rejected against `pnum`, as computed by the last
    /// call to `compute`
    pub fn portalsee(&self) -> &VisBits {
        &self.portalsee
    }

    fn base_portal_vis(&mut self, pnum: usize) {
        #[cfg(feature = "hprof")]
        profile!("base_portal_vis");
        self.portalsee.clear_all();

        let p = self.nfo.portal(pnum);
        for (j, tp) in self.nfo.portals().iter().enumerate() {
            if j == pnum {
                continue;
            }
            if p.might_see(tp) {
                self.portalsee.set(j);
            }
        }
    }

    /// Depth-first flood from `leaf` through every portal set in `portalsee`.
    ///
    /// A leaf is marked before its portals are followed, so cycles in the
    /// leaf graph end the walk. Neighbours are pushed in reverse so leaves are
    /// visited in the same order a recursive walk would visit them.
    fn simple_flood(&mut self, mightsee: &mut VisBits, leaf: usize) {
        #[cfg(feature = "hprof")]
        profile!("simple_flood");
        self.stack.clear();
        self.stack.push(leaf);

        while let Some(leafnum) = self.stack.pop() {
            if mightsee.test_and_set(leafnum) {
                continue;
            }
            for &pnum in self.nfo.subsector_extra(leafnum).portals.iter().rev() {
                if !self.portalsee.test(pnum) {
                    continue;
                }
                let next = self.nfo.portal(pnum).leaf;
                if !mightsee.test(next) {
                    self.stack.push(next);
                }
            }
        }
    }
}
