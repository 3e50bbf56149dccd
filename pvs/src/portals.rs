//! The portal graph of a level: one `Portal` per directed boundary between
//! two leaves, and per leaf the list of portals leading out of it.

use std::sync::OnceLock;

use log::{debug, info, warn};
use math::{Plane2D, Winding};

use crate::bits::{VisBits, bytes_for};
use crate::level::LevelGeometry;
use crate::PvsError;

/// Most portals a single leaf may have before the level is refused
pub const MAX_PORTALS_ON_LEAF: usize = 512;

/// A window from one leaf into a neighbouring leaf.
///
/// The plane normal points into the neighbour, `leaf`. The result bits are
/// written once by whichever worker claims the portal and are read-only from
/// then on.
#[derive(Debug, Clone)]
pub struct Portal {
    pub plane: Plane2D,
    /// The neighbour leaf this portal opens into
    pub leaf: usize,
    pub winding: Winding,
    visbits: OnceLock<VisBits>,
}

impl Portal {
    pub fn new(plane: Plane2D, winding: Winding, leaf: usize) -> Self {
        Self {
            plane,
            leaf,
            winding,
            visbits: OnceLock::new(),
        }
    }

    /// Leaves potentially visible through this portal, once computed
    #[inline]
    pub fn visbits(&self) -> Option<&VisBits> {
        self.visbits.get()
    }

    /// Freeze the result. Returns false if a result was already stored.
    #[inline]
    pub(crate) fn store_visbits(&self, bits: VisBits) -> bool {
        self.visbits.set(bits).is_ok()
    }

    /// The cheap two-plane test: can `other` possibly be seen through this
    /// portal? `other` needs a point in front of this portal, and this portal
    /// needs a point behind `other`.
    #[inline]
    pub fn might_see(&self, other: &Portal) -> bool {
        other.winding.check_positive_dist(&self.plane)
            && self.winding.check_negative_dist(&other.plane)
    }
}

/// Per leaf: the portals leading out of it, as indices into the portal array
#[derive(Debug, Default, Clone)]
pub struct SubsectorExtra {
    pub portals: Vec<usize>,
}

impl SubsectorExtra {
    #[inline]
    pub fn num_portals(&self) -> usize {
        self.portals.len()
    }

    fn push(&mut self, leaf: usize, portal: usize) -> Result<(), PvsError> {
        if self.portals.len() == MAX_PORTALS_ON_LEAF {
            warn!("PVS: Leaf {leaf} with too many portals!");
            return Err(PvsError::TooManyPortals { leaf });
        }
        self.portals.push(portal);
        Ok(())
    }
}

/// Everything the workers read while building. Constructed once, then only
/// the per-portal result cells change.
#[derive(Debug, Clone)]
pub struct PvsInfo {
    portals: Vec<Portal>,
    num_leaves: usize,
    num_segs: usize,
    bitbytes: usize,
    bitlongs: usize,
    rowbytes: usize,
    /// Owning leaf of every seg
    leaves: Vec<usize>,
    ssex: Vec<SubsectorExtra>,
}

impl PvsInfo {
    fn with_leaves(num_leaves: usize, num_segs: usize, leaves: Vec<usize>) -> Self {
        Self {
            portals: Vec::new(),
            num_leaves,
            num_segs,
            bitbytes: bytes_for(num_leaves),
            bitlongs: num_leaves.div_ceil(64),
            rowbytes: bytes_for(num_leaves),
            leaves,
            ssex: vec![SubsectorExtra::default(); num_leaves],
        }
    }

    /// Create the portal graph from the level's segs.
    ///
    /// Every seg with a partner in a different subsector becomes a portal
    /// owned by the seg's subsector, opening into the partner's subsector,
    /// facing the way the partner faces.
    pub fn from_level(level: &LevelGeometry) -> Result<Self, PvsError> {
        let leaves = level.seg_leaves()?;
        let mut nfo = Self::with_leaves(level.num_subsectors(), level.num_segs(), leaves);

        let partnered = level.segs.iter().filter(|s| s.partner.is_some()).count();
        if partnered == 0 {
            warn!("PVS: no possible portals found");
            return Err(PvsError::NoPortals);
        }
        nfo.portals.reserve(partnered);

        let mut dropped = 0;
        for (i, seg) in level.segs.iter().enumerate() {
            let Some(pnum) = seg.partner else {
                continue;
            };
            let owner = nfo.leaves[i];
            let neighbour = nfo.leaves[pnum];
            // Self-referencing subsector seg
            if owner == neighbour {
                dropped += 1;
                continue;
            }

            let partner = &level.segs[pnum];
            let portal = Portal::new(
                Plane2D::from_points(partner.v1, partner.v2),
                Winding::new(seg.v1, seg.v2),
                neighbour,
            );
            if portal.winding.length() == 0.0 {
                debug!("PVS: seg {i} makes a zero-length portal");
            }
            nfo.ssex[owner].push(owner, nfo.portals.len())?;
            nfo.portals.push(portal);
        }

        if dropped > 0 {
            info!(
                "PVS: {} portals found ({} portals dropped)",
                nfo.portals.len(),
                dropped
            );
        } else {
            info!("PVS: {} portals found", nfo.portals.len());
        }
        if nfo.portals.is_empty() {
            return Err(PvsError::NoPortals);
        }
        Ok(nfo)
    }

    /// Build from portals that were already created elsewhere, each paired
    /// with the leaf that owns it.
    ///
    /// Portal leaves are not checked here. One that is out of range panics
    /// the worker that floods through it and fails the build.
    pub fn from_portals(
        num_leaves: usize,
        portals: impl IntoIterator<Item = (usize, Portal)>,
    ) -> Result<Self, PvsError> {
        let mut nfo = Self::with_leaves(num_leaves, 0, Vec::new());
        for (owner, portal) in portals {
            nfo.ssex[owner].push(owner, nfo.portals.len())?;
            nfo.portals.push(portal);
        }
        if nfo.portals.is_empty() {
            warn!("PVS: no possible portals found");
            return Err(PvsError::NoPortals);
        }
        Ok(nfo)
    }

    #[inline]
    pub fn num_portals(&self) -> usize {
        self.portals.len()
    }

    #[inline]
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Segs in the source level, zero when built with `from_portals`
    #[inline]
    pub fn num_segs(&self) -> usize {
        self.num_segs
    }

    #[inline]
    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    #[inline]
    pub fn portal(&self, pnum: usize) -> &Portal {
        &self.portals[pnum]
    }

    /// Bytes in each portal's result bits
    #[inline]
    pub fn bitbytes(&self) -> usize {
        self.bitbytes
    }

    /// Result size rounded up to 64 bit words. Counted from the leaves on
    /// its own, so `bitlongs * 8` can be larger than `bitbytes`, which is
    /// never padded.
    #[inline]
    pub fn bitlongs(&self) -> usize {
        self.bitlongs
    }

    /// Bytes in each row of the per-leaf table
    #[inline]
    pub fn rowbytes(&self) -> usize {
        self.rowbytes
    }

    #[inline]
    pub fn subsector_extra(&self, leaf: usize) -> &SubsectorExtra {
        &self.ssex[leaf]
    }

    /// True once every portal has its result
    pub fn is_complete(&self) -> bool {
        self.portals.iter().all(|p| p.visbits().is_some())
    }

    /// Number of portals that have a result stored
    pub fn completed(&self) -> usize {
        self.portals.iter().filter(|p| p.visbits().is_some()).count()
    }

    /// Drop all results so the graph can be built again
    pub fn clear_results(&mut self) {
        for p in self.portals.iter_mut() {
            p.visbits.take();
        }
    }
}
