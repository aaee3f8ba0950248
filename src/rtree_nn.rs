use glam::DVec2;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::voronoi::Site;

/// A site location together with its index in the site slice.
#[derive(Clone, Copy, Debug)]
struct IndexedSite {
    idx: usize,
    loc: DVec2,
}

impl RTreeObject for IndexedSite {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.loc.x, self.loc.y])
    }
}

impl PointDistance for IndexedSite {
    fn distance_2(
        &self,
        point: &<Self::Envelope as rstar::Envelope>::Point,
    ) -> <<Self::Envelope as rstar::Envelope>::Point as rstar::Point>::Scalar {
        self.loc.distance_squared(DVec2::from_array(*point))
    }
}

/// Nearest-site queries over a set of sites.
#[derive(Debug, Clone)]
pub(crate) struct SiteTree {
    rtree: RTree<IndexedSite>,
}

impl SiteTree {
    pub fn new(sites: &[Site]) -> Self {
        Self {
            rtree: RTree::bulk_load(
                sites
                    .iter()
                    .enumerate()
                    .map(|(idx, site)| IndexedSite {
                        idx,
                        loc: site.loc(),
                    })
                    .collect(),
            ),
        }
    }

    /// Index of the site closest to `loc`.
    pub fn nearest(&self, loc: DVec2) -> Option<usize> {
        self.rtree
            .nearest_neighbor(&[loc.x, loc.y])
            .map(|site| site.idx)
    }

    /// Indices of the sites in order of increasing distance to `loc`.
    pub fn nearest_iter(&self, loc: DVec2) -> impl Iterator<Item = usize> + '_ {
        self.rtree
            .nearest_neighbor_iter(&[loc.x, loc.y])
            .map(|site| site.idx)
    }
}
