use glam::DVec2;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::geometry::{cross, BoundingBox, EPSILON};

use super::{
    edge::VoronoiEdge,
    integrals::{AreaCentroidIntegral, AreaIntegral, CellIntegral},
    Site, VoronoiDiagram,
};

/// Location of a point relative to a Voronoi cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i8)]
pub enum PointLocation {
    Outside = -1,
    OnBoundary = 0,
    Inside = 1,
}

/// A directed view of a [`VoronoiEdge`] from the cell on one of its sides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoronoiHalfEdge {
    edge: usize,
    start: DVec2,
    end: DVec2,
    angle: f64,
    neighbour: Option<usize>,
}

impl VoronoiHalfEdge {
    pub(super) fn new(
        edge: usize,
        start: DVec2,
        end: DVec2,
        angle: f64,
        neighbour: Option<usize>,
    ) -> Self {
        Self {
            edge,
            start,
            end,
            angle,
            neighbour,
        }
    }

    /// Index of the underlying edge in [`VoronoiDiagram::edges`].
    pub fn edge_idx(&self) -> usize {
        self.edge
    }

    pub fn start(&self) -> DVec2 {
        self.start
    }

    pub fn end(&self) -> DVec2 {
        self.end
    }

    /// The angle used to order the half edges of a cell: the direction from
    /// the cell's site towards the site on the other side, or the outward
    /// normal for border edges.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Id of the site on the other side of this half edge, `None` for border
    /// edges.
    pub fn neighbour_id(&self) -> Option<usize> {
        self.neighbour
    }
}

/// A Voronoi cell: a convex polygon inside the bounding box, bounded by half
/// edges ordered by decreasing angle, i.e. clockwise with the y-axis pointing
/// up.
#[derive(Clone, Debug)]
pub struct VoronoiCell {
    site: Site,
    half_edges: Vec<VoronoiHalfEdge>,
}

impl VoronoiCell {
    pub(super) fn new(site: Site, half_edges: Vec<VoronoiHalfEdge>) -> Self {
        Self { site, half_edges }
    }

    /// Get the site of this Voronoi cell.
    pub fn site(&self) -> Site {
        self.site
    }

    pub fn site_id(&self) -> usize {
        self.site.id()
    }

    /// Get the position of the site of this Voronoi cell.
    pub fn loc(&self) -> DVec2 {
        self.site.loc()
    }

    pub fn half_edges(&self) -> &[VoronoiHalfEdge] {
        &self.half_edges
    }

    /// Whether this cell has no geometry, e.g. because its site coincides
    /// with another site or because it lies completely outside the bounding
    /// box.
    pub fn is_empty(&self) -> bool {
        self.half_edges.is_empty()
    }

    /// The vertices of this cell, in the order of its half edges.
    pub fn vertices(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.half_edges.iter().map(|h| h.start)
    }

    /// Get an `Iterator` over the edges bounding this cell.
    pub fn edges<'a>(&'a self, voronoi: &'a VoronoiDiagram) -> impl Iterator<Item = &'a VoronoiEdge> {
        self.half_edges.iter().map(|h| &voronoi.edges()[h.edge])
    }

    /// Get an `Iterator` over the ids of the neighbouring sites.
    pub fn neighbour_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.half_edges.iter().filter_map(|h| h.neighbour)
    }

    /// Compute a custom integral over this cell.
    pub fn compute_integral<I: CellIntegral>(&self) -> I {
        let site = self.loc();
        let mut integral = I::init(site);
        // Reverse the clockwise half edges to feed counterclockwise triangles.
        for h in &self.half_edges {
            integral.collect(h.end, h.start, site);
        }
        integral.finalize()
    }

    /// The signed area of this cell (shoelace formula over its vertices).
    ///
    /// Since the boundary is traversed clockwise (y-axis up), this is never
    /// positive.
    pub fn signed_area(&self) -> f64 {
        let origin = self.loc();
        0.5 * self
            .half_edges
            .iter()
            .map(|h| cross(h.start - origin, h.end - origin))
            .sum::<f64>()
    }

    /// Get the area of this cell.
    pub fn area(&self) -> f64 {
        self.compute_integral::<AreaIntegral>().area
    }

    /// Get the centroid of this cell. For cells without area, this is the
    /// position of the site.
    pub fn centroid(&self) -> DVec2 {
        self.compute_integral::<AreaCentroidIntegral>().centroid
    }

    /// The smallest axis-aligned box containing this cell, `None` for empty
    /// cells.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(self.vertices())
    }

    /// Classify a point as inside, outside or on the boundary of this cell.
    pub fn classify(&self, p: DVec2) -> PointLocation {
        if self.is_empty() {
            return PointLocation::Outside;
        }
        let mut on_boundary = false;
        for h in &self.half_edges {
            let d = h.end - h.start;
            // Interior points lie to the right of every clockwise half edge.
            let r = cross(d, p - h.start);
            let tolerance = EPSILON * d.length();
            if r > tolerance {
                return PointLocation::Outside;
            }
            if r >= -tolerance {
                on_boundary = true;
            }
        }
        if on_boundary {
            PointLocation::OnBoundary
        } else {
            PointLocation::Inside
        }
    }

    /// Whether `p` lies inside this cell or on its boundary.
    pub fn contains(&self, p: DVec2) -> bool {
        self.classify(p) != PointLocation::Outside
    }
}
