use glam::DVec2;

/// The sites separated by an edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum EdgeSites {
    /// An edge traced between two sites.
    Interior { left: usize, right: usize },
    /// A segment of the bounding box that closes the cell of `site`.
    Border { site: usize },
}

impl EdgeSites {
    pub fn left(&self) -> usize {
        match *self {
            EdgeSites::Interior { left, .. } => left,
            EdgeSites::Border { site } => site,
        }
    }

    pub fn right(&self) -> Option<usize> {
        match *self {
            EdgeSites::Interior { right, .. } => Some(right),
            EdgeSites::Border { .. } => None,
        }
    }

    /// The site on the other side of this edge, as seen from `site`.
    pub fn opposite(&self, site: usize) -> Option<usize> {
        match *self {
            EdgeSites::Interior { left, right } if left == site => Some(right),
            EdgeSites::Interior { left, .. } => Some(left),
            EdgeSites::Border { .. } => None,
        }
    }
}

/// An edge under construction. Indices refer to the sites slice the diagram
/// is built from.
#[derive(Clone, Debug)]
pub(super) struct Edge {
    pub sites: EdgeSites,
    pub start: Option<DVec2>,
    pub end: Option<DVec2>,
}

impl Edge {
    pub fn interior(left: usize, right: usize) -> Self {
        Self {
            sites: EdgeSites::Interior { left, right },
            start: None,
            end: None,
        }
    }

    pub fn border(site: usize, start: DVec2, end: DVec2) -> Self {
        Self {
            sites: EdgeSites::Border { site },
            start: Some(start),
            end: Some(end),
        }
    }

    /// Set the endpoint at which the edge starts, when traversed with `left`
    /// on its left and `right` on its right.
    ///
    /// The two beach sections flanking an edge resolve its endpoints
    /// independently and may do so with the sites swapped, so the orientation
    /// is fixed by the first point that is set.
    pub fn set_start_point(&mut self, left: usize, right: usize, vertex: DVec2) {
        if self.start.is_none() && self.end.is_none() {
            self.start = Some(vertex);
            self.sites = EdgeSites::Interior { left, right };
        } else if self.sites.left() == right {
            self.end = Some(vertex);
        } else {
            self.start = Some(vertex);
        }
    }

    /// Set the endpoint at which the edge ends, when traversed with `left` on
    /// its left and `right` on its right.
    pub fn set_end_point(&mut self, left: usize, right: usize, vertex: DVec2) {
        self.set_start_point(right, left, vertex);
    }

    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Forget both endpoints, discarding this edge.
    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// First point of this edge when walking the boundary of the cell of
    /// `site`.
    pub fn start_seen_from(&self, site: usize) -> Option<DVec2> {
        if self.sites.left() == site {
            self.start
        } else {
            self.end
        }
    }

    /// Last point of this edge when walking the boundary of the cell of
    /// `site`.
    pub fn end_seen_from(&self, site: usize) -> Option<DVec2> {
        if self.sites.left() == site {
            self.end
        } else {
            self.start
        }
    }
}

/// An edge of a finished Voronoi diagram.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoronoiEdge {
    left: usize,
    right: Option<usize>,
    start: DVec2,
    end: DVec2,
}

impl VoronoiEdge {
    pub(super) fn new(left: usize, right: Option<usize>, start: DVec2, end: DVec2) -> Self {
        Self {
            left,
            right,
            start,
            end,
        }
    }

    /// Get the id of the site on the _left_ of this edge.
    pub fn left(&self) -> usize {
        self.left
    }

    /// Get the id of the site on the _right_ of this edge.
    /// Returns `None` if this is a border edge (i.e. a piece of the bounding
    /// box that closes the cell of the left site).
    pub fn right(&self) -> Option<usize> {
        self.right
    }

    pub fn start(&self) -> DVec2 {
        self.start
    }

    pub fn end(&self) -> DVec2 {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Whether this edge lies on the bounding box.
    pub fn is_border(&self) -> bool {
        self.right.is_none()
    }
}
