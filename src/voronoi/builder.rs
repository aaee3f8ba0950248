use glam::DVec2;

use crate::{
    error::VoronoiError,
    geometry::{approx_eq, BoundingBox},
    rtree_nn::SiteTree,
};

use super::{
    boundary::BoxSide,
    edge::{Edge, EdgeSites, VoronoiEdge},
    voronoi_cell::{VoronoiCell, VoronoiHalfEdge},
    Site,
};

/// Maximal number of border segments needed to bridge a gap in the boundary
/// of a convex cell: the remainder of the starting side, three full sides and
/// part of the starting side again.
const MAX_BORDER_SEGMENTS: usize = 5;

#[derive(Clone, Copy, Debug)]
struct HalfEdge {
    edge: usize,
    angle: f64,
}

#[derive(Debug, Default)]
struct CellBuilder {
    half_edges: Vec<HalfEdge>,
    close_me: bool,
}

/// Accumulates the edges and cells of a Voronoi diagram while the sweep
/// proceeds, and finishes them once all events are processed.
///
/// Sites are referred to by their index in the `sites` slice.
pub(super) struct DiagramBuilder<'a> {
    sites: &'a [Site],
    bbox: BoundingBox,
    edges: Vec<Edge>,
    cells: Vec<CellBuilder>,
}

impl<'a> DiagramBuilder<'a> {
    pub fn new(sites: &'a [Site], bbox: BoundingBox) -> Self {
        Self {
            sites,
            bbox,
            edges: vec![],
            cells: sites.iter().map(|_| CellBuilder::default()).collect(),
        }
    }

    #[cfg(test)]
    pub fn edge(&self, edge: usize) -> &Edge {
        &self.edges[edge]
    }

    #[cfg(test)]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Create a new edge between the cells of `left` and `right` and register
    /// it with both cells.
    pub fn create_edge(
        &mut self,
        left: usize,
        right: usize,
        start: Option<DVec2>,
        end: Option<DVec2>,
    ) -> usize {
        let mut edge = Edge::interior(left, right);
        if let Some(start) = start {
            edge.set_start_point(left, right, start);
        }
        if let Some(end) = end {
            edge.set_end_point(left, right, end);
        }
        let idx = self.edges.len();
        self.edges.push(edge);

        let angle = self.site_angle(left, right);
        self.cells[left].half_edges.push(HalfEdge { edge: idx, angle });
        let angle = self.site_angle(right, left);
        self.cells[right].half_edges.push(HalfEdge { edge: idx, angle });
        idx
    }

    /// Create an edge along the bounding box belonging only to the cell of
    /// `site`. The caller is responsible for registering the half edge.
    fn create_border_edge(&mut self, site: usize, start: DVec2, end: DVec2) -> HalfEdge {
        let idx = self.edges.len();
        self.edges.push(Edge::border(site, start, end));
        HalfEdge {
            edge: idx,
            angle: (end.x - start.x).atan2(start.y - end.y),
        }
    }

    pub fn set_edge_start_point(&mut self, edge: usize, left: usize, right: usize, vertex: DVec2) {
        self.edges[edge].set_start_point(left, right, vertex);
    }

    /// Direction from `site` towards `other`.
    fn site_angle(&self, site: usize, other: usize) -> f64 {
        let d = self.sites[other].loc() - self.sites[site].loc();
        d.y.atan2(d.x)
    }

    /// Connect all dangling edges to the bounding box and clip all edges to
    /// it. Edges that fall outside the box or collapse to a point are
    /// discarded.
    pub fn clip_edges(&mut self) {
        for idx in (0..self.edges.len()).rev() {
            let (left, right) = match self.edges[idx].sites {
                EdgeSites::Interior { left, right } => (left, right),
                EdgeSites::Border { .. } => continue,
            };
            let keep = self.connect_edge(idx) && self.clip_edge(idx);
            let edge = &mut self.edges[idx];
            let degenerate = match (edge.start, edge.end) {
                (Some(start), Some(end)) => approx_eq(start, end),
                _ => true,
            };
            if !keep || degenerate {
                edge.clear();
                self.cells[left].close_me = true;
                self.cells[right].close_me = true;
            }
        }
    }

    /// Give a dangling edge a second endpoint on the bounding box.
    fn connect_edge(&mut self, idx: usize) -> bool {
        let edge = &self.edges[idx];
        if edge.end.is_some() {
            return true;
        }
        let (left, right) = match edge.sites {
            EdgeSites::Interior { left, right } => (left, right),
            EdgeSites::Border { .. } => return true,
        };
        self.cells[left].close_me = true;
        self.cells[right].close_me = true;

        let connected =
            self.bbox
                .extend_bisector(self.sites[left].loc(), self.sites[right].loc(), edge.start);
        match connected {
            Some((start, end)) => {
                let edge = &mut self.edges[idx];
                edge.start = Some(start);
                edge.end = Some(end);
                true
            }
            None => false,
        }
    }

    /// Clip a complete edge to the bounding box.
    fn clip_edge(&mut self, idx: usize) -> bool {
        let edge = &self.edges[idx];
        let (Some(start), Some(end)) = (edge.start, edge.end) else {
            return false;
        };
        let Some(clipped) = self.bbox.clip_segment(start, end) else {
            return false;
        };
        let sites = edge.sites;
        let edge = &mut self.edges[idx];
        edge.start = Some(clipped.start);
        edge.end = Some(clipped.end);
        if clipped.trimmed {
            self.cells[sites.left()].close_me = true;
            if let Some(right) = sites.right() {
                self.cells[right].close_me = true;
            }
        }
        true
    }

    /// Drop the half edges of discarded edges and sort the remaining ones by
    /// decreasing angle. Returns the number of remaining half edges.
    fn prepare_half_edges(&mut self, site: usize) -> usize {
        let edges = &self.edges;
        let half_edges = &mut self.cells[site].half_edges;
        half_edges.retain(|h| edges[h.edge].is_complete());
        half_edges.sort_by(|a, b| b.angle.total_cmp(&a.angle));
        half_edges.len()
    }

    fn half_edge_start(&self, site: usize, half_edge: HalfEdge) -> DVec2 {
        self.edges[half_edge.edge]
            .start_seen_from(site)
            .expect("Only complete edges remain after preparing the half edges")
    }

    fn half_edge_end(&self, site: usize, half_edge: HalfEdge) -> DVec2 {
        self.edges[half_edge.edge]
            .end_seen_from(site)
            .expect("Only complete edges remain after preparing the half edges")
    }

    /// Close every cell that was affected by clipping, by inserting border
    /// edges along the bounding box wherever consecutive half edges do not
    /// connect.
    pub fn close_cells(&mut self) -> Result<(), VoronoiError> {
        for site in (0..self.cells.len()).rev() {
            if self.prepare_half_edges(site) == 0 || !self.cells[site].close_me {
                continue;
            }
            let mut i = 0;
            while i < self.cells[site].half_edges.len() {
                let half_edges = &self.cells[site].half_edges;
                let end = self.half_edge_end(site, half_edges[i]);
                let next_start =
                    self.half_edge_start(site, half_edges[(i + 1) % half_edges.len()]);
                if !approx_eq(end, next_start) {
                    i = self.bridge_gap(site, i, end, next_start)?;
                }
                i += 1;
            }
            self.cells[site].close_me = false;
        }

        if self.cells.iter().all(|cell| cell.half_edges.is_empty()) {
            // Nothing split the box, so it belongs to a single site.
            let owner = SiteTree::new(self.sites)
                .nearest(self.bbox.center())
                .expect("The site list is never empty");
            tracing::debug!(
                "No edge crosses the bounding box, assigning it to site {}",
                self.sites[owner].id()
            );
            self.fill_box(owner);
        }

        Ok(())
    }

    /// Walk along the bounding box from `from` to `to`, inserting border
    /// edges after half edge `i` of the cell of `site`. Returns the index of
    /// the last inserted half edge.
    fn bridge_gap(
        &mut self,
        site: usize,
        mut i: usize,
        from: DVec2,
        to: DVec2,
    ) -> Result<usize, VoronoiError> {
        let bbox = self.bbox;
        let mut side = BoxSide::starting_at(from, &bbox).ok_or_else(|| self.unclosed(site))?;
        let mut from = from;
        for _ in 0..MAX_BORDER_SEGMENTS {
            let (corner, reached) = side.walk(to, &bbox);
            let half_edge = self.create_border_edge(site, from, corner);
            i += 1;
            self.cells[site].half_edges.insert(i, half_edge);
            if reached {
                return Ok(i);
            }
            from = corner;
            side = side.next();
        }
        Err(self.unclosed(site))
    }

    fn unclosed(&self, site: usize) -> VoronoiError {
        let site = self.sites[site];
        tracing::warn!(
            "Unable to close the cell of site {} at {:?}",
            site.id(),
            site.loc()
        );
        VoronoiError::UnclosedCell {
            site_id: site.id(),
            x: site.loc().x,
            y: site.loc().y,
        }
    }

    /// Make the whole bounding box the cell of `site`.
    fn fill_box(&mut self, site: usize) {
        let corners = self.bbox.corners();
        for i in 0..corners.len() {
            let half_edge =
                self.create_border_edge(site, corners[i], corners[(i + 1) % corners.len()]);
            self.cells[site].half_edges.push(half_edge);
        }
    }

    /// Convert into the public edges and cells, dropping discarded edges.
    pub fn finish(self) -> (Vec<VoronoiEdge>, Vec<VoronoiCell>) {
        let sites = self.sites;
        let mut edge_map = vec![None; self.edges.len()];
        let mut edges = Vec::with_capacity(self.edges.len());
        for (i, edge) in self.edges.iter().enumerate() {
            if let (Some(start), Some(end)) = (edge.start, edge.end) {
                edge_map[i] = Some(edges.len());
                edges.push(VoronoiEdge::new(
                    sites[edge.sites.left()].id(),
                    edge.sites.right().map(|right| sites[right].id()),
                    start,
                    end,
                ));
            }
        }

        let cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(site, cell)| {
                let half_edges = cell
                    .half_edges
                    .iter()
                    .filter_map(|h| {
                        let edge = &self.edges[h.edge];
                        Some(VoronoiHalfEdge::new(
                            edge_map[h.edge]?,
                            edge.start_seen_from(site)?,
                            edge.end_seen_from(site)?,
                            h.angle,
                            edge.sites.opposite(site).map(|other| sites[other].id()),
                        ))
                    })
                    .collect();
                VoronoiCell::new(sites[site], half_edges)
            })
            .collect();

        (edges, cells)
    }
}
