use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use ahash::AHashMap;
use glam::DVec2;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{error::VoronoiError, geometry::BoundingBox, rtree_nn::SiteTree};

mod beach_line;
mod boundary;
mod builder;
mod circle_event;
mod edge;
pub mod integrals;
mod rb_tree;
mod site;
mod voronoi_cell;

#[cfg(test)]
mod test;

use beach_line::BeachLine;
use builder::DiagramBuilder;
use rb_tree::NodeId;

pub use edge::VoronoiEdge;
pub use site::Site;
pub use voronoi_cell::{PointLocation, VoronoiCell, VoronoiHalfEdge};

/// The next event of the sweep.
enum SweepEvent {
    /// Index of the next site in the site slice.
    Site(usize),
    /// The arc collapsing in the earliest circle event.
    Circle(NodeId),
}

/// A Voronoi diagram clipped to a rectangular bounding box.
///
/// Contains exactly one [`VoronoiCell`] per input site, in input order.
#[derive(Clone, Debug)]
pub struct VoronoiDiagram {
    bbox: BoundingBox,
    sites: Vec<Site>,
    edges: Vec<VoronoiEdge>,
    cells: Vec<VoronoiCell>,
    id_map: AHashMap<usize, usize>,
    tree: SiteTree,
}

impl VoronoiDiagram {
    /// Construct the Voronoi diagram of `sites`, clipped to `bbox`, using
    /// Fortune's sweepline algorithm.
    ///
    /// The sweep line moves from the top of the box (minimal y) towards the
    /// bottom (maximal y). Sites may lie outside of the bounding box. Sites
    /// coinciding with an earlier site are skipped and end up with an empty
    /// cell. Distinct sites closer together than a few times
    /// [`EPSILON`](crate::geometry::EPSILON) are below the resolution of the
    /// construction and may yield overlapping cells.
    ///
    /// * `sites` - The sites of the Voronoi cells, in any order.
    /// * `bbox` - The rectangle all cells and edges are clipped to.
    pub fn build(sites: &[Site], bbox: BoundingBox) -> Result<Self, VoronoiError> {
        if sites.is_empty() {
            return Err(VoronoiError::NoSites);
        }
        let (width, height) = (bbox.width(), bbox.height());
        if !bbox.min.is_finite()
            || !bbox.max.is_finite()
            || !(width > 0.)
            || !(height > 0.)
        {
            return Err(VoronoiError::InvalidBoundingBox { width, height });
        }
        if let Some(site) = sites.iter().find(|site| !site.is_finite()) {
            return Err(VoronoiError::NonFiniteSite {
                id: site.id(),
                x: site.loc().x,
                y: site.loc().y,
            });
        }

        // Process the sites from top to bottom, then from left to right.
        let mut order: Vec<usize> = (0..sites.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (sites[a].loc(), sites[b].loc());
            a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
        });
        let mut order = order.into_iter().peekable();

        let mut diagram = DiagramBuilder::new(sites, bbox);
        let mut beach_line = BeachLine::new(sites);
        let mut previous_loc: Option<DVec2> = None;
        let mut duplicates = 0;
        loop {
            let event = match (order.peek(), beach_line.first_circle_event()) {
                (Some(&site), Some(circle)) => {
                    let loc = sites[site].loc();
                    if loc.y < circle.at.y || (loc.y == circle.at.y && loc.x <= circle.at.x) {
                        SweepEvent::Site(site)
                    } else {
                        SweepEvent::Circle(circle.arc)
                    }
                }
                (Some(&site), None) => SweepEvent::Site(site),
                (None, Some(circle)) => SweepEvent::Circle(circle.arc),
                (None, None) => break,
            };

            match event {
                SweepEvent::Site(site) => {
                    order.next();
                    let loc = sites[site].loc();
                    if previous_loc == Some(loc) {
                        tracing::trace!(
                            "Skipping site {} at {:?}: coincides with a previous site",
                            sites[site].id(),
                            loc
                        );
                        duplicates += 1;
                        continue;
                    }
                    previous_loc = Some(loc);
                    beach_line.add_beach_section(site, &mut diagram);
                }
                SweepEvent::Circle(arc) => beach_line.remove_beach_section(arc, &mut diagram),
            }
        }

        debug_assert_eq!(beach_line.pending_circle_events(), 0);
        tracing::trace!("Sweep finished with {} arcs in the beach line", beach_line.len());

        diagram.clip_edges();
        diagram.close_cells()?;
        let (edges, cells) = diagram.finish();
        tracing::debug!(
            "Built Voronoi diagram of {} sites ({} coincident sites skipped) with {} edges",
            sites.len(),
            duplicates,
            edges.len()
        );

        let mut id_map = AHashMap::with_capacity(sites.len());
        for (idx, site) in sites.iter().enumerate() {
            id_map.entry(site.id()).or_insert(idx);
        }

        Ok(Self {
            bbox,
            sites: sites.to_vec(),
            edges,
            cells,
            id_map,
            tree: SiteTree::new(sites),
        })
    }

    /// Construct the Voronoi diagrams of several independent sets of sites,
    /// all clipped to the same `bbox`. This method runs in parallel if the
    /// `"rayon"` feature is enabled.
    pub fn build_many(
        site_sets: &[Vec<Site>],
        bbox: BoundingBox,
    ) -> Vec<Result<Self, VoronoiError>> {
        #[cfg(feature = "rayon")]
        let diagrams = site_sets
            .par_iter()
            .map(|sites| Self::build(sites, bbox))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let diagrams = site_sets
            .iter()
            .map(|sites| Self::build(sites, bbox))
            .collect();
        diagrams
    }

    /// The rectangle all cells are clipped to.
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// The input sites, in input order.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Get the Voronoi edges, including the edges along the bounding box.
    pub fn edges(&self) -> &[VoronoiEdge] {
        &self.edges
    }

    /// Get the Voronoi cells, one per input site, in input order.
    pub fn cells(&self) -> &[VoronoiCell] {
        &self.cells
    }

    /// Get the Voronoi cell of the site with the given `id`.
    ///
    /// If several sites share the same id, the first of them is returned.
    pub fn cell_by_id(&self, id: usize) -> Option<&VoronoiCell> {
        self.id_map.get(&id).map(|&idx| &self.cells[idx])
    }

    /// Find the cell containing `p`, i.e. the non-empty cell whose site is
    /// closest to `p`. Returns `None` for points outside the bounding box.
    pub fn locate(&self, p: DVec2) -> Option<&VoronoiCell> {
        if !self.bbox.contains(p) {
            return None;
        }
        self.tree
            .nearest_iter(p)
            .map(|idx| &self.cells[idx])
            .find(|cell| !cell.is_empty())
    }

    /// The sites moved to the centroids of their cells, keeping their ids.
    /// Sites with an empty cell stay in place.
    pub fn relaxed_sites(&self) -> Vec<Site> {
        self.cells
            .iter()
            .map(|cell| Site::new(cell.site_id(), cell.centroid()))
            .collect()
    }

    /// Apply `iterations` steps of Lloyd's relaxation: repeatedly rebuild the
    /// diagram with every site moved to the centroid of its cell.
    pub fn relax(self, iterations: usize) -> Result<Self, VoronoiError> {
        let mut voronoi = self;
        for _ in 0..iterations {
            voronoi = Self::build(&voronoi.relaxed_sites(), voronoi.bbox)?;
        }
        Ok(voronoi)
    }

    /// Write one line per edge: the ids of its sites (`-` for the missing
    /// right site of a border edge) followed by its endpoints.
    pub fn write_edges<W: Write>(&self, mut writer: W) -> Result<(), std::io::Error> {
        for edge in &self.edges {
            let right = edge
                .right()
                .map_or_else(|| "-".to_string(), |right| right.to_string());
            let (start, end) = (edge.start(), edge.end());
            writeln!(
                writer,
                "{}\t{}\t({}, {})\t({}, {})",
                edge.left(),
                right,
                start.x,
                start.y,
                end.x,
                end.y
            )?;
        }
        Ok(())
    }

    /// Write one line per cell: site id, area, site position, centroid and
    /// number of vertices.
    pub fn write_cells<W: Write>(&self, mut writer: W) -> Result<(), std::io::Error> {
        for cell in &self.cells {
            let loc = cell.loc();
            let centroid = cell.centroid();
            writeln!(
                writer,
                "{}\t{}\t({}, {})\t({}, {})\t{}",
                cell.site_id(),
                cell.area(),
                loc.x,
                loc.y,
                centroid.x,
                centroid.y,
                cell.half_edges().len()
            )?;
        }
        Ok(())
    }

    /// Dump the edge and cell info to 2 files called "edges.txt" and
    /// "cells.txt" in `dir`.
    ///
    /// Mainly for debugging purposes.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<(), std::io::Error> {
        let dir = dir.as_ref();
        let mut file = BufWriter::new(File::create(dir.join("edges.txt"))?);
        self.write_edges(&mut file)?;
        file.flush()?;
        let mut file = BufWriter::new(File::create(dir.join("cells.txt"))?);
        self.write_cells(&mut file)?;
        file.flush()
    }
}

/// Construct the Voronoi diagram of `sites` clipped to `bbox`.
///
/// Shorthand for [`VoronoiDiagram::build`].
pub fn build_voronoi(sites: &[Site], bbox: BoundingBox) -> Result<VoronoiDiagram, VoronoiError> {
    VoronoiDiagram::build(sites, bbox)
}
