//! **An implementation of
//! [Fortune's sweepline algorithm](https://en.wikipedia.org/wiki/Fortune%27s_algorithm)
//! for 2D Voronoi diagrams in Rust.**
//!
//! A horizontal sweep line moves over the plane, from the *top* of the
//! bounding box (smallest y) to its *bottom* (largest y). The sweep maintains
//! the beach line, the sequence of parabolic arcs closest to the processed
//! sites, in a balanced binary tree, and schedules the collapse of arcs in a
//! queue of circle events. Every collapse produces a vertex of the Voronoi
//! diagram.
//!
//! After the sweep, all edges are clipped to a rectangular bounding box and
//! the cells touching the box are closed with edges along its boundary, so
//! that every site ends up with a convex polygon inside the box.
//!
//! ```
//! use glam::DVec2;
//! use sweepline_voronoi::{BoundingBox, Site, VoronoiDiagram};
//!
//! let sites = [
//!     Site::new(0, DVec2::new(2., 5.)),
//!     Site::new(1, DVec2::new(8., 5.)),
//! ];
//! let bbox = BoundingBox::new(DVec2::ZERO, DVec2::splat(10.));
//! let voronoi = VoronoiDiagram::build(&sites, bbox).unwrap();
//! assert_eq!(voronoi.cells().len(), 2);
//! assert!((voronoi.cells()[0].area() - 50.).abs() < 1e-9);
//! ```
//!
//! # Features
//!
//! - Construction of 2D Voronoi diagrams clipped to a rectangle, robust
//!   against coincident, collinear and co-circular sites.
//!
//! - Polygon queries on cells: vertices, area, centroid, bounding box, point
//!   classification and neighbours.
//!
//! - Evaluation of *custom integrals* over cells (e.g. second moments).
//!
//! - Lloyd relaxation.
//!
//! - Parallel construction of independent diagrams.
//!
//! # Cargo Features
#![doc = document_features::document_features!()]

mod error;
pub mod geometry;
mod rtree_nn;
mod voronoi;

pub use error::VoronoiError;
pub use geometry::BoundingBox;
pub use voronoi::{
    build_voronoi, integrals, PointLocation, Site, VoronoiCell, VoronoiDiagram, VoronoiEdge,
    VoronoiHalfEdge,
};
