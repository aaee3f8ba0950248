use thiserror::Error;

/// Errors reported while building a [`VoronoiDiagram`](crate::VoronoiDiagram).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoronoiError {
    /// No sites were given.
    #[error("Cannot build a Voronoi diagram without any sites")]
    NoSites,

    /// The clipping rectangle has no interior, or is not finite.
    #[error("Invalid bounding box: width ({width}) and height ({height}) must be positive and finite")]
    InvalidBoundingBox { width: f64, height: f64 },

    /// A site with a NaN or infinite coordinate.
    #[error("Site {id} has non-finite coordinates ({x}, {y})")]
    NonFiniteSite { id: usize, x: f64, y: f64 },

    /// The boundary of a cell could not be stitched into a closed loop along
    /// the bounding box. This indicates a bug, not a problem with the input.
    #[error("Internal error: failed to close the Voronoi cell of site {site_id} at ({x}, {y})")]
    UnclosedCell { site_id: usize, x: f64, y: f64 },
}
