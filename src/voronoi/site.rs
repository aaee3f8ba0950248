use glam::DVec2;

/// A Voronoi site: an input point tagged with a caller supplied id.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Site {
    id: usize,
    loc: DVec2,
}

impl Site {
    /// Create a new site with the given `id` at position `loc`.
    pub fn new(id: usize, loc: DVec2) -> Self {
        Self { id, loc }
    }

    /// Get the id of this site
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get the position of this site
    pub fn loc(&self) -> DVec2 {
        self.loc
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.loc.is_finite()
    }
}

impl From<(usize, f64, f64)> for Site {
    fn from((id, x, y): (usize, f64, f64)) -> Self {
        Self::new(id, DVec2::new(x, y))
    }
}
