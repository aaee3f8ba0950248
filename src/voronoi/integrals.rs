//! Contains traits used to define custom integrals over Voronoi cells.

use glam::DVec2;

use crate::geometry::cross;

/// Trait to implement new integrators for Voronoi cells.
///
/// Integrators are expected to compute quantities of interest for Voronoi
/// cells iteratively. The cell is decomposed into a fan of oriented triangles
/// with the cell's site as common vertex, which are fed one by one to the
/// integrator.
///
/// The triangles `(site, v0, v1)` are ordered counterclockwise (with the
/// y-axis pointing up) when they are part of the cell and should contribute
/// positively to integrals. When the site lies outside its (clipped) cell,
/// some triangles are ordered clockwise and should be subtracted.
pub trait CellIntegral: Sized {
    /// Initialize a CellIntegral for the cell of the given site.
    fn init(site: DVec2) -> Self;

    /// Update the state of the integrator using one oriented triangle with the
    /// cell's site as top.
    fn collect(&mut self, v0: DVec2, v1: DVec2, site: DVec2);

    /// Finalize the calculation and return the result
    fn finalize(self) -> Self;
}

/// Area of a cell.
#[derive(Default, Debug, Clone, Copy)]
pub struct AreaIntegral {
    pub area: f64,
}

impl CellIntegral for AreaIntegral {
    fn init(_site: DVec2) -> Self {
        Self::default()
    }

    fn collect(&mut self, v0: DVec2, v1: DVec2, site: DVec2) {
        self.area += 0.5 * cross(v0 - site, v1 - site);
    }

    fn finalize(self) -> Self {
        self
    }
}

/// Area and centroid of a cell.
#[derive(Debug, Clone, Copy)]
pub struct AreaCentroidIntegral {
    pub area: f64,
    pub centroid: DVec2,
    site: DVec2,
}

impl CellIntegral for AreaCentroidIntegral {
    fn init(site: DVec2) -> Self {
        Self {
            area: 0.,
            centroid: DVec2::ZERO,
            site,
        }
    }

    fn collect(&mut self, v0: DVec2, v1: DVec2, site: DVec2) {
        // Work relative to the site, where the triangle's third vertex vanishes.
        let (v0, v1) = (v0 - site, v1 - site);
        let c = cross(v0, v1);
        self.area += 0.5 * c;
        self.centroid += c * (v0 + v1);
    }

    fn finalize(mut self) -> Self {
        if self.area != 0. {
            self.centroid = self.centroid / (6. * self.area) + self.site;
        } else {
            self.centroid = self.site;
        }
        self
    }
}

/// Second moment of area of a cell around its site, i.e. the integral of the
/// squared distance to the site. This is the quantity minimized by Lloyd
/// relaxation.
#[derive(Default, Debug, Clone, Copy)]
pub struct SecondMomentIntegral {
    pub second_moment: f64,
}

impl CellIntegral for SecondMomentIntegral {
    fn init(_site: DVec2) -> Self {
        Self::default()
    }

    fn collect(&mut self, v0: DVec2, v1: DVec2, site: DVec2) {
        let (v0, v1) = (v0 - site, v1 - site);
        self.second_moment +=
            cross(v0, v1) / 12. * (v0.length_squared() + v0.dot(v1) + v1.length_squared());
    }

    fn finalize(self) -> Self {
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use float_cmp::assert_approx_eq;

    /// Feed the counterclockwise square [0, 2] x [0, 2] to an integrator.
    fn integrate_square<I: CellIntegral>(site: DVec2) -> I {
        let corners = [
            DVec2::new(0., 0.),
            DVec2::new(2., 0.),
            DVec2::new(2., 2.),
            DVec2::new(0., 2.),
        ];
        let mut integral = I::init(site);
        for i in 0..4 {
            integral.collect(corners[i], corners[(i + 1) % 4], site);
        }
        integral.finalize()
    }

    #[test]
    fn test_area_centroid() {
        // Site outside of the polygon: some triangles subtract.
        let integral = integrate_square::<AreaCentroidIntegral>(DVec2::new(5., -3.));
        assert_approx_eq!(f64, integral.area, 4., epsilon = 1e-12);
        assert_approx_eq!(f64, integral.centroid.x, 1., epsilon = 1e-12);
        assert_approx_eq!(f64, integral.centroid.y, 1., epsilon = 1e-12);

        let area = integrate_square::<AreaIntegral>(DVec2::new(0.5, 0.5)).area;
        assert_approx_eq!(f64, area, 4., epsilon = 1e-12);
    }

    #[test]
    fn test_second_moment() {
        // Polar moment of a square with side a around its center: a^4 / 6
        let integral = integrate_square::<SecondMomentIntegral>(DVec2::ONE);
        assert_approx_eq!(f64, integral.second_moment, 16. / 6., epsilon = 1e-12);
    }
}
