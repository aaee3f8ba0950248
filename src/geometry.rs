//! A few general-purpose 2D geometry functions and structs used by the
//! sweepline, which might also be useful for users of this library.

use glam::DVec2;

/// Absolute tolerance used for positional coincidence tests.
pub const EPSILON: f64 = 1e-9;

/// Tolerance of the orientation test that decides whether three consecutive
/// arcs of the beach line converge.
pub const CIRCLE_EVENT_EPSILON: f64 = 2e-12;

/// Whether `a` and `b` coincide within [`EPSILON`] on both axes.
pub fn approx_eq(a: DVec2, b: DVec2) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

/// An axis-aligned rectangle.
///
/// The sweep starts at the *top* of the box, i.e. the side with the smallest
/// y-coordinate, and moves towards the *bottom* (largest y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Corner with the smallest coordinates (left, top).
    pub min: DVec2,
    /// Corner with the largest coordinates (right, bottom).
    pub max: DVec2,
}

impl BoundingBox {
    /// Create a box from its lower corner and its width along both axes.
    pub fn new(anchor: DVec2, width: DVec2) -> Self {
        Self {
            min: anchor,
            max: anchor + width,
        }
    }

    /// Create a box from the coordinates of its four sides.
    pub fn from_sides(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            min: DVec2::new(left, top),
            max: DVec2::new(right, bottom),
        }
    }

    /// Smallest box containing all given points, `None` for an empty iterator.
    pub fn enclosing(points: impl IntoIterator<Item = DVec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self { min: first, max: first }, |bbox, p| Self {
            min: bbox.min.min(p),
            max: bbox.max.max(p),
        }))
    }

    pub fn left(&self) -> f64 {
        self.min.x
    }

    pub fn right(&self) -> f64 {
        self.max.x
    }

    pub fn top(&self) -> f64 {
        self.min.y
    }

    pub fn bottom(&self) -> f64 {
        self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> DVec2 {
        0.5 * (self.min + self.max)
    }

    /// Whether `p` lies inside this box or on its boundary.
    pub fn contains(&self, p: DVec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// The four corners, in the order in which the perimeter is walked when
    /// closing cells: down the left side, right along the bottom, up the right
    /// side and back along the top.
    pub fn corners(&self) -> [DVec2; 4] {
        [
            self.min,
            DVec2::new(self.min.x, self.max.y),
            self.max,
            DVec2::new(self.max.x, self.min.y),
        ]
    }

    /// Clip the segment `a`-`b` against this box (Liang–Barsky).
    ///
    /// Endpoints that were moved are placed exactly on the side of the box
    /// that clipped them. Returns `None` when the segment lies completely
    /// outside the box.
    pub fn clip_segment(&self, a: DVec2, b: DVec2) -> Option<ClippedSegment> {
        let d = b - a;
        let mut t0 = 0f64;
        let mut t1 = 1f64;
        let mut entering = None;
        let mut leaving = None;

        // Each boundary is given as (p, q): the segment is inside where p * t <= q.
        let boundaries = [
            (Side::Left, -d.x, a.x - self.min.x),
            (Side::Right, d.x, self.max.x - a.x),
            (Side::Top, -d.y, a.y - self.min.y),
            (Side::Bottom, d.y, self.max.y - a.y),
        ];
        for (side, p, q) in boundaries {
            if p == 0. {
                if q < 0. {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0. {
                // entering
                if r > t1 {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                    entering = Some(side);
                }
            } else {
                // leaving
                if r < t0 {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                    leaving = Some(side);
                }
            }
        }

        Some(ClippedSegment {
            start: match entering {
                Some(side) => self.snap(a + t0 * d, side),
                None => a,
            },
            end: match leaving {
                Some(side) => self.snap(a + t1 * d, side),
                None => b,
            },
            trimmed: entering.is_some() || leaving.is_some(),
        })
    }

    /// Move a point computed on (or very near) `side` exactly onto it.
    fn snap(&self, p: DVec2, side: Side) -> DVec2 {
        let mut p = p.clamp(self.min, self.max);
        match side {
            Side::Left => p.x = self.min.x,
            Side::Right => p.x = self.max.x,
            Side::Top => p.y = self.min.y,
            Side::Bottom => p.y = self.max.y,
        }
        p
    }
}

#[derive(Clone, Copy, Debug)]
enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Result of [`BoundingBox::clip_segment`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClippedSegment {
    pub start: DVec2,
    pub end: DVec2,
    /// Whether either endpoint was moved onto the boundary.
    pub trimmed: bool,
}

/// The z-component of the cross product of `a` and `b`.
pub fn cross(a: DVec2, b: DVec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Twice the signed area of the triangle `a`, `b`, `c`.
///
/// Positive when the points are ordered counterclockwise (y-axis pointing up).
pub fn signed_area_tri(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    cross(b - a, c - a)
}

/// Center of the circle through `a`, `b` and `c`.
///
/// The computation is done relative to `a` to avoid catastrophic
/// cancellation. Returns `None` for (exactly) collinear points.
pub fn circumcenter(a: DVec2, b: DVec2, c: DVec2) -> Option<DVec2> {
    let b = b - a;
    let c = c - a;
    let d = 2. * cross(b, c);
    if d == 0. {
        return None;
    }
    let hb = b.length_squared();
    let hc = c.length_squared();
    Some(DVec2::new((c.y * hb - b.y * hc) / d, (b.x * hc - c.x * hb) / d) + a)
}

/// The x-coordinate of the intersection of the two parabolas with foci
/// `left` and `right` and common directrix `y = directrix`, on the side where
/// the parabola of `left` lies to the left.
///
/// A focus lying on the directrix degenerates to a vertical ray at its
/// x-coordinate.
pub fn parabola_breakpoint(left: DVec2, right: DVec2, directrix: f64) -> f64 {
    let pby2 = right.y - directrix;
    if pby2 == 0. {
        return right.x;
    }
    let plby2 = left.y - directrix;
    if plby2 == 0. {
        return left.x;
    }
    let hl = left.x - right.x;
    let aby2 = 1. / pby2 - 1. / plby2;
    let b = hl / plby2;
    if aby2 != 0. {
        let discriminant =
            b * b - 2. * aby2 * (hl * hl / (-2. * plby2) - left.y + plby2 / 2. + right.y - pby2 / 2.);
        return (-b + discriminant.sqrt()) / aby2 + right.x;
    }
    0.5 * (left.x + right.x)
}

#[cfg(test)]
mod test {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_circumcenter() {
        let center = circumcenter(
            DVec2::new(0., 0.),
            DVec2::new(4., 0.),
            DVec2::new(0., 4.),
        )
        .expect("Points are not collinear");
        assert_approx_eq!(f64, center.x, 2.);
        assert_approx_eq!(f64, center.y, 2.);

        assert!(circumcenter(DVec2::ZERO, DVec2::ONE, DVec2::splat(2.)).is_none());
    }

    #[test]
    fn test_breakpoint_equal_height() {
        // Two foci at the same height meet halfway.
        let x = parabola_breakpoint(DVec2::new(2., 0.), DVec2::new(6., 0.), 3.);
        assert_approx_eq!(f64, x, 4.);
    }

    #[test]
    fn test_breakpoint_on_directrix() {
        let x = parabola_breakpoint(DVec2::new(0., 0.), DVec2::new(5., 2.), 2.);
        assert_eq!(x, 5.);
    }

    #[test]
    fn test_breakpoint_is_equidistant() {
        let left = DVec2::new(1., 1.);
        let right = DVec2::new(4., 3.);
        let directrix = 5.;
        let x = parabola_breakpoint(left, right, directrix);
        // the point on the left parabola at x
        let y = ((x - left.x).powi(2) + left.y * left.y - directrix * directrix)
            / (2. * (left.y - directrix));
        let p = DVec2::new(x, y);
        assert_approx_eq!(f64, p.distance(left), p.distance(right), epsilon = 1e-9);
        assert_approx_eq!(f64, p.distance(left), directrix - y, epsilon = 1e-9);
    }

    #[test]
    fn test_clip_segment() {
        let bbox = BoundingBox::from_sides(0., 10., 0., 10.);
        let clipped = bbox
            .clip_segment(DVec2::new(-5., 5.), DVec2::new(15., 5.))
            .expect("Segment crosses the box");
        assert!(clipped.trimmed);
        assert_eq!(clipped.start, DVec2::new(0., 5.));
        assert_eq!(clipped.end, DVec2::new(10., 5.));

        let inside = bbox
            .clip_segment(DVec2::new(1., 1.), DVec2::new(2., 3.))
            .expect("Segment inside the box");
        assert!(!inside.trimmed);

        assert!(bbox
            .clip_segment(DVec2::new(-5., -1.), DVec2::new(15., -1.))
            .is_none());
        assert!(bbox
            .clip_segment(DVec2::new(11., 0.), DVec2::new(20., 10.))
            .is_none());
    }

    #[test]
    fn test_clip_long_segment_lands_on_sides() {
        // A nearly horizontal bisector through a thin, tall box.
        let bbox = BoundingBox::from_sides(0., 0.01, 0., 1000.);
        let a = DVec2::new(-1.7617050e7, 756.17);
        let b = DVec2::new(2.6891857e7, 451.27);
        let clipped = bbox.clip_segment(a, b).expect("Segment crosses the box");
        assert!(clipped.trimmed);
        assert_eq!(clipped.start.x, 0.);
        assert_eq!(clipped.end.x, 0.01);
        assert!(bbox.contains(clipped.start));
        assert!(bbox.contains(clipped.end));

        // Clipped at a corner
        let clipped = BoundingBox::from_sides(0., 10., 0., 10.)
            .clip_segment(DVec2::new(-1e12, -1e12), DVec2::new(3., 3.))
            .expect("Segment ends in the box");
        assert_eq!(clipped.end, DVec2::new(3., 3.));
        assert!(clipped.start.abs().max_element() < 1e-3);
        assert!(clipped.start.min_element() == 0.);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = BoundingBox::new(DVec2::new(1., 2.), DVec2::new(3., 4.));
        assert_eq!(bbox.left(), 1.);
        assert_eq!(bbox.right(), 4.);
        assert_eq!(bbox.top(), 2.);
        assert_eq!(bbox.bottom(), 6.);
        assert_eq!(bbox.area(), 12.);
        assert!(bbox.contains(DVec2::new(4., 6.)));
        assert!(!bbox.contains(DVec2::new(0., 3.)));

        let enclosing = BoundingBox::enclosing([DVec2::new(1., 5.), DVec2::new(-1., 2.)])
            .expect("Non-empty");
        assert_eq!(enclosing.min, DVec2::new(-1., 2.));
        assert_eq!(enclosing.max, DVec2::new(1., 5.));
    }
}
