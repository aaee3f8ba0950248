use glam::DVec2;

use crate::geometry::{BoundingBox, EPSILON};

impl BoundingBox {
    /// Extend the perpendicular bisector of `left` and `right` to the boundary
    /// of this box.
    ///
    /// The bisector is traversed with `left` on its left. If `start` is given,
    /// the edge already starts there and only the far end is computed (after
    /// moving `start` onto the boundary when it lies beyond it). Returns `None`
    /// when the bisector misses the box.
    pub(super) fn extend_bisector(
        &self,
        left: DVec2,
        right: DVec2,
        start: Option<DVec2>,
    ) -> Option<(DVec2, DVec2)> {
        let (xl, xr, yt, yb) = (self.left(), self.right(), self.top(), self.bottom());
        let f = 0.5 * (left + right);

        if right.y == left.y {
            // Vertical bisector
            if f.x < xl || f.x >= xr {
                return None;
            }
            return if left.x > right.x {
                let start = match start {
                    Some(s) if s.y >= yt => {
                        if s.y >= yb {
                            return None;
                        }
                        s
                    }
                    _ => DVec2::new(f.x, yt),
                };
                Some((start, DVec2::new(f.x, yb)))
            } else {
                let start = match start {
                    Some(s) if s.y <= yb => {
                        if s.y < yt {
                            return None;
                        }
                        s
                    }
                    _ => DVec2::new(f.x, yb),
                };
                Some((start, DVec2::new(f.x, yt)))
            };
        }

        let fm = (left.x - right.x) / (right.y - left.y);
        let fb = f.y - fm * f.x;
        if !(-1. ..=1.).contains(&fm) {
            // Closer to vertical: connect the top and bottom sides.
            if left.x > right.x {
                let start = match start {
                    Some(s) if s.y >= yt => {
                        if s.y >= yb {
                            return None;
                        }
                        s
                    }
                    _ => DVec2::new((yt - fb) / fm, yt),
                };
                Some((start, DVec2::new((yb - fb) / fm, yb)))
            } else {
                let start = match start {
                    Some(s) if s.y <= yb => {
                        if s.y < yt {
                            return None;
                        }
                        s
                    }
                    _ => DVec2::new((yb - fb) / fm, yb),
                };
                Some((start, DVec2::new((yt - fb) / fm, yt)))
            }
        } else {
            // Closer to horizontal: connect the left and right sides.
            if left.y < right.y {
                let start = match start {
                    Some(s) if s.x >= xl => {
                        if s.x >= xr {
                            return None;
                        }
                        s
                    }
                    _ => DVec2::new(xl, fm * xl + fb),
                };
                Some((start, DVec2::new(xr, fm * xr + fb)))
            } else {
                let start = match start {
                    Some(s) if s.x <= xr => {
                        if s.x < xl {
                            return None;
                        }
                        s
                    }
                    _ => DVec2::new(xr, fm * xr + fb),
                };
                Some((start, DVec2::new(xl, fm * xl + fb)))
            }
        }
    }
}

/// A side of the bounding box, as walked when closing a cell: down the left
/// side, right along the bottom, up the right side and back along the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum BoxSide {
    Left,
    Bottom,
    Right,
    Top,
}

impl BoxSide {
    /// The side along which a walk starting at `p` continues, if `p` lies on
    /// the boundary of `bbox` and is not the last corner of that side.
    pub fn starting_at(p: DVec2, bbox: &BoundingBox) -> Option<Self> {
        if eq(p.x, bbox.left()) && bbox.bottom() - p.y > EPSILON {
            Some(BoxSide::Left)
        } else if eq(p.y, bbox.bottom()) && bbox.right() - p.x > EPSILON {
            Some(BoxSide::Bottom)
        } else if eq(p.x, bbox.right()) && p.y - bbox.top() > EPSILON {
            Some(BoxSide::Right)
        } else if eq(p.y, bbox.top()) && p.x - bbox.left() > EPSILON {
            Some(BoxSide::Top)
        } else {
            None
        }
    }

    pub fn next(self) -> Self {
        match self {
            BoxSide::Left => BoxSide::Bottom,
            BoxSide::Bottom => BoxSide::Right,
            BoxSide::Right => BoxSide::Top,
            BoxSide::Top => BoxSide::Left,
        }
    }

    /// Walk along this side towards `target`. Returns the point where the walk
    /// along this side ends and whether `target` was reached.
    pub fn walk(self, target: DVec2, bbox: &BoundingBox) -> (DVec2, bool) {
        match self {
            BoxSide::Left => {
                let reached = eq(target.x, bbox.left());
                let y = if reached { target.y } else { bbox.bottom() };
                (DVec2::new(bbox.left(), y), reached)
            }
            BoxSide::Bottom => {
                let reached = eq(target.y, bbox.bottom());
                let x = if reached { target.x } else { bbox.right() };
                (DVec2::new(x, bbox.bottom()), reached)
            }
            BoxSide::Right => {
                let reached = eq(target.x, bbox.right());
                let y = if reached { target.y } else { bbox.top() };
                (DVec2::new(bbox.right(), y), reached)
            }
            BoxSide::Top => {
                let reached = eq(target.y, bbox.top());
                let x = if reached { target.x } else { bbox.left() };
                (DVec2::new(x, bbox.top()), reached)
            }
        }
    }
}

fn eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}
