use std::collections::VecDeque;

use glam::DVec2;

use crate::geometry::{
    approx_eq, circumcenter, cross, parabola_breakpoint, CIRCLE_EVENT_EPSILON, EPSILON,
};

use super::{
    builder::DiagramBuilder,
    circle_event::{CircleEvent, CircleEventQueue, EventId},
    rb_tree::{NodeId, RbTree},
    Site,
};

/// One parabolic arc of the beach line.
#[derive(Clone, Debug)]
struct BeachSection {
    /// Index of the site this arc belongs to.
    site: usize,
    /// The edge traced by the breakpoint between this arc and its left
    /// neighbour.
    edge: Option<usize>,
    /// The scheduled collapse of this arc, if any.
    circle_event: Option<EventId>,
}

impl BeachSection {
    fn new(site: usize) -> Self {
        Self {
            site,
            edge: None,
            circle_event: None,
        }
    }
}

/// Position of a new site relative to the existing arcs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bracket {
    /// There are no arcs yet.
    Empty,
    /// The site falls strictly inside an arc.
    Split(NodeId),
    /// The site lies to the right of the last arc, whose focus lies on the
    /// sweep line.
    Append(NodeId),
    /// The site falls exactly on the breakpoint between two adjacent arcs.
    Between(NodeId, NodeId),
}

/// The ordered sequence of arcs at the current position of the sweep line,
/// together with the circle events predicting their collapse.
///
/// Sites are referred to by their index in the `sites` slice.
pub(super) struct BeachLine<'a> {
    sites: &'a [Site],
    arcs: RbTree<BeachSection>,
    circle_events: CircleEventQueue,
}

impl<'a> BeachLine<'a> {
    pub fn new(sites: &'a [Site]) -> Self {
        Self {
            sites,
            arcs: RbTree::new(),
            circle_events: CircleEventQueue::new(),
        }
    }

    /// The earliest pending circle event.
    pub fn first_circle_event(&self) -> Option<&CircleEvent> {
        self.circle_events.first()
    }

    /// Number of arcs in the beach line.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Number of scheduled circle events.
    pub fn pending_circle_events(&self) -> usize {
        self.circle_events.len()
    }

    fn site_of(&self, arc: NodeId) -> usize {
        self.arcs.get(arc).site
    }

    fn loc_of(&self, arc: NodeId) -> DVec2 {
        self.sites[self.site_of(arc)].loc()
    }

    fn edge_of(&self, arc: NodeId) -> usize {
        self.arcs
            .get(arc)
            .edge
            .expect("Every arc with a left neighbour traces an edge")
    }

    fn left_break_point(&self, arc: NodeId, directrix: f64) -> f64 {
        let focus = self.loc_of(arc);
        match self.arcs.previous(arc) {
            Some(previous) => parabola_breakpoint(self.loc_of(previous), focus, directrix),
            None if focus.y == directrix => focus.x,
            None => f64::NEG_INFINITY,
        }
    }

    fn right_break_point(&self, arc: NodeId, directrix: f64) -> f64 {
        if let Some(next) = self.arcs.next(arc) {
            return self.left_break_point(next, directrix);
        }
        let focus = self.loc_of(arc);
        if focus.y == directrix {
            focus.x
        } else {
            f64::INFINITY
        }
    }

    /// Descend the beach line to find the arc(s) above `loc`.
    fn find_bracket(&self, loc: DVec2) -> Bracket {
        let (x, directrix) = (loc.x, loc.y);
        let mut node = self.arcs.root();
        while let Some(arc) = node {
            let dxl = self.left_break_point(arc, directrix) - x;
            if dxl > EPSILON {
                node = self.arcs.left(arc);
                continue;
            }
            let dxr = x - self.right_break_point(arc, directrix);
            if dxr > EPSILON {
                match self.arcs.right(arc) {
                    Some(right) => node = Some(right),
                    None => return Bracket::Append(arc),
                }
                continue;
            }
            let previous = self.arcs.previous(arc);
            let next = self.arcs.next(arc);
            let bracket = match (previous, next) {
                (Some(previous), _) if dxl > -EPSILON => Bracket::Between(previous, arc),
                (_, Some(next)) if dxr > -EPSILON => Bracket::Between(arc, next),
                (_, None) if dxr > -EPSILON => Bracket::Append(arc),
                _ => Bracket::Split(arc),
            };
            return match bracket {
                // The circumcenter is undefined if the three sites are
                // collinear; fall back to splitting the left arc.
                Bracket::Between(l, r)
                    if circumcenter(self.loc_of(l), loc, self.loc_of(r)).is_none() =>
                {
                    Bracket::Split(l)
                }
                bracket => bracket,
            };
        }
        Bracket::Empty
    }

    /// Process a site event: insert a new arc for `site` into the beach line.
    pub fn add_beach_section(&mut self, site: usize, diagram: &mut DiagramBuilder) {
        let loc = self.sites[site].loc();
        match self.find_bracket(loc) {
            Bracket::Empty => {
                self.arcs.insert_successor(None, BeachSection::new(site));
            }
            Bracket::Split(arc) => {
                // Split the arc in two and insert the new arc in between.
                self.detach_circle_event(arc);
                let old_site = self.site_of(arc);
                let new_arc = self.arcs.insert_successor(Some(arc), BeachSection::new(site));
                let copy = self
                    .arcs
                    .insert_successor(Some(new_arc), BeachSection::new(old_site));
                let edge = diagram.create_edge(old_site, site, None, None);
                self.arcs.get_mut(new_arc).edge = Some(edge);
                self.arcs.get_mut(copy).edge = Some(edge);
                self.attach_circle_event(arc);
                self.attach_circle_event(copy);
            }
            Bracket::Append(arc) => {
                // All arcs have their focus on the sweep line, nothing can
                // collapse yet.
                let new_arc = self.arcs.insert_successor(Some(arc), BeachSection::new(site));
                let edge = diagram.create_edge(self.site_of(arc), site, None, None);
                self.arcs.get_mut(new_arc).edge = Some(edge);
            }
            Bracket::Between(l_arc, r_arc) => {
                self.detach_circle_event(l_arc);
                self.detach_circle_event(r_arc);
                let l_site = self.site_of(l_arc);
                let r_site = self.site_of(r_arc);
                let vertex = circumcenter(self.sites[l_site].loc(), loc, self.sites[r_site].loc())
                    .expect("Collinear brackets are split instead");

                // The breakpoint between both arcs ends here.
                diagram.set_edge_start_point(self.edge_of(r_arc), l_site, r_site, vertex);

                let new_arc = self
                    .arcs
                    .insert_successor(Some(l_arc), BeachSection::new(site));
                let edge = diagram.create_edge(l_site, site, None, Some(vertex));
                self.arcs.get_mut(new_arc).edge = Some(edge);
                let edge = diagram.create_edge(site, r_site, None, Some(vertex));
                self.arcs.get_mut(r_arc).edge = Some(edge);

                self.attach_circle_event(l_arc);
                self.attach_circle_event(r_arc);
            }
        }
    }

    /// Process the circle event of `arc`: remove the arc (and any neighbours
    /// collapsing at the same vertex) from the beach line.
    pub fn remove_beach_section(&mut self, arc: NodeId, diagram: &mut DiagramBuilder) {
        let event = self
            .arcs
            .get(arc)
            .circle_event
            .map(|id| self.circle_events.get(id).clone())
            .expect("Only arcs with a scheduled circle event are removed");
        let vertex = event.vertex();
        let previous = self
            .arcs
            .previous(arc)
            .expect("A collapsing arc has a left neighbour");
        let next = self
            .arcs
            .next(arc)
            .expect("A collapsing arc has a right neighbour");

        let mut disappearing = VecDeque::from([arc]);
        self.detach_beach_section(arc);

        // Collect the neighbours that collapse at the same vertex.
        let mut l_arc = previous;
        while self.collapses_at(l_arc, vertex) {
            let previous = self
                .arcs
                .previous(l_arc)
                .expect("A collapsing arc has a left neighbour");
            disappearing.push_front(l_arc);
            self.detach_beach_section(l_arc);
            l_arc = previous;
        }
        disappearing.push_front(l_arc);
        self.detach_circle_event(l_arc);

        let mut r_arc = next;
        while self.collapses_at(r_arc, vertex) {
            let next = self
                .arcs
                .next(r_arc)
                .expect("A collapsing arc has a right neighbour");
            disappearing.push_back(r_arc);
            self.detach_beach_section(r_arc);
            r_arc = next;
        }
        disappearing.push_back(r_arc);
        self.detach_circle_event(r_arc);

        if disappearing.len() > 3 {
            tracing::trace!(
                "{} arcs collapse simultaneously at {:?}",
                disappearing.len() - 2,
                vertex
            );
        }

        // Every breakpoint between two collapsing arcs ends at the vertex.
        for (&l, &r) in disappearing.iter().zip(disappearing.iter().skip(1)) {
            diagram.set_edge_start_point(self.edge_of(r), self.site_of(l), self.site_of(r), vertex);
        }

        // A single new breakpoint starts at the vertex between the surviving
        // neighbours.
        let edge = diagram.create_edge(self.site_of(l_arc), self.site_of(r_arc), None, Some(vertex));
        self.arcs.get_mut(r_arc).edge = Some(edge);
        self.attach_circle_event(l_arc);
        self.attach_circle_event(r_arc);
    }

    /// Whether the circle event of `arc` fires at `vertex`.
    fn collapses_at(&self, arc: NodeId, vertex: DVec2) -> bool {
        self.arcs
            .get(arc)
            .circle_event
            .map_or(false, |id| approx_eq(self.circle_events.get(id).vertex(), vertex))
    }

    fn detach_beach_section(&mut self, arc: NodeId) {
        self.detach_circle_event(arc);
        self.arcs.remove(arc);
    }

    fn detach_circle_event(&mut self, arc: NodeId) {
        if let Some(id) = self.arcs.get_mut(arc).circle_event.take() {
            self.circle_events.remove(id);
        }
    }

    /// Schedule the collapse of `arc` if it converges with its two neighbours.
    fn attach_circle_event(&mut self, arc: NodeId) {
        let (Some(l_arc), Some(r_arc)) = (self.arcs.previous(arc), self.arcs.next(arc)) else {
            return;
        };
        if self.site_of(l_arc) == self.site_of(r_arc) {
            return;
        }
        let b = self.loc_of(arc);
        let a = self.loc_of(l_arc);
        let c = self.loc_of(r_arc);

        // The breakpoints only converge if the sites turn clockwise (with the
        // y-axis pointing down).
        if 2. * cross(a - b, c - b) >= -CIRCLE_EVENT_EPSILON {
            return;
        }
        let Some(center) = circumcenter(b, a, c) else {
            return;
        };
        let event = CircleEvent {
            arc,
            at: DVec2::new(center.x, center.y + center.distance(b)),
            y_center: center.y,
        };
        let id = self.circle_events.push(event);
        self.arcs.get_mut(arc).circle_event = Some(id);
    }

    /// The site indices of the arcs, in order.
    #[cfg(test)]
    fn arc_sites(&self) -> Vec<usize> {
        self.arcs.iter().map(|arc| self.site_of(arc)).collect()
    }
}
