use std::{cmp::Ordering, collections::BTreeSet};

use glam::DVec2;

use super::rb_tree::NodeId;

pub(super) type EventId = usize;

/// A predicted collapse of a beach section.
#[derive(Clone, Debug)]
pub(super) struct CircleEvent {
    /// The beach section that disappears when this event fires.
    pub arc: NodeId,
    /// The lowest point of the circle through the three sites; the event
    /// fires when the sweep line reaches `at.y`.
    pub at: DVec2,
    /// The y-coordinate of the circle's center (the x-coordinate is `at.x`).
    pub y_center: f64,
}

impl CircleEvent {
    /// The Voronoi vertex created when this event fires.
    pub fn vertex(&self) -> DVec2 {
        DVec2::new(self.at.x, self.y_center)
    }
}

/// Ordering key of the queue: firing point (y first, then x), with the
/// creation order as final tie-break.
#[derive(Clone, Copy, Debug)]
struct EventKey {
    at: DVec2,
    id: EventId,
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EventKey {}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at
            .y
            .total_cmp(&other.at.y)
            .then(self.at.x.total_cmp(&other.at.x))
            .then(self.id.cmp(&other.id))
    }
}

/// Pending circle events, supporting extraction of the earliest event as well
/// as removal of arbitrary events.
#[derive(Debug, Default)]
pub(super) struct CircleEventQueue {
    events: Vec<CircleEvent>,
    queue: BTreeSet<EventKey>,
}

impl CircleEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: EventId) -> &CircleEvent {
        &self.events[id]
    }

    /// Schedule a new event, returning its id.
    pub fn push(&mut self, event: CircleEvent) -> EventId {
        let id = self.events.len();
        self.queue.insert(EventKey { at: event.at, id });
        self.events.push(event);
        id
    }

    /// Cancel a scheduled event.
    pub fn remove(&mut self, id: EventId) {
        let removed = self.queue.remove(&EventKey {
            at: self.events[id].at,
            id,
        });
        debug_assert!(removed, "Circle event {id} was not scheduled!");
    }

    /// The earliest pending event.
    pub fn first(&self) -> Option<&CircleEvent> {
        self.queue.first().map(|key| &self.events[key.id])
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn event(arc: NodeId, x: f64, y: f64) -> CircleEvent {
        CircleEvent {
            arc,
            at: DVec2::new(x, y),
            y_center: y - 1.,
        }
    }

    #[test]
    fn test_ordering() {
        let mut queue = CircleEventQueue::new();
        queue.push(event(0, 0., 3.));
        queue.push(event(1, 2., 1.));
        queue.push(event(2, 1., 1.));
        assert_eq!(queue.first().map(|e| e.arc), Some(2));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_tie_break_on_insertion_order() {
        let mut queue = CircleEventQueue::new();
        let first = queue.push(event(5, 1., 1.));
        queue.push(event(6, 1., 1.));
        assert_eq!(queue.first().map(|e| e.arc), Some(5));
        queue.remove(first);
        assert_eq!(queue.first().map(|e| e.arc), Some(6));
    }

    #[test]
    fn test_remove_arbitrary() {
        let mut queue = CircleEventQueue::new();
        let a = queue.push(event(0, 0., 1.));
        let b = queue.push(event(1, 0., 2.));
        let c = queue.push(event(2, 0., 3.));
        queue.remove(b);
        assert_eq!(queue.first().map(|e| e.arc), Some(0));
        queue.remove(a);
        assert_eq!(queue.first().map(|e| e.arc), Some(2));
        queue.remove(c);
        assert!(queue.is_empty());
        assert_eq!(queue.get(b).vertex(), DVec2::new(0., 1.));
    }
}
