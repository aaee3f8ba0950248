//! An arena backed red-black tree whose nodes are also threaded into a doubly
//! linked list (in-order predecessor and successor).
//!
//! The tree has no notion of keys: nodes are inserted as the successor of a
//! given node (or as the new first node), and the caller descends the tree
//! itself to find the insertion point. Removed nodes stay in the arena, so
//! their ids are never reused during the lifetime of the tree.

pub(super) type NodeId = usize;

#[derive(Debug)]
struct Node<T> {
    value: T,
    red: bool,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    previous: Option<NodeId>,
    next: Option<NodeId>,
}

#[derive(Debug)]
pub(super) struct RbTree<T> {
    nodes: Vec<Node<T>>,
    root: Option<NodeId>,
    len: usize,
}

impl<T> RbTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![],
            root: None,
            len: 0,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes currently linked into the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn get(&self, id: NodeId) -> &T {
        &self.nodes[id].value
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id].value
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].right
    }

    pub fn previous(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].previous
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].next
    }

    /// The first node in order.
    #[cfg(test)]
    pub fn first(&self) -> Option<NodeId> {
        self.root.map(|root| self.leftmost(root))
    }

    /// Iterate over the linked nodes in order.
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.first(), move |&id| self.next(id))
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    fn is_red(&self, id: Option<NodeId>) -> bool {
        id.map_or(false, |id| self.nodes[id].red)
    }

    /// Insert `value` directly after `node` in order, or as the first node if
    /// `node` is `None`. Returns the id of the new node.
    pub fn insert_successor(&mut self, node: Option<NodeId>, value: T) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            value,
            red: true,
            parent: None,
            left: None,
            right: None,
            previous: None,
            next: None,
        });
        self.len += 1;

        let parent = match (node, self.root) {
            (Some(node), _) => {
                let next = self.nodes[node].next;
                self.nodes[id].previous = Some(node);
                self.nodes[id].next = next;
                if let Some(next) = next {
                    self.nodes[next].previous = Some(id);
                }
                self.nodes[node].next = Some(id);
                let parent = match self.nodes[node].right {
                    Some(right) => {
                        let parent = self.leftmost(right);
                        self.nodes[parent].left = Some(id);
                        parent
                    }
                    None => {
                        self.nodes[node].right = Some(id);
                        node
                    }
                };
                Some(parent)
            }
            (None, Some(root)) => {
                let first = self.leftmost(root);
                self.nodes[id].next = Some(first);
                self.nodes[first].previous = Some(id);
                self.nodes[first].left = Some(id);
                Some(first)
            }
            (None, None) => {
                self.root = Some(id);
                None
            }
        };
        self.nodes[id].parent = parent;

        self.rebalance_after_insert(id);
        id
    }

    fn rebalance_after_insert(&mut self, mut node: NodeId) {
        while let Some(mut parent) = self.nodes[node].parent {
            if !self.nodes[parent].red {
                break;
            }
            // A red node is never the root, so the grandparent exists.
            let grandpa = self.nodes[parent]
                .parent
                .expect("Red node cannot be the root!");
            if self.nodes[grandpa].left == Some(parent) {
                let uncle = self.nodes[grandpa].right;
                if self.is_red(uncle) {
                    self.nodes[parent].red = false;
                    self.nodes[uncle.expect("Uncle is red")].red = false;
                    self.nodes[grandpa].red = true;
                    node = grandpa;
                } else {
                    if self.nodes[parent].right == Some(node) {
                        self.rotate_left(parent);
                        node = parent;
                        parent = self.nodes[node].parent.expect("Rotated node has a parent");
                    }
                    self.nodes[parent].red = false;
                    self.nodes[grandpa].red = true;
                    self.rotate_right(grandpa);
                }
            } else {
                let uncle = self.nodes[grandpa].left;
                if self.is_red(uncle) {
                    self.nodes[parent].red = false;
                    self.nodes[uncle.expect("Uncle is red")].red = false;
                    self.nodes[grandpa].red = true;
                    node = grandpa;
                } else {
                    if self.nodes[parent].left == Some(node) {
                        self.rotate_right(parent);
                        node = parent;
                        parent = self.nodes[node].parent.expect("Rotated node has a parent");
                    }
                    self.nodes[parent].red = false;
                    self.nodes[grandpa].red = true;
                    self.rotate_left(grandpa);
                }
            }
        }
        if let Some(root) = self.root {
            self.nodes[root].red = false;
        }
    }

    /// Unlink `node` from the tree and from the in-order list.
    pub fn remove(&mut self, node: NodeId) {
        let previous = self.nodes[node].previous;
        let next_in_order = self.nodes[node].next;
        if let Some(n) = next_in_order {
            self.nodes[n].previous = previous;
        }
        if let Some(p) = previous {
            self.nodes[p].next = next_in_order;
        }
        self.nodes[node].previous = None;
        self.nodes[node].next = None;
        self.len -= 1;

        let mut parent = self.nodes[node].parent;
        let left = self.nodes[node].left;
        let right = self.nodes[node].right;
        let next = match (left, right) {
            (None, _) => right,
            (_, None) => left,
            (Some(_), Some(right)) => Some(self.leftmost(right)),
        };
        match parent {
            Some(p) if self.nodes[p].left == Some(node) => self.nodes[p].left = next,
            Some(p) => self.nodes[p].right = next,
            None => self.root = next,
        }

        let is_red;
        let mut current;
        if let (Some(left), Some(right)) = (left, right) {
            let next = next.expect("Node with two children has a successor");
            is_red = self.nodes[next].red;
            self.nodes[next].red = self.nodes[node].red;
            self.nodes[next].left = Some(left);
            self.nodes[left].parent = Some(next);
            if next != right {
                let next_parent = self.nodes[next].parent.expect("Successor has a parent");
                self.nodes[next].parent = self.nodes[node].parent;
                current = self.nodes[next].right;
                self.nodes[next_parent].left = current;
                self.nodes[next].right = Some(right);
                self.nodes[right].parent = Some(next);
                parent = Some(next_parent);
            } else {
                self.nodes[next].parent = parent;
                parent = Some(next);
                current = self.nodes[next].right;
            }
        } else {
            is_red = self.nodes[node].red;
            current = next;
        }
        if let Some(c) = current {
            self.nodes[c].parent = parent;
        }
        self.nodes[node].parent = None;
        self.nodes[node].left = None;
        self.nodes[node].right = None;

        if is_red {
            return;
        }
        if let Some(c) = current {
            if self.nodes[c].red {
                self.nodes[c].red = false;
                return;
            }
        }

        loop {
            if current == self.root {
                break;
            }
            let p = parent.expect("Non-root node has a parent");
            if self.nodes[p].left == current {
                let mut sibling = self.nodes[p].right.expect("Black height requires a sibling");
                if self.nodes[sibling].red {
                    self.nodes[sibling].red = false;
                    self.nodes[p].red = true;
                    self.rotate_left(p);
                    sibling = self.nodes[p].right.expect("Black height requires a sibling");
                }
                if self.is_red(self.nodes[sibling].left) || self.is_red(self.nodes[sibling].right) {
                    if !self.is_red(self.nodes[sibling].right) {
                        let nephew = self.nodes[sibling].left.expect("Red nephew exists");
                        self.nodes[nephew].red = false;
                        self.nodes[sibling].red = true;
                        self.rotate_right(sibling);
                        sibling = self.nodes[p].right.expect("Black height requires a sibling");
                    }
                    self.nodes[sibling].red = self.nodes[p].red;
                    self.nodes[p].red = false;
                    let nephew = self.nodes[sibling].right.expect("Red nephew exists");
                    self.nodes[nephew].red = false;
                    self.rotate_left(p);
                    current = self.root;
                    break;
                }
                self.nodes[sibling].red = true;
            } else {
                let mut sibling = self.nodes[p].left.expect("Black height requires a sibling");
                if self.nodes[sibling].red {
                    self.nodes[sibling].red = false;
                    self.nodes[p].red = true;
                    self.rotate_right(p);
                    sibling = self.nodes[p].left.expect("Black height requires a sibling");
                }
                if self.is_red(self.nodes[sibling].left) || self.is_red(self.nodes[sibling].right) {
                    if !self.is_red(self.nodes[sibling].left) {
                        let nephew = self.nodes[sibling].right.expect("Red nephew exists");
                        self.nodes[nephew].red = false;
                        self.nodes[sibling].red = true;
                        self.rotate_left(sibling);
                        sibling = self.nodes[p].left.expect("Black height requires a sibling");
                    }
                    self.nodes[sibling].red = self.nodes[p].red;
                    self.nodes[p].red = false;
                    let nephew = self.nodes[sibling].left.expect("Red nephew exists");
                    self.nodes[nephew].red = false;
                    self.rotate_right(p);
                    current = self.root;
                    break;
                }
                self.nodes[sibling].red = true;
            }
            current = Some(p);
            parent = self.nodes[p].parent;
            if self.nodes[p].red {
                break;
            }
        }
        if let Some(c) = current {
            self.nodes[c].red = false;
        }
    }

    fn rotate_left(&mut self, p: NodeId) {
        let q = self.nodes[p].right.expect("Cannot rotate left without right child");
        let parent = self.nodes[p].parent;
        match parent {
            Some(parent) if self.nodes[parent].left == Some(p) => self.nodes[parent].left = Some(q),
            Some(parent) => self.nodes[parent].right = Some(q),
            None => self.root = Some(q),
        }
        self.nodes[q].parent = parent;
        self.nodes[p].parent = Some(q);
        self.nodes[p].right = self.nodes[q].left;
        if let Some(r) = self.nodes[p].right {
            self.nodes[r].parent = Some(p);
        }
        self.nodes[q].left = Some(p);
    }

    fn rotate_right(&mut self, p: NodeId) {
        let q = self.nodes[p].left.expect("Cannot rotate right without left child");
        let parent = self.nodes[p].parent;
        match parent {
            Some(parent) if self.nodes[parent].left == Some(p) => self.nodes[parent].left = Some(q),
            Some(parent) => self.nodes[parent].right = Some(q),
            None => self.root = Some(q),
        }
        self.nodes[q].parent = parent;
        self.nodes[p].parent = Some(q);
        self.nodes[p].left = self.nodes[q].right;
        if let Some(l) = self.nodes[p].left {
            self.nodes[l].parent = Some(p);
        }
        self.nodes[q].right = Some(p);
    }

    /// Check the red-black and threading invariants, returning the black
    /// height of the tree.
    #[cfg(test)]
    fn check(&self) -> usize {
        fn black_height<T>(tree: &RbTree<T>, node: Option<NodeId>, parent: Option<NodeId>) -> usize {
            let Some(id) = node else {
                return 1;
            };
            let n = &tree.nodes[id];
            assert_eq!(n.parent, parent, "Broken parent link at {id}");
            if n.red {
                assert!(!tree.is_red(n.left) && !tree.is_red(n.right), "Red node {id} has a red child");
            }
            let l = black_height(tree, n.left, node);
            let r = black_height(tree, n.right, node);
            assert_eq!(l, r, "Unequal black height at {id}");
            l + usize::from(!n.red)
        }
        assert!(!self.is_red(self.root), "Red root");

        // The threaded list must match an in-order traversal.
        fn in_order<T>(tree: &RbTree<T>, node: Option<NodeId>, out: &mut Vec<NodeId>) {
            if let Some(id) = node {
                in_order(tree, tree.nodes[id].left, out);
                out.push(id);
                in_order(tree, tree.nodes[id].right, out);
            }
        }
        let mut expected = vec![];
        in_order(self, self.root, &mut expected);
        assert_eq!(self.iter().collect::<Vec<_>>(), expected);
        assert_eq!(expected.len(), self.len);

        black_height(self, self.root, None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{prelude::*, rngs::StdRng};

    #[test]
    fn test_insert_in_order() {
        let mut tree = RbTree::new();
        let mut last = None;
        for i in 0..100 {
            last = Some(tree.insert_successor(last, i));
            tree.check();
        }
        let values: Vec<_> = tree.iter().map(|id| *tree.get(id)).collect();
        assert_eq!(values, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_insert_first() {
        let mut tree = RbTree::new();
        for i in 0..50 {
            tree.insert_successor(None, i);
        }
        tree.check();
        let values: Vec<_> = tree.iter().map(|id| *tree.get(id)).collect();
        assert_eq!(values, (0..50).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_random_insert_remove() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tree = RbTree::new();
        // mirror of the expected in-order sequence
        let mut order: Vec<NodeId> = vec![];
        for step in 0..2000 {
            if order.is_empty() || rng.gen_bool(0.6) {
                let pos = rng.gen_range(0..=order.len());
                let after = if pos == 0 { None } else { Some(order[pos - 1]) };
                let id = tree.insert_successor(after, step);
                order.insert(pos, id);
            } else {
                let pos = rng.gen_range(0..order.len());
                tree.remove(order.remove(pos));
            }
            tree.check();
            assert_eq!(tree.iter().collect::<Vec<_>>(), order);
        }
        while let Some(id) = order.pop() {
            tree.remove(id);
            tree.check();
        }
        assert!(tree.root().is_none());
        assert_eq!(tree.len(), 0);
    }
}
