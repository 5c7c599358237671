//! The array that backs the children of a document or element.
//!
//! A [`ChildSequence`] only does the bookkeeping of the array itself: growth,
//! shifting and the modification counter. The structural rules (single
//! owner, no cycles, document placement) need the whole tree and are
//! enforced by the manipulation methods on [`XmlData`](crate::XmlData),
//! which are the only way to change a sequence.

use tracing::trace;

use crate::xmldata::Node;

const INITIAL_CAPACITY: usize = 5;

/// Ordered children of a container node.
///
/// Every structural change increments the modification counter. Views and
/// cursors compare it against the value they last saw to detect changes
/// made behind their back.
#[derive(Debug, Clone, Default)]
pub struct ChildSequence {
    nodes: Vec<Node>,
    mod_count: u64,
}

// State of a sequence before a bulk insert, restored when the insert fails.
pub(crate) struct Snapshot {
    nodes: Vec<Node>,
    mod_count: u64,
}

impl ChildSequence {
    pub(crate) fn new() -> Self {
        ChildSequence {
            nodes: Vec::new(),
            mod_count: 0,
        }
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if there are no children.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child at `index`.
    pub fn get(&self, index: usize) -> Option<Node> {
        self.nodes.get(index).copied()
    }

    /// The children as a slice.
    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    /// Iterate over the children in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Node> + ExactSizeIterator + '_ {
        self.nodes.iter().copied()
    }

    /// Position of `node` in this sequence.
    pub fn index_of(&self, node: Node) -> Option<usize> {
        self.nodes.iter().position(|n| *n == node)
    }

    /// Slots allocated for children.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// The modification counter.
    ///
    /// Increases with every insert, removal, replacement and clear; it never
    /// decreases except when a failed bulk insert restores its snapshot.
    pub fn mod_count(&self) -> u64 {
        self.mod_count
    }

    // capacity grows to max(1.5 * old + 1, required), starting at a handful
    // of slots on the first insert
    pub(crate) fn ensure_capacity(&mut self, required: usize) {
        let capacity = self.nodes.capacity();
        if required <= capacity {
            return;
        }
        let new_capacity = if capacity == 0 {
            INITIAL_CAPACITY.max(required)
        } else {
            (capacity * 3 / 2 + 1).max(required)
        };
        trace!(from = capacity, to = new_capacity, "growing child sequence");
        let mut grown = Vec::with_capacity(new_capacity);
        grown.extend_from_slice(&self.nodes);
        self.nodes = grown;
    }

    pub(crate) fn insert_raw(&mut self, index: usize, node: Node) {
        self.ensure_capacity(self.nodes.len() + 1);
        self.nodes.insert(index, node);
        self.mod_count += 1;
    }

    pub(crate) fn remove_raw(&mut self, index: usize) -> Node {
        let node = self.nodes.remove(index);
        self.mod_count += 1;
        node
    }

    pub(crate) fn clear_raw(&mut self) -> Vec<Node> {
        self.mod_count += 1;
        std::mem::take(&mut self.nodes)
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            mod_count: self.mod_count,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.nodes = snapshot.nodes;
        self.mod_count = snapshot.mod_count;
    }
}

impl<'a> IntoIterator for &'a ChildSequence {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XmlData;

    #[test]
    fn test_growth_policy() {
        let mut data = XmlData::new();
        let nodes = (0..20).map(|_| data.new_comment("c")).collect::<Vec<_>>();
        let mut sequence = ChildSequence::new();
        assert_eq!(sequence.capacity(), 0);
        sequence.insert_raw(0, nodes[0]);
        assert!(sequence.capacity() >= INITIAL_CAPACITY);
        for (i, node) in nodes.iter().enumerate().skip(1) {
            sequence.insert_raw(i, *node);
        }
        assert_eq!(sequence.len(), 20);
        assert_eq!(sequence.as_slice(), nodes.as_slice());
    }

    #[test]
    fn test_ensure_capacity_required_minimum_wins() {
        let mut sequence = ChildSequence::new();
        sequence.ensure_capacity(40);
        assert!(sequence.capacity() >= 40);
    }

    #[test]
    fn test_mod_count_increments() {
        let mut data = XmlData::new();
        let a = data.new_comment("a");
        let b = data.new_comment("b");
        let mut sequence = ChildSequence::new();
        sequence.insert_raw(0, a);
        sequence.insert_raw(1, b);
        assert_eq!(sequence.mod_count(), 2);
        assert_eq!(sequence.remove_raw(0), a);
        assert_eq!(sequence.mod_count(), 3);
        assert_eq!(sequence.clear_raw(), vec![b]);
        assert_eq!(sequence.mod_count(), 4);
        assert!(sequence.is_empty());
    }

    #[test]
    fn test_snapshot_restore() {
        let mut data = XmlData::new();
        let a = data.new_comment("a");
        let b = data.new_comment("b");
        let mut sequence = ChildSequence::new();
        sequence.insert_raw(0, a);
        let snapshot = sequence.snapshot();
        sequence.insert_raw(1, b);
        sequence.restore(snapshot);
        assert_eq!(sequence.as_slice(), &[a]);
        assert_eq!(sequence.mod_count(), 1);
    }
}
