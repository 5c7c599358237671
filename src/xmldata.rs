use indextree::{Arena, NodeId};

use crate::error::Error;
use crate::sequence::ChildSequence;
use crate::xmlvalue::{Value, ValueType};

pub(crate) type XmlArena = Arena<NodeData>;

/// A node in the XML tree.
/// This is a lightweight value and can be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node(NodeId);

impl Node {
    #[inline]
    pub(crate) fn new(node_id: NodeId) -> Self {
        Node(node_id)
    }

    #[inline]
    pub(crate) fn get(&self) -> NodeId {
        self.0
    }
}

// The owner is a back reference only; the child sequence of the owner is the
// authoritative record of who holds whom.
#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) value: Value,
    pub(crate) owner: Option<Node>,
    pub(crate) content: Option<ChildSequence>,
}

impl NodeData {
    pub(crate) fn new(value: Value) -> Self {
        let content = if value.value_type().is_container() {
            Some(ChildSequence::new())
        } else {
            None
        };
        NodeData {
            value,
            owner: None,
            content,
        }
    }
}

/// The `XmlData` struct holds the nodes of all trees in your program.
///
/// Documents, elements and the other nodes are created standalone and become
/// part of a tree once they are inserted into the child sequence of a
/// container. A node is owned by at most one container at a time.
pub struct XmlData {
    pub(crate) arena: XmlArena,
}

impl XmlData {
    /// Create a new, empty `XmlData`.
    pub fn new() -> Self {
        XmlData {
            arena: XmlArena::new(),
        }
    }

    #[inline]
    pub(crate) fn data(&self, node: Node) -> &NodeData {
        self.arena[node.get()].get()
    }

    #[inline]
    pub(crate) fn data_mut(&mut self, node: Node) -> &mut NodeData {
        self.arena[node.get()].get_mut()
    }

    /// Access the value of a node.
    #[inline]
    pub fn value(&self, node: Node) -> &Value {
        &self.data(node).value
    }

    /// Mutable access to the value of a node.
    ///
    /// Changing the kind of value of a node that sits in a tree may violate
    /// the placement rules; prefer replacing the node instead.
    #[inline]
    pub fn value_mut(&mut self, node: Node) -> &mut Value {
        &mut self.data_mut(node).value
    }

    /// The type of the node's value.
    #[inline]
    pub fn value_type(&self, node: Node) -> ValueType {
        self.value(node).value_type()
    }

    /// The child sequence of a container.
    pub fn sequence(&self, parent: Node) -> Result<&ChildSequence, Error> {
        self.data(parent)
            .content
            .as_ref()
            .ok_or(Error::NotContainer(parent))
    }

    pub(crate) fn sequence_mut(&mut self, parent: Node) -> Result<&mut ChildSequence, Error> {
        self.data_mut(parent)
            .content
            .as_mut()
            .ok_or(Error::NotContainer(parent))
    }

    // the modification counter of a container, or 0 for leaf nodes
    pub(crate) fn mod_count(&self, parent: Node) -> u64 {
        self.data(parent)
            .content
            .as_ref()
            .map_or(0, ChildSequence::mod_count)
    }
}

impl Default for XmlData {
    fn default() -> Self {
        Self::new()
    }
}
