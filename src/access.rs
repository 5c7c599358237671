use crate::descendants::{DescendantCursor, Descendants};
use crate::filter::Filter;
use crate::view::FilteredView;
use crate::xmldata::{Node, XmlData};
use crate::xmlvalue::{DocType, Element, Text, Value, ValueType};

/// ## Read-only access
impl XmlData {
    /// The container that owns this node.
    ///
    /// Returns [`None`] for a document or a node that is not attached to
    /// anything.
    ///
    /// ```rust
    /// let mut data = xmlweave::XmlData::new();
    /// let root = data.parse("<p>Example</p>").unwrap();
    /// let p = data.document_element(root).unwrap();
    /// let text = data.first_child(p).unwrap();
    /// assert_eq!(data.owner(text), Some(p));
    /// assert_eq!(data.owner(p), Some(root));
    /// assert_eq!(data.owner(root), None);
    /// ```
    pub fn owner(&self, node: Node) -> Option<Node> {
        self.data(node).owner
    }

    /// The children of a node. Leaf nodes have no children.
    pub fn children(&self, node: Node) -> &[Node] {
        self.sequence(node).map_or(&[], |sequence| sequence.as_slice())
    }

    /// Child at `index`.
    pub fn child(&self, node: Node, index: usize) -> Option<Node> {
        self.children(node).get(index).copied()
    }

    pub fn child_count(&self, node: Node) -> usize {
        self.children(node).len()
    }

    /// Get index of child.
    ///
    /// Returns [`None`] if the node is not a child of this node.
    pub fn index_of(&self, parent: Node, child: Node) -> Option<usize> {
        if self.owner(child) != Some(parent) {
            return None;
        }
        self.sequence(parent).ok()?.index_of(child)
    }

    pub fn first_child(&self, node: Node) -> Option<Node> {
        self.children(node).first().copied()
    }

    pub fn last_child(&self, node: Node) -> Option<Node> {
        self.children(node).last().copied()
    }

    /// Position of the first element child.
    ///
    /// In a document this is the root element.
    pub fn index_of_first_element(&self, parent: Node) -> Option<usize> {
        self.children(parent)
            .iter()
            .position(|child| self.value_type(*child) == ValueType::Element)
    }

    /// Position of the doctype child.
    pub fn index_of_doctype(&self, parent: Node) -> Option<usize> {
        self.children(parent)
            .iter()
            .position(|child| self.value_type(*child) == ValueType::DocType)
    }

    /// The root element of a document.
    ///
    /// Returns [`None`] if this is not a document or it has no root element
    /// yet.
    pub fn document_element(&self, node: Node) -> Option<Node> {
        if self.value_type(node) != ValueType::Document {
            return None;
        }
        self.index_of_first_element(node)
            .and_then(|index| self.child(node, index))
    }

    /// The doctype node of a document.
    pub fn doctype(&self, node: Node) -> Option<Node> {
        if self.value_type(node) != ValueType::Document {
            return None;
        }
        self.index_of_doctype(node)
            .and_then(|index| self.child(node, index))
    }

    /// Iterator over ancestor nodes, including this one.
    ///
    /// ```rust
    /// let mut data = xmlweave::XmlData::new();
    ///
    /// let root = data.parse("<a><b><c/></b></a>").unwrap();
    /// let a = data.document_element(root).unwrap();
    /// let b = data.first_child(a).unwrap();
    /// let c = data.first_child(b).unwrap();
    ///
    /// let ancestors = data.ancestors(c).collect::<Vec<_>>();
    /// assert_eq!(ancestors, vec![c, b, a, root]);
    /// ```
    pub fn ancestors(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        std::iter::successors(Some(node), move |current| self.owner(*current))
    }

    /// Whether `ancestor` is a proper ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: Node, node: Node) -> bool {
        self.ancestors(node).skip(1).any(|n| n == ancestor)
    }

    /// The top of the tree this node is in.
    pub fn top(&self, node: Node) -> Node {
        self.ancestors(node).last().unwrap_or(node)
    }

    /// Iterator over the descendants of this node, excluding this one,
    /// in document order (pre-order depth-first).
    ///
    /// ```rust
    /// let mut data = xmlweave::XmlData::new();
    /// let root = data.parse("<a><b><c/></b><d/></a>").unwrap();
    /// let a = data.document_element(root).unwrap();
    /// let b = data.first_child(a).unwrap();
    /// let c = data.first_child(b).unwrap();
    /// let d = data.last_child(a).unwrap();
    ///
    /// let descendants = data.descendants(a).collect::<Vec<_>>();
    /// assert_eq!(descendants, vec![b, c, d]);
    /// ```
    pub fn descendants(&self, node: Node) -> Descendants<'_> {
        Descendants::new(self, DescendantCursor::new(node))
    }

    /// Descendants that match `filter`.
    pub fn filtered_descendants<'a, F: Filter + 'a>(
        &'a self,
        node: Node,
        filter: F,
    ) -> impl Iterator<Item = Node> + 'a {
        self.descendants(node)
            .filter(move |descendant| filter.matches(self, *descendant))
    }

    /// A live view of the children of `parent` that match `filter`.
    pub fn view<F: Filter>(&self, parent: Node, filter: F) -> FilteredView<F> {
        FilteredView::new(parent, filter)
    }

    /// The concatenated text of all text and CDATA nodes under this node.
    pub fn text_content(&self, node: Node) -> String {
        let mut result = String::new();
        if let Some(text) = self.text_value(node) {
            result.push_str(text);
        }
        for descendant in self.descendants(node) {
            if let Some(text) = self.text_value(descendant) {
                result.push_str(text);
            }
        }
        result
    }

    fn text_value(&self, node: Node) -> Option<&str> {
        match self.value(node) {
            Value::Text(text) | Value::Cdata(text) => Some(text.get()),
            _ => None,
        }
    }

    /// Element value, if this node is an element.
    pub fn element(&self, node: Node) -> Option<&Element> {
        match self.value(node) {
            Value::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Mutable element value, if this node is an element.
    pub fn element_mut(&mut self, node: Node) -> Option<&mut Element> {
        match self.value_mut(node) {
            Value::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Text value, if this node is a text node.
    pub fn text(&self, node: Node) -> Option<&Text> {
        match self.value(node) {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Mutable text value, if this node is a text node.
    pub fn text_mut(&mut self, node: Node) -> Option<&mut Text> {
        match self.value_mut(node) {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Doctype value, if this node is a doctype.
    pub fn doctype_value(&self, node: Node) -> Option<&DocType> {
        match self.value(node) {
            Value::DocType(doctype) => Some(doctype),
            _ => None,
        }
    }

    /// Mutable doctype value, if this node is a doctype.
    pub fn doctype_value_mut(&mut self, node: Node) -> Option<&mut DocType> {
        match self.value_mut(node) {
            Value::DocType(doctype) => Some(doctype),
            _ => None,
        }
    }
}
