use crate::error::Error;
use crate::filter::ContentFilter;
use crate::view::ViewCursor;
use crate::xmldata::{Node, XmlData};

/// Pre-order cursor over all descendants of a node.
///
/// There is no recursion: the cursor keeps one [`ViewCursor`] per open
/// level of the tree, so the depth of the tree is only bounded by memory.
/// Like [`ViewCursor`] it does not borrow the tree, which allows removing
/// the current node during traversal.
///
/// ```rust
/// use xmlweave::{DescendantCursor, XmlData};
///
/// let mut data = XmlData::new();
/// let root = data.parse("<a><b>x</b><!--c--><b>y</b></a>").unwrap();
///
/// let mut cursor = DescendantCursor::new(root);
/// while cursor.has_next(&data) {
///     let node = cursor.next(&data)?;
///     if data.value_type(node) == xmlweave::ValueType::Comment {
///         cursor.remove(&mut data)?;
///     }
/// }
/// assert_eq!(data.to_string(root)?, "<a><b>x</b><b>y</b></a>");
/// # Ok::<(), xmlweave::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DescendantCursor {
    root: Node,
    stack: Vec<ViewCursor<ContentFilter>>,
    // the node returned last; its children are visited before its siblings
    descend: Option<Node>,
}

impl DescendantCursor {
    /// A cursor over the descendants of `root`, not including `root`
    /// itself.
    pub fn new(root: Node) -> Self {
        DescendantCursor {
            root,
            stack: Vec::new(),
            descend: Some(root),
        }
    }

    pub fn root(&self) -> Node {
        self.root
    }

    /// Number of open levels.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether `next` has something to report: a node, or a structural
    /// change made outside the cursor.
    pub fn has_next(&self, data: &XmlData) -> bool {
        if let Some(node) = self.descend {
            if data.child_count(node) > 0 {
                return true;
            }
        }
        self.stack.iter().rev().any(|level| level.has_next(data))
    }

    /// Advance to the next node in document order.
    pub fn next(&mut self, data: &XmlData) -> Result<Node, Error> {
        if let Some(node) = self.descend.take() {
            if data.child_count(node) > 0 {
                self.stack
                    .push(ViewCursor::new(data, node, ContentFilter::all()));
            }
        }
        while let Some(level) = self.stack.last_mut() {
            // a level changed behind our back must not be taken as exhausted
            level.check(data)?;
            if level.has_next(data) {
                let node = level.next(data)?;
                self.descend = Some(node);
                return Ok(node);
            }
            self.stack.pop();
        }
        Err(Error::IteratorExhausted)
    }

    /// Detach the node returned last by `next` from its owner.
    ///
    /// The detached node's own descendants are no longer part of the tree
    /// and are not visited. Its following siblings and the rest of the
    /// traversal are unaffected.
    pub fn remove(&mut self, data: &mut XmlData) -> Result<Node, Error> {
        if self.descend.is_none() {
            return Err(Error::NoCurrentNode);
        }
        let level = self.stack.last_mut().ok_or(Error::NoCurrentNode)?;
        let node = level.remove(data)?;
        self.descend = None;
        Ok(node)
    }
}

/// Iterator over descendants, borrowing the tree.
///
/// Obtain it with [`XmlData::descendants`].
pub struct Descendants<'a> {
    data: &'a XmlData,
    cursor: DescendantCursor,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(data: &'a XmlData, cursor: DescendantCursor) -> Self {
        Descendants { data, cursor }
    }
}

impl Iterator for Descendants<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        // the tree is borrowed, so the only error left is exhaustion
        self.cursor.next(self.data).ok()
    }
}
