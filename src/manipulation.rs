use tracing::{debug, trace};

use crate::error::Error;
use crate::xmldata::{Node, XmlData};
use crate::xmlvalue::ValueType;

/// ## Manipulation
///
/// Changes to the tree go through the child sequence of a container. Every
/// change maintains the XML structure:
///
/// - A node is owned by at most one container. A node that already has an
///   owner must be detached before it can be inserted elsewhere.
/// - A container cannot be inserted into itself or into one of its
///   descendants.
/// - A document holds at most one root element and at most one doctype,
///   the doctype comes before the root element, and no text-like nodes
///   live directly under a document.
/// - A doctype can only be a child of a document.
///
/// All checks happen before the tree is touched. When an operation fails,
/// the tree is left exactly as it was.
impl XmlData {
    /// Insert `child` at `index` in the children of `parent`.
    ///
    /// ```rust
    /// use xmlweave::{Error, XmlData};
    ///
    /// let mut data = XmlData::new();
    /// let a = data.new_element("a");
    /// let b = data.new_element("b");
    /// let c = data.new_element("c");
    /// data.insert(c, 0, b)?;
    ///
    /// // b already belongs to c
    /// assert!(matches!(data.insert(a, 0, b), Err(Error::AlreadyOwned(_))));
    ///
    /// data.detach(b);
    /// data.insert(a, 0, b)?;
    /// assert_eq!(data.owner(b), Some(a));
    /// # Ok::<(), xmlweave::Error>(())
    /// ```
    pub fn insert(&mut self, parent: Node, index: usize, child: Node) -> Result<(), Error> {
        self.check_insert(parent, index, child)?;
        self.data_mut(child).owner = Some(parent);
        self.sequence_mut(parent)?.insert_raw(index, child);
        trace!(?parent, ?child, index, "inserted node");
        Ok(())
    }

    /// Insert all `children` at `index`, in order.
    ///
    /// This is transactional: if any of the nodes cannot be inserted, the
    /// nodes inserted so far by this call are detached again, the sequence
    /// is restored to what it was before the call, and the error is returned.
    pub fn insert_all(&mut self, parent: Node, index: usize, children: &[Node]) -> Result<(), Error> {
        match children {
            [] => {
                let len = self.sequence(parent)?.len();
                if index > len {
                    return Err(Error::InvalidPosition { index, len });
                }
                Ok(())
            }
            [child] => self.insert(parent, index, *child),
            _ => {
                let sequence = self.sequence_mut(parent)?;
                let len = sequence.len();
                if index > len {
                    return Err(Error::InvalidPosition { index, len });
                }
                let snapshot = sequence.snapshot();
                sequence.ensure_capacity(len + children.len());
                for (i, child) in children.iter().enumerate() {
                    if let Err(err) = self.insert(parent, index + i, *child) {
                        debug!(?parent, inserted = i, %err, "rolling back bulk insert");
                        for inserted in &children[..i] {
                            self.data_mut(*inserted).owner = None;
                        }
                        self.sequence_mut(parent)?.restore(snapshot);
                        return Err(err);
                    }
                }
                Ok(())
            }
        }
    }

    /// Remove the child at `index` from `parent`, returning it.
    ///
    /// The removed node (and its descendants) becomes a standalone
    /// fragment.
    pub fn remove(&mut self, parent: Node, index: usize) -> Result<Node, Error> {
        let sequence = self.sequence_mut(parent)?;
        let len = sequence.len();
        if index >= len {
            return Err(Error::InvalidPosition { index, len });
        }
        let child = sequence.remove_raw(index);
        self.data_mut(child).owner = None;
        trace!(?parent, ?child, index, "removed node");
        Ok(child)
    }

    /// Replace the child at `index` with `child`, returning the old child.
    ///
    /// If `child` cannot be inserted, the original child stays in place.
    pub fn replace(&mut self, parent: Node, index: usize, child: Node) -> Result<Node, Error> {
        let snapshot = self.sequence(parent)?.snapshot();
        let old = self.remove(parent, index)?;
        if let Err(err) = self.insert(parent, index, child) {
            debug!(?parent, index, %err, "replace failed, restoring original");
            self.sequence_mut(parent)?.restore(snapshot);
            self.data_mut(old).owner = Some(parent);
            return Err(err);
        }
        Ok(old)
    }

    /// Remove all children of `parent`, returning them.
    pub fn clear(&mut self, parent: Node) -> Result<Vec<Node>, Error> {
        let removed = self.sequence_mut(parent)?.clear_raw();
        for child in &removed {
            self.data_mut(*child).owner = None;
        }
        trace!(?parent, count = removed.len(), "cleared children");
        Ok(removed)
    }

    /// Replace all children of `parent` with `children`.
    ///
    /// Returns the previous children. On failure the previous children are
    /// restored.
    pub fn set_content(&mut self, parent: Node, children: &[Node]) -> Result<Vec<Node>, Error> {
        let snapshot = self.sequence(parent)?.snapshot();
        let old = self.clear(parent)?;
        if let Err(err) = self.insert_all(parent, 0, children) {
            self.sequence_mut(parent)?.restore(snapshot);
            for child in &old {
                self.data_mut(*child).owner = Some(parent);
            }
            return Err(err);
        }
        Ok(old)
    }

    /// Append a child to the end of the children of the given parent.
    pub fn append(&mut self, parent: Node, child: Node) -> Result<(), Error> {
        let len = self.sequence(parent)?.len();
        self.insert(parent, len, child)
    }

    /// Append all `children` to the end; transactional like
    /// [`XmlData::insert_all`].
    pub fn append_all(&mut self, parent: Node, children: &[Node]) -> Result<(), Error> {
        let len = self.sequence(parent)?.len();
        self.insert_all(parent, len, children)
    }

    /// Prepend a child to the beginning of the children of the given parent.
    pub fn prepend(&mut self, parent: Node, child: Node) -> Result<(), Error> {
        self.insert(parent, 0, child)
    }

    /// Append a new text node to a parent node given text.
    pub fn append_text(&mut self, parent: Node, text: &str) -> Result<Node, Error> {
        let text_node = self.new_text(text);
        self.append(parent, text_node)?;
        Ok(text_node)
    }

    /// Append a new element node to a parent node given a name.
    pub fn append_element(&mut self, parent: Node, name: &str) -> Result<Node, Error> {
        let element_node = self.new_element(name);
        self.append(parent, element_node)?;
        Ok(element_node)
    }

    /// Detach a node (and its descendants) from its owner.
    ///
    /// Returns the former owner; nothing happens for a standalone node.
    pub fn detach(&mut self, node: Node) -> Option<Node> {
        let owner = self.owner(node)?;
        let index = self.sequence(owner).ok()?.index_of(node)?;
        self.remove(owner, index).ok()?;
        Some(owner)
    }

    /// Remove `child` from `parent` if it is one of its children.
    pub fn remove_child(&mut self, parent: Node, child: Node) -> Result<bool, Error> {
        match self.sequence(parent)?.index_of(child) {
            Some(index) => {
                self.remove(parent, index)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub(crate) fn check_insert(&self, parent: Node, index: usize, child: Node) -> Result<(), Error> {
        let len = self.sequence(parent)?.len();
        if index > len {
            return Err(Error::InvalidPosition { index, len });
        }
        if self.owner(child).is_some() {
            return Err(Error::AlreadyOwned(child));
        }
        if child == parent {
            return Err(Error::SelfContainment(child));
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(Error::CyclicAdd(child));
        }
        self.check_placement(parent, index, child)
    }

    fn check_placement(&self, parent: Node, index: usize, child: Node) -> Result<(), Error> {
        let child_type = self.value_type(child);
        if child_type == ValueType::Document {
            return Err(Error::MisplacedContent(
                "a document cannot be a child".into(),
            ));
        }
        match self.value_type(parent) {
            ValueType::Document => match child_type {
                ValueType::Element => {
                    if self.index_of_first_element(parent).is_some() {
                        return Err(Error::DuplicateRoot);
                    }
                    if matches!(self.index_of_doctype(parent), Some(doctype) if doctype >= index) {
                        return Err(Error::MisplacedContent(
                            "the root element cannot be added before the doctype".into(),
                        ));
                    }
                }
                ValueType::DocType => {
                    if self.index_of_doctype(parent).is_some() {
                        return Err(Error::DuplicateDocType);
                    }
                    if matches!(self.index_of_first_element(parent), Some(root) if root < index) {
                        return Err(Error::MisplacedContent(
                            "a doctype cannot be added after the root element".into(),
                        ));
                    }
                }
                ValueType::Text | ValueType::Cdata | ValueType::EntityRef => {
                    return Err(Error::MisplacedContent(
                        "text-like content is not allowed at the document level".into(),
                    ));
                }
                ValueType::Comment | ValueType::ProcessingInstruction | ValueType::Document => {}
            },
            ValueType::Element => {
                if child_type == ValueType::DocType {
                    return Err(Error::MisplacedContent(
                        "a doctype is only allowed at the document level".into(),
                    ));
                }
            }
            _ => return Err(Error::NotContainer(parent)),
        }
        Ok(())
    }
}
