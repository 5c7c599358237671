//! Live, filtered projections of a child sequence.
//!
//! A [`FilteredView`] does not borrow the tree. It remembers the container
//! and the filter, and every operation takes the [`XmlData`] explicitly.
//! This lets the tree be changed between calls; the view notices through
//! the modification counter of the sequence.

use std::cell::Cell;

use tracing::debug;

use crate::error::Error;
use crate::filter::Filter;
use crate::xmldata::{Node, XmlData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SizeCache {
    count: usize,
    mod_count: u64,
}

/// The children of a container that match a filter, in document order.
///
/// The number of matching children is cached together with the
/// modification counter it was computed against, and only recounted once
/// the sequence has changed since.
///
/// ```rust
/// use xmlweave::{ContentFilter, XmlData};
///
/// let mut data = XmlData::new();
/// let root = data.parse("<a>x<b/>y<c/></a>").unwrap();
/// let a = data.document_element(root).unwrap();
/// let elements = data.view(a, ContentFilter::elements());
///
/// assert_eq!(elements.len(&data), 2);
/// let d = data.new_element("d");
/// elements.insert(&mut data, 1, d)?;
/// assert_eq!(data.to_string(a)?, "<a>x<b/>y<d/><c/></a>");
/// # Ok::<(), xmlweave::Error>(())
/// ```
#[derive(Debug)]
pub struct FilteredView<F: Filter> {
    parent: Node,
    filter: F,
    cache: Cell<Option<SizeCache>>,
}

impl<F: Filter> FilteredView<F> {
    pub fn new(parent: Node, filter: F) -> Self {
        FilteredView {
            parent,
            filter,
            cache: Cell::new(None),
        }
    }

    /// The container this view projects.
    pub fn parent(&self) -> Node {
        self.parent
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Number of matching children.
    pub fn len(&self, data: &XmlData) -> usize {
        let mod_count = data.mod_count(self.parent);
        if let Some(cache) = self.cache.get() {
            if cache.mod_count == mod_count {
                return cache.count;
            }
        }
        let count = self.iter(data).count();
        self.cache.set(Some(SizeCache { count, mod_count }));
        count
    }

    pub fn is_empty(&self, data: &XmlData) -> bool {
        self.len(data) == 0
    }

    /// Iterate over the matching children.
    pub fn iter<'a>(&'a self, data: &'a XmlData) -> impl Iterator<Item = Node> + 'a {
        data.children(self.parent)
            .iter()
            .copied()
            .filter(move |child| self.filter.matches(data, *child))
    }

    /// The matching child at `index`.
    pub fn get(&self, data: &XmlData, index: usize) -> Option<Node> {
        self.iter(data).nth(index)
    }

    /// Position of `node` in this view.
    pub fn index_of(&self, data: &XmlData, node: Node) -> Option<usize> {
        self.iter(data).position(|child| child == node)
    }

    /// Translate an index in the view into an index in the backing
    /// sequence.
    ///
    /// An index one past the last match translates to the end of the backing
    /// sequence, so that inserting there appends. Anything beyond that is
    /// [`None`].
    pub fn translate(&self, data: &XmlData, index: usize) -> Option<usize> {
        let children = data.children(self.parent);
        let mut seen = 0;
        for (backing, child) in children.iter().enumerate() {
            if self.filter.matches(data, *child) {
                if seen == index {
                    return Some(backing);
                }
                seen += 1;
            }
        }
        if seen == index {
            Some(children.len())
        } else {
            None
        }
    }

    /// Insert `node` so that it ends up at `index` in this view.
    pub fn insert(&self, data: &mut XmlData, index: usize, node: Node) -> Result<(), Error> {
        if !self.filter.matches(data, node) {
            return Err(Error::FilterRejected(node));
        }
        let backing = self.translate(data, index).ok_or(Error::InvalidPosition {
            index,
            len: self.len(data),
        })?;
        let before = data.mod_count(self.parent);
        data.insert(self.parent, backing, node)?;
        self.adjust(before, data.mod_count(self.parent), |count| count + 1);
        Ok(())
    }

    /// Append `node` after the last match, at the end of the sequence.
    pub fn append(&self, data: &mut XmlData, node: Node) -> Result<(), Error> {
        let len = self.len(data);
        self.insert(data, len, node)
    }

    /// Remove the matching child at `index`, returning it.
    pub fn remove(&self, data: &mut XmlData, index: usize) -> Result<Node, Error> {
        let backing = self.backing_index(data, index)?;
        let before = data.mod_count(self.parent);
        let node = data.remove(self.parent, backing)?;
        self.adjust(before, data.mod_count(self.parent), |count| count - 1);
        Ok(node)
    }

    /// Replace the matching child at `index`, returning the old child.
    pub fn replace(&self, data: &mut XmlData, index: usize, node: Node) -> Result<Node, Error> {
        if !self.filter.matches(data, node) {
            return Err(Error::FilterRejected(node));
        }
        let backing = self.backing_index(data, index)?;
        let before = data.mod_count(self.parent);
        let old = data.replace(self.parent, backing, node)?;
        self.adjust(before, data.mod_count(self.parent), |count| count);
        Ok(old)
    }

    /// Remove all matching children, returning them.
    pub fn clear(&self, data: &mut XmlData) -> Result<Vec<Node>, Error> {
        let mut removed = Vec::new();
        while !self.is_empty(data) {
            removed.push(self.remove(data, 0)?);
        }
        Ok(removed)
    }

    /// A cursor positioned before the matching child at `index`.
    pub fn cursor(&self, data: &XmlData, index: usize) -> Result<ViewCursor<F>, Error>
    where
        F: Clone,
    {
        let backing = self.translate(data, index).ok_or(Error::InvalidPosition {
            index,
            len: self.len(data),
        })?;
        Ok(ViewCursor {
            parent: self.parent,
            filter: self.filter.clone(),
            expected_mod_count: data.mod_count(self.parent),
            gap: backing,
            position: index,
            last: None,
        })
    }

    fn backing_index(&self, data: &XmlData, index: usize) -> Result<usize, Error> {
        let len = self.len(data);
        if index >= len {
            return Err(Error::InvalidPosition { index, len });
        }
        self.translate(data, index)
            .ok_or(Error::InvalidPosition { index, len })
    }

    // keep the cached count in step with a change made through this view,
    // unless someone else changed the sequence since the count was taken
    fn adjust(&self, before: u64, after: u64, update: impl Fn(usize) -> usize) {
        let cache = match self.cache.get() {
            Some(cache) if cache.mod_count == before => Some(SizeCache {
                count: update(cache.count),
                mod_count: after,
            }),
            _ => None,
        };
        self.cache.set(cache);
    }
}

/// A bidirectional cursor over a [`FilteredView`].
///
/// The cursor sits in a gap between two matching children. It can remove
/// or replace the node it returned last and insert new nodes into the gap.
/// Any other structural change to the sequence makes the next cursor
/// operation fail with [`Error::ConcurrentStructuralChange`].
#[derive(Debug, Clone)]
pub struct ViewCursor<F: Filter> {
    parent: Node,
    filter: F,
    expected_mod_count: u64,
    // backing index of the gap; everything before it has been passed
    gap: usize,
    // index of the gap within the view
    position: usize,
    // backing index of the node returned last
    last: Option<usize>,
}

impl<F: Filter> ViewCursor<F> {
    /// A cursor before the first child of `parent` that matches `filter`.
    pub fn new(data: &XmlData, parent: Node, filter: F) -> Self {
        ViewCursor {
            parent,
            filter,
            expected_mod_count: data.mod_count(parent),
            gap: 0,
            position: 0,
            last: None,
        }
    }

    pub fn parent(&self) -> Node {
        self.parent
    }

    /// Index in the view of the node `next` would return.
    pub fn next_index(&self) -> usize {
        self.position
    }

    /// Index in the view of the node `previous` would return.
    pub fn previous_index(&self) -> Option<usize> {
        self.position.checked_sub(1)
    }

    /// Whether `next` has something to report. After a change made behind
    /// the cursor's back this is `true`, so that `next` reports the change
    /// instead of the traversal silently ending.
    pub fn has_next(&self, data: &XmlData) -> bool {
        self.is_stale(data) || self.find_forward(data).is_some()
    }

    pub fn has_previous(&self, data: &XmlData) -> bool {
        self.is_stale(data) || self.find_backward(data).is_some()
    }

    /// Fail with [`Error::ConcurrentStructuralChange`] if the sequence was
    /// changed other than through this cursor.
    pub fn check(&self, data: &XmlData) -> Result<(), Error> {
        if self.is_stale(data) {
            debug!(parent = ?self.parent, "concurrent structural change detected");
            return Err(Error::ConcurrentStructuralChange);
        }
        Ok(())
    }

    /// Advance over the next matching child and return it.
    pub fn next(&mut self, data: &XmlData) -> Result<Node, Error> {
        self.check(data)?;
        let backing = self.find_forward(data).ok_or(Error::IteratorExhausted)?;
        self.gap = backing + 1;
        self.position += 1;
        self.last = Some(backing);
        Ok(data.children(self.parent)[backing])
    }

    /// Step back over the previous matching child and return it.
    pub fn previous(&mut self, data: &XmlData) -> Result<Node, Error> {
        self.check(data)?;
        let backing = self.find_backward(data).ok_or(Error::IteratorExhausted)?;
        self.gap = backing;
        self.position -= 1;
        self.last = Some(backing);
        Ok(data.children(self.parent)[backing])
    }

    /// The node returned last by `next` or `previous`.
    pub fn current(&self, data: &XmlData) -> Option<Node> {
        self.last.and_then(|backing| data.child(self.parent, backing))
    }

    /// Remove the node returned last by `next` or `previous`.
    pub fn remove(&mut self, data: &mut XmlData) -> Result<Node, Error> {
        self.check(data)?;
        let backing = self.last.ok_or(Error::NoCurrentNode)?;
        let node = data.remove(self.parent, backing)?;
        if backing < self.gap {
            self.gap -= 1;
            self.position -= 1;
        }
        self.last = None;
        self.expected_mod_count = data.mod_count(self.parent);
        Ok(node)
    }

    /// Insert `node` into the gap; a following `next` is unaffected.
    pub fn insert(&mut self, data: &mut XmlData, node: Node) -> Result<(), Error> {
        self.check(data)?;
        if !self.filter.matches(data, node) {
            return Err(Error::FilterRejected(node));
        }
        data.insert(self.parent, self.gap, node)?;
        self.gap += 1;
        self.position += 1;
        self.last = None;
        self.expected_mod_count = data.mod_count(self.parent);
        Ok(())
    }

    /// Replace the node returned last by `next` or `previous`.
    pub fn set(&mut self, data: &mut XmlData, node: Node) -> Result<Node, Error> {
        self.check(data)?;
        let backing = self.last.ok_or(Error::NoCurrentNode)?;
        if !self.filter.matches(data, node) {
            return Err(Error::FilterRejected(node));
        }
        let old = data.replace(self.parent, backing, node)?;
        self.expected_mod_count = data.mod_count(self.parent);
        Ok(old)
    }

    fn is_stale(&self, data: &XmlData) -> bool {
        data.mod_count(self.parent) != self.expected_mod_count
    }

    fn find_forward(&self, data: &XmlData) -> Option<usize> {
        let children = data.children(self.parent);
        (self.gap.min(children.len())..children.len())
            .find(|backing| self.filter.matches(data, children[*backing]))
    }

    fn find_backward(&self, data: &XmlData) -> Option<usize> {
        let children = data.children(self.parent);
        (0..self.gap.min(children.len()))
            .rev()
            .find(|backing| self.filter.matches(data, children[*backing]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ContentFilter, ElementFilter};

    fn setup() -> (XmlData, Node, Vec<Node>) {
        let mut data = XmlData::new();
        let root = data.new_element("root");
        let mut children = Vec::new();
        for i in 0..3 {
            children.push(data.append_text(root, &format!("t{}", i)).unwrap());
            children.push(data.append_element(root, "e").unwrap());
        }
        (data, root, children)
    }

    #[test]
    fn test_len_is_cached_until_mod_count_changes() {
        let (mut data, root, _) = setup();
        let view = data.view(root, ContentFilter::elements());
        assert_eq!(view.len(&data), 3);
        assert_eq!(
            view.cache.get(),
            Some(SizeCache {
                count: 3,
                mod_count: data.mod_count(root)
            })
        );
        data.append_element(root, "e").unwrap();
        data.append_text(root, "t").unwrap();
        data.remove(root, 0).unwrap();
        assert_eq!(view.len(&data), 4);
    }

    #[test]
    fn test_insert_through_view_adjusts_cache() {
        let (mut data, root, children) = setup();
        let view = data.view(root, ContentFilter::elements());
        assert_eq!(view.len(&data), 3);
        let new = data.new_element("new");
        view.insert(&mut data, 1, new).unwrap();
        assert_eq!(
            view.cache.get(),
            Some(SizeCache {
                count: 4,
                mod_count: data.mod_count(root)
            })
        );
        // inserted right before the second element
        assert_eq!(data.index_of(root, new), Some(3));
        assert_eq!(data.child(root, 4), Some(children[3]));
    }

    #[test]
    fn test_insert_after_outside_change_invalidates() {
        let (mut data, root, _) = setup();
        let view = data.view(root, ContentFilter::elements());
        assert_eq!(view.len(&data), 3);
        data.append_element(root, "outside").unwrap();
        let new = data.new_element("new");
        view.append(&mut data, new).unwrap();
        assert_eq!(view.len(&data), 5);
    }

    #[test]
    fn test_translate() {
        let (data, root, _) = setup();
        let view = data.view(root, ContentFilter::elements());
        assert_eq!(view.translate(&data, 0), Some(1));
        assert_eq!(view.translate(&data, 2), Some(5));
        assert_eq!(view.translate(&data, 3), Some(6));
        assert_eq!(view.translate(&data, 4), None);
    }

    #[test]
    fn test_filter_rejected() {
        let (mut data, root, _) = setup();
        let view = data.view(root, ElementFilter::named("e"));
        let other = data.new_element("other");
        assert!(matches!(
            view.insert(&mut data, 0, other),
            Err(Error::FilterRejected(n)) if n == other
        ));
        assert!(matches!(
            view.replace(&mut data, 0, other),
            Err(Error::FilterRejected(_))
        ));
        assert_eq!(data.owner(other), None);
    }

    #[test]
    fn test_remove_out_of_range() {
        let (mut data, root, _) = setup();
        let view = data.view(root, ContentFilter::elements());
        assert!(matches!(
            view.remove(&mut data, 3),
            Err(Error::InvalidPosition { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_clear_view() {
        let (mut data, root, children) = setup();
        let view = data.view(root, ContentFilter::text_like());
        let removed = view.clear(&mut data).unwrap();
        assert_eq!(removed, vec![children[0], children[2], children[4]]);
        assert_eq!(data.children(root), &[children[1], children[3], children[5]]);
    }

    #[test]
    fn test_cursor_forward_and_back() {
        let (data, root, children) = setup();
        let view = data.view(root, ContentFilter::elements());
        let mut cursor = view.cursor(&data, 0).unwrap();
        assert!(!cursor.has_previous(&data));
        assert_eq!(cursor.next(&data).unwrap(), children[1]);
        assert_eq!(cursor.next(&data).unwrap(), children[3]);
        assert_eq!(cursor.next(&data).unwrap(), children[5]);
        assert!(!cursor.has_next(&data));
        assert!(matches!(cursor.next(&data), Err(Error::IteratorExhausted)));
        assert_eq!(cursor.previous(&data).unwrap(), children[5]);
        assert_eq!(cursor.previous_index(), Some(1));
    }

    #[test]
    fn test_cursor_remove_and_insert() {
        let (mut data, root, children) = setup();
        let mut cursor = ViewCursor::new(&data, root, ContentFilter::elements());
        cursor.next(&data).unwrap();
        assert_eq!(cursor.remove(&mut data).unwrap(), children[1]);
        assert!(matches!(cursor.remove(&mut data), Err(Error::NoCurrentNode)));
        let new = data.new_element("new");
        cursor.insert(&mut data, new).unwrap();
        assert_eq!(cursor.next(&data).unwrap(), children[3]);
        assert_eq!(
            data.children(root),
            &[children[0], new, children[2], children[3], children[4], children[5]]
        );
    }

    #[test]
    fn test_cursor_set() {
        let (mut data, root, children) = setup();
        let mut cursor = ViewCursor::new(&data, root, ContentFilter::elements());
        cursor.next(&data).unwrap();
        let new = data.new_element("new");
        assert_eq!(cursor.set(&mut data, new).unwrap(), children[1]);
        assert_eq!(cursor.current(&data), Some(new));
        assert_eq!(cursor.next(&data).unwrap(), children[3]);
    }

    #[test]
    fn test_cursor_concurrent_modification() {
        let (mut data, root, _) = setup();
        let mut cursor = ViewCursor::new(&data, root, ContentFilter::elements());
        cursor.next(&data).unwrap();
        data.append_text(root, "behind the cursor's back").unwrap();
        assert!(matches!(
            cursor.next(&data),
            Err(Error::ConcurrentStructuralChange)
        ));
        assert!(matches!(
            cursor.remove(&mut data),
            Err(Error::ConcurrentStructuralChange)
        ));
    }

    #[test]
    fn test_cursor_stale_at_end_still_reports() {
        let (mut data, root, children) = setup();
        let mut cursor = ViewCursor::new(&data, root, ContentFilter::elements());
        cursor.next(&data).unwrap();
        cursor.next(&data).unwrap();
        // the gap now lies past the last element
        data.remove(root, 0).unwrap();
        data.remove(root, 0).unwrap();
        assert!(cursor.has_next(&data));
        assert!(cursor.has_previous(&data));
        assert!(matches!(
            cursor.next(&data),
            Err(Error::ConcurrentStructuralChange)
        ));
        assert!(matches!(
            cursor.check(&data),
            Err(Error::ConcurrentStructuralChange)
        ));
        assert_eq!(data.children(root)[3], children[5]);
    }
}
