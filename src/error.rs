use thiserror::Error as ThisError;

use crate::xmldata::Node;

/// Errors raised by structural operations, traversal and serialization.
///
/// Structural checks happen before anything is mutated, so an operation that
/// returns an error leaves the tree exactly as it was.
#[derive(Debug, ThisError)]
pub enum Error {
    /// An index lies outside the valid bounds of a child sequence.
    #[error("index {index} out of bounds for sequence of length {len}")]
    InvalidPosition { index: usize, len: usize },
    /// The node already has an owner; detach it first.
    #[error("node {0:?} already has an owner")]
    AlreadyOwned(Node),
    /// A container cannot be inserted into its own child sequence.
    #[error("node {0:?} cannot be added to itself")]
    SelfContainment(Node),
    /// The node is an ancestor of the container it is inserted into.
    #[error("node {0:?} is an ancestor of the target container")]
    CyclicAdd(Node),
    /// A document can only hold a single root element.
    #[error("document already has a root element")]
    DuplicateRoot,
    /// A document can only hold a single doctype.
    #[error("document already has a doctype")]
    DuplicateDocType,
    /// The child sequence changed behind the back of a cursor.
    #[error("child sequence was structurally modified during traversal")]
    ConcurrentStructuralChange,
    /// A cursor was advanced past its last element.
    #[error("no more elements to traverse")]
    IteratorExhausted,
    /// A cursor operation needs a current node, but `next` or `previous` was
    /// not called since the last removal or insertion.
    #[error("cursor has no current node")]
    NoCurrentNode,
    /// A node did not satisfy the filter of the view it was inserted through.
    #[error("node {0:?} does not match the filter of this view")]
    FilterRejected(Node),
    /// The node cannot appear at this place in the tree.
    #[error("misplaced content: {0}")]
    MisplacedContent(String),
    /// The node cannot hold children.
    #[error("node {0:?} is not a document or element")]
    NotContainer(Node),
    /// An entity reference in text was not terminated by `;`.
    #[error("unclosed entity: {0}")]
    UnclosedEntity(String),
    /// An entity reference that cannot be represented.
    #[error("invalid entity: {0}")]
    InvalidEntity(String),
    /// The same attribute appears twice on one element.
    #[error("duplicate attribute: {0}")]
    DuplicateAttribute(String),
    /// A closing tag did not match the open element, or input ended early.
    #[error("unclosed or mismatched tag: {0}")]
    UnclosedTag(String),
    /// The tokenizer rejected the input.
    #[error("parse error: {0}")]
    Parse(#[from] xmlparser::Error),
    /// Writing serialized output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
