#![forbid(unsafe_code)]

//! An in-memory XML tree with strict ownership rules and a formatting
//! serializer.
//!
//! All nodes live in an [`XmlData`] arena and are addressed by [`Node`]
//! handles. Documents and elements own their children through a
//! [`ChildSequence`]; every node has at most one owner, and structural
//! checks (ownership, cycles, document placement) happen before anything is
//! changed.
//!
//! ```rust
//! use xmlweave::{XmlData, ContentFilter};
//!
//! let mut data = XmlData::new();
//! let doc = data.parse("<a><b/>text<!--c--><b/></a>")?;
//! let a = data.document_element(doc).unwrap();
//!
//! let elements = data.view(a, ContentFilter::elements());
//! assert_eq!(elements.len(&data), 2);
//!
//! let c = data.append_element(a, "c")?;
//! assert_eq!(elements.len(&data), 3);
//! assert_eq!(data.owner(c), Some(a));
//!
//! assert_eq!(data.to_string(doc)?, "<a><b/>text<!--c--><b/><c/></a>");
//! # Ok::<(), xmlweave::Error>(())
//! ```
//!
//! Beyond index based access there are [`FilteredView`]s, which show the
//! children of a container that pass a [`Filter`], and the
//! [`DescendantCursor`], which walks a subtree in document order and allows
//! removal along the way.
//!
//! Serialization is controlled by a [`Format`]; see the [`output`] module.

mod access;
mod creation;
mod descendants;
mod entity;
mod error;
mod filter;
mod manipulation;
pub mod output;
mod parse;
#[cfg(feature = "proptest")]
pub mod proptest;
mod sequence;
mod serialize;
mod view;
mod xmldata;
mod xmlvalue;

pub use descendants::{DescendantCursor, Descendants};
pub use error::Error;
pub use filter::{ContentFilter, ElementFilter, Filter};
pub use output::{Chunk, Format, FormatStack, Output, TextMode, Trim, WalkItem, Walker};
pub use sequence::ChildSequence;
pub use view::{FilteredView, ViewCursor};
pub use xmldata::{Node, XmlData};
pub use xmlvalue::{
    Comment, DocType, Element, EntityRef, ProcessingInstruction, Text, Value, ValueType,
};
