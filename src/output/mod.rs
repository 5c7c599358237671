//! Serialization of trees to XML.
//!
//! A [`Format`] configures the output. While serializing, a [`FormatStack`]
//! tracks the formatting state per depth, and a [`Walker`] per open
//! container merges and trims text runs and places indentation.
mod format;
mod format_stack;
mod serializer;
mod walker;
mod xml_serializer;

pub use format::{Format, TextMode};
pub use format_stack::FormatStack;
pub(crate) use serializer::gen_outputs;
pub use serializer::Output;
pub use walker::{Chunk, Trim, WalkItem, Walker};
pub(crate) use xml_serializer::XmlSerializer;
