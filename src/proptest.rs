//! Proptest support
//!
//! Proptests allow you to test for *properties* of your code that must hold
//! for arbitrary data. This module lets you generate arbitrary element
//! trees.
//!
//! This can be enabled by adding the `proptest` feature to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! xmlweave = { version = "0.1", features = ["proptest"] }
//! ```
//!
//! See the [`proptest`](https://docs.rs/proptest/latest/proptest/)
//! documentation for more information.

use ahash::HashSet;
use proptest::prelude::*;

use crate::error::Error;
use crate::xmldata::{Node, XmlData};

const ELEMENT_NAMES: &[&str] = &["a", "b", "c", "d", "e"];
const ATTRIBUTE_NAMES: &[&str] = &["q", "r", "s", "xml:space"];
const PI_NAMES: &[&str] = &["pi1", "pi2", "pi3"];
const ENTITY_NAMES: &[&str] = &["nbsp", "copy", "e1"];
const TEXT: &str = "[a-z \t\n<>&\"']{0,12}";
const ATTRIBUTE_VALUE: &str = "[a-z \n<>&\"]{0,8}";

/// A tree that is not stored in an [`XmlData`] yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixedContent {
    Text(String),
    Cdata(String),
    Comment(String),
    ProcessingInstruction(String, Option<String>),
    EntityRef(String),
    Element(FixedElement),
}

/// An element that is not stored in an [`XmlData`] yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<FixedContent>,
}

impl FixedElement {
    /// Create the element with all its content in `data`, using the regular
    /// structural operations.
    pub fn build(&self, data: &mut XmlData) -> Result<Node, Error> {
        let node = data.new_element(&self.name);
        if let Some(element) = data.element_mut(node) {
            for (name, value) in &self.attributes {
                element.set_attribute(name.as_str(), value.as_str());
            }
        }
        let mut children = Vec::with_capacity(self.children.len());
        for child in &self.children {
            children.push(child.build(data)?);
        }
        data.append_all(node, &children)?;
        Ok(node)
    }
}

impl FixedContent {
    pub fn build(&self, data: &mut XmlData) -> Result<Node, Error> {
        Ok(match self {
            FixedContent::Text(text) => data.new_text(text),
            FixedContent::Cdata(text) => data.new_cdata(text),
            FixedContent::Comment(comment) => data.new_comment(comment),
            FixedContent::ProcessingInstruction(target, content) => {
                data.new_processing_instruction(target, content.as_deref())
            }
            FixedContent::EntityRef(name) => data.new_entity_ref(name),
            FixedContent::Element(element) => element.build(data)?,
        })
    }
}

fn arb_attribute() -> impl Strategy<Value = (String, String)> {
    (prop::sample::select(ATTRIBUTE_NAMES), ATTRIBUTE_VALUE)
        .prop_map(|(name, value)| (name.to_string(), value))
}

fn arb_comment() -> impl Strategy<Value = String> {
    "[a-z <>&]{0,10}".prop_filter("comment", |s| !s.contains('-'))
}

fn arb_processing_instruction() -> impl Strategy<Value = (String, Option<String>)> {
    (
        prop::sample::select(PI_NAMES),
        prop::option::of("[a-z][a-z =\"]{0,8}[a-z]"),
    )
        .prop_map(|(target, data)| (target.to_string(), data))
}

fn arb_fixed_content() -> impl Strategy<Value = FixedContent> {
    let leaf = prop_oneof![
        4 => TEXT.prop_map(FixedContent::Text),
        1 => "[a-z <>&\\]]{0,8}".prop_map(FixedContent::Cdata),
        1 => arb_comment().prop_map(FixedContent::Comment),
        1 => arb_processing_instruction()
            .prop_map(|(target, data)| FixedContent::ProcessingInstruction(target, data)),
        1 => prop::sample::select(ENTITY_NAMES).prop_map(|name| FixedContent::EntityRef(name.to_string())),
    ];

    leaf.prop_recursive(
        8,   // levels deep
        256, // maximum size of 256 nodes
        10,  // up to 10 items per collection
        |inner| {
            (
                prop::sample::select(ELEMENT_NAMES),
                prop::collection::vec(inner, 0..10),
                prop::collection::vec(arb_attribute(), 0..4),
            )
                .prop_map(|(name, children, attributes)| {
                    FixedContent::Element(FixedElement {
                        name: name.to_string(),
                        attributes: unduplicate_attributes(attributes.as_slice()),
                        children,
                    })
                })
        },
    )
}

prop_compose! {
    /// Generate an arbitrary element tree.
    ///
    /// Build it into an [`XmlData`] with [`FixedElement::build`].
    pub fn arb_fixed_element()(name in prop::sample::select(ELEMENT_NAMES),
                               children in prop::collection::vec(arb_fixed_content(), 0..6),
                               attributes in prop::collection::vec(arb_attribute(), 0..4)) -> FixedElement {
        FixedElement {
            name: name.to_string(),
            attributes: unduplicate_attributes(attributes.as_slice()),
            children,
        }
    }
}

fn unduplicate_attributes(attributes: &[(String, String)]) -> Vec<(String, String)> {
    let mut seen = HashSet::default();
    attributes
        .iter()
        .filter(|(name, _)| seen.insert(name.clone()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Format;

    proptest! {
        #[test]
        fn test_arb_element_serialize_parse(fixed in arb_fixed_element()) {
            let mut data = XmlData::new();
            let node = fixed.build(&mut data).unwrap();
            let serialized = data.to_string(node).unwrap();
            let parsed = data.parse(&serialized);
            prop_assert!(parsed.is_ok(), "Cannot parse: {} {:?}", serialized, parsed.err());
            let reserialized = data.to_string(parsed.unwrap()).unwrap();
            prop_assert_eq!(serialized, reserialized);
        }

        #[test]
        fn test_arb_element_pretty_parses(fixed in arb_fixed_element()) {
            let mut data = XmlData::new();
            let node = fixed.build(&mut data).unwrap();
            let serialized = data.serialize_string(&Format::pretty(), node).unwrap();
            let parsed = data.parse(&serialized);
            prop_assert!(parsed.is_ok(), "Cannot parse: {} {:?}", serialized, parsed.err());
        }
    }
}
