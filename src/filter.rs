//! Predicates over nodes, used by [`FilteredView`](crate::FilteredView) and
//! [`XmlData::filtered_descendants`](crate::XmlData::filtered_descendants).

use crate::xmldata::{Node, XmlData};
use crate::xmlvalue::{Value, ValueType};

/// A predicate that decides whether a node belongs to a view.
pub trait Filter {
    fn matches(&self, data: &XmlData, node: Node) -> bool;
}

/// Any closure over a [`Value`] is a filter.
///
/// ```rust
/// use xmlweave::{Value, XmlData};
///
/// let mut data = XmlData::new();
/// let root = data.parse("<a><b/>text<!--c--><b/></a>").unwrap();
/// let a = data.document_element(root).unwrap();
/// let view = data.view(a, |value: &Value| matches!(value, Value::Comment(_)));
/// assert_eq!(view.len(&data), 1);
/// ```
impl<F> Filter for F
where
    F: Fn(&Value) -> bool,
{
    fn matches(&self, data: &XmlData, node: Node) -> bool {
        self(data.value(node))
    }
}

/// Filter on the type of a node.
///
/// A set of [`ValueType`]s; a node matches when its type is in the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFilter {
    mask: u8,
}

impl ContentFilter {
    /// Matches every node.
    pub fn all() -> Self {
        Self::only(&ValueType::ALL)
    }

    /// Matches nothing.
    pub fn none() -> Self {
        ContentFilter { mask: 0 }
    }

    /// Matches only the given types.
    pub fn only(value_types: &[ValueType]) -> Self {
        ContentFilter {
            mask: value_types.iter().fold(0, |mask, t| mask | t.bit()),
        }
    }

    pub fn elements() -> Self {
        Self::only(&[ValueType::Element])
    }

    /// Text, CDATA and entity references.
    pub fn text_like() -> Self {
        Self::only(&[ValueType::Text, ValueType::Cdata, ValueType::EntityRef])
    }

    pub fn comments() -> Self {
        Self::only(&[ValueType::Comment])
    }

    /// Add a type to the set.
    pub fn with(self, value_type: ValueType) -> Self {
        ContentFilter {
            mask: self.mask | value_type.bit(),
        }
    }

    /// Remove a type from the set.
    pub fn without(self, value_type: ValueType) -> Self {
        ContentFilter {
            mask: self.mask & !value_type.bit(),
        }
    }

    /// Matches exactly the types this filter does not.
    pub fn negate(self) -> Self {
        ContentFilter {
            mask: !self.mask & Self::all().mask,
        }
    }

    pub fn accepts(&self, value_type: ValueType) -> bool {
        self.mask & value_type.bit() != 0
    }
}

impl Filter for ContentFilter {
    fn matches(&self, data: &XmlData, node: Node) -> bool {
        self.accepts(data.value_type(node))
    }
}

/// Matches elements, optionally only those with a given name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementFilter {
    name: Option<String>,
}

impl ElementFilter {
    /// Matches any element.
    pub fn any() -> Self {
        ElementFilter { name: None }
    }

    /// Matches elements with this name.
    pub fn named(name: &str) -> Self {
        ElementFilter {
            name: Some(name.to_string()),
        }
    }
}

impl Filter for ElementFilter {
    fn matches(&self, data: &XmlData, node: Node) -> bool {
        match (data.element(node), &self.name) {
            (Some(element), Some(name)) => element.name() == name,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ContentFilter::elements(), ValueType::Element, true)]
    #[case(ContentFilter::elements(), ValueType::Text, false)]
    #[case(ContentFilter::text_like(), ValueType::Cdata, true)]
    #[case(ContentFilter::text_like(), ValueType::EntityRef, true)]
    #[case(ContentFilter::text_like().negate(), ValueType::Text, false)]
    #[case(ContentFilter::text_like().negate(), ValueType::Comment, true)]
    #[case(ContentFilter::all().without(ValueType::Comment), ValueType::Comment, false)]
    #[case(ContentFilter::none().with(ValueType::DocType), ValueType::DocType, true)]
    fn test_content_filter(
        #[case] filter: ContentFilter,
        #[case] value_type: ValueType,
        #[case] expected: bool,
    ) {
        assert_eq!(filter.accepts(value_type), expected);
    }

    #[test]
    fn test_element_filter() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        let b = data.new_element("b");
        let text = data.new_text("a");
        let filter = ElementFilter::named("a");
        assert!(filter.matches(&data, a));
        assert!(!filter.matches(&data, b));
        assert!(!filter.matches(&data, text));
        assert!(ElementFilter::any().matches(&data, b));
    }
}
