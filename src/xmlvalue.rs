use std::fmt::Debug;

/// The type of an XML node.
///
/// Access it using [`Value::value_type`] or
/// [`XmlData::value_type`](crate::XmlData::value_type).
///
/// The `ValueType` can be used if you are interested in
/// the type of the value without needing to match on it.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ValueType {
    /// Document that holds everything. Note that this is not the same
    /// as the root element.
    Document,
    /// Element; it has a name and attributes.
    Element,
    /// Text.
    Text,
    /// CDATA section.
    Cdata,
    /// Comment.
    Comment,
    /// Processing instruction.
    ProcessingInstruction,
    /// Entity reference that is not expanded, like `&nbsp;`.
    EntityRef,
    /// Document type declaration.
    DocType,
}

impl ValueType {
    pub(crate) const ALL: [ValueType; 8] = [
        ValueType::Document,
        ValueType::Element,
        ValueType::Text,
        ValueType::Cdata,
        ValueType::Comment,
        ValueType::ProcessingInstruction,
        ValueType::EntityRef,
        ValueType::DocType,
    ];

    /// Text-like values are merged into runs when formatting.
    pub fn is_text_like(self) -> bool {
        matches!(self, ValueType::Text | ValueType::Cdata | ValueType::EntityRef)
    }

    /// Containers hold a child sequence.
    pub fn is_container(self) -> bool {
        matches!(self, ValueType::Document | ValueType::Element)
    }

    pub(crate) fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// An XML value.
///
/// Access it using [`XmlData::value`](crate::XmlData::value) or
/// mutably using [`XmlData::value_mut`](crate::XmlData::value_mut).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Document that holds everything.
    Document,
    /// Element; it has a name and attributes.
    Element(Element),
    /// Text. You can get and set the text value.
    Text(Text),
    /// CDATA section; serialized unescaped inside `<![CDATA[...]]>`.
    Cdata(Text),
    /// Comment.
    Comment(Comment),
    /// Processing instruction.
    ProcessingInstruction(ProcessingInstruction),
    /// Unexpanded entity reference.
    EntityRef(EntityRef),
    /// Document type declaration.
    DocType(DocType),
}

impl Value {
    /// Returns the type of the XML value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Document => ValueType::Document,
            Value::Element(_) => ValueType::Element,
            Value::Text(_) => ValueType::Text,
            Value::Cdata(_) => ValueType::Cdata,
            Value::Comment(_) => ValueType::Comment,
            Value::ProcessingInstruction(_) => ValueType::ProcessingInstruction,
            Value::EntityRef(_) => ValueType::EntityRef,
            Value::DocType(_) => ValueType::DocType,
        }
    }
}

/// XML element value.
///
/// Example: `<foo/>` or `<foo bar="baz"/>`. Names are kept as written,
/// including any prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(crate) name: String,
    pub(crate) attributes: Vec<(String, String)>,
}

impl Element {
    pub(crate) fn new(name: String) -> Self {
        Element {
            name,
            attributes: Vec::new(),
        }
    }

    /// The name of the element.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attributes of the element, in the order they were set.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Get an attribute by name.
    ///
    /// ```rust
    /// use xmlweave::XmlData;
    ///
    /// let mut data = XmlData::new();
    /// let root = data.parse(r#"<doc a="A" />"#)?;
    /// let doc_el = data.document_element(root).unwrap();
    /// let element = data.element(doc_el).unwrap();
    ///
    /// assert_eq!(element.get_attribute("a"), Some("A"));
    /// # Ok::<(), xmlweave::Error>(())
    /// ```
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute value, replacing an existing value in place.
    pub fn set_attribute<N: Into<String>, S: Into<String>>(&mut self, name: N, value: S) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.attributes.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let position = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(position).1)
    }
}

/// XML text value, also used for CDATA sections.
///
/// Example: `Bar` in `<foo>Bar</foo>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub(crate) text: String,
}

impl Text {
    pub(crate) fn new(text: String) -> Self {
        Text { text }
    }

    /// Get the text value.
    pub fn get(&self) -> &str {
        &self.text
    }

    /// Set the text value.
    pub fn set<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
    }
}

/// XML comment.
///
/// Example: `<!-- foo -->`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub(crate) text: String,
}

impl Comment {
    pub(crate) fn new(text: String) -> Self {
        Comment { text }
    }

    /// Get the comment text.
    pub fn get(&self) -> &str {
        &self.text
    }

    /// Set the comment text.
    pub fn set<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
    }
}

/// XML processing instruction value.
///
/// Example: `<?foo?>` or `<?foo bar?>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    pub(crate) target: String,
    pub(crate) data: Option<String>,
}

impl ProcessingInstruction {
    pub(crate) fn new(target: String, data: Option<String>) -> Self {
        ProcessingInstruction { target, data }
    }

    /// Get processing instruction target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get processing instruction data.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Set data. Empty data is stored as no data.
    pub fn set_data<S: Into<String>>(&mut self, data: Option<S>) {
        self.data = data.map(Into::into).filter(|d| !d.is_empty());
    }
}

/// Unexpanded entity reference.
///
/// Example: `&nbsp;` has the name `nbsp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub(crate) name: String,
}

impl EntityRef {
    pub(crate) fn new(name: String) -> Self {
        EntityRef { name }
    }

    /// The entity name, without `&` and `;`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Document type declaration, treated as an opaque value.
///
/// Example: `<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "xhtml1.dtd">`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocType {
    pub(crate) element_name: String,
    pub(crate) public_id: Option<String>,
    pub(crate) system_id: Option<String>,
    pub(crate) internal_subset: Option<String>,
}

impl DocType {
    pub(crate) fn new(element_name: String) -> Self {
        DocType {
            element_name,
            public_id: None,
            system_id: None,
            internal_subset: None,
        }
    }

    /// The declared root element name.
    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    pub fn public_id(&self) -> Option<&str> {
        self.public_id.as_deref()
    }

    pub fn system_id(&self) -> Option<&str> {
        self.system_id.as_deref()
    }

    /// The internal subset, without the surrounding brackets.
    pub fn internal_subset(&self) -> Option<&str> {
        self.internal_subset.as_deref()
    }

    pub fn set_public_id<S: Into<String>>(&mut self, public_id: Option<S>) {
        self.public_id = public_id.map(Into::into);
    }

    pub fn set_system_id<S: Into<String>>(&mut self, system_id: Option<S>) {
        self.system_id = system_id.map(Into::into);
    }

    pub fn set_internal_subset<S: Into<String>>(&mut self, internal_subset: Option<S>) {
        self.internal_subset = internal_subset.map(Into::into);
    }
}
