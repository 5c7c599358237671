use ahash::HashSet;
use xmlparser::{ElementEnd, ExternalId, StrSpan, Token, Tokenizer};

use crate::entity::{parse_attribute, split_entities, TextPiece};
use crate::error::Error;
use crate::xmldata::{Node, XmlData};

fn qualified_name(prefix: StrSpan, local: StrSpan) -> String {
    if prefix.as_str().is_empty() {
        local.as_str().to_string()
    } else {
        format!("{}:{}", prefix.as_str(), local.as_str())
    }
}

fn external_ids<'a>(external_id: Option<ExternalId<'a>>) -> (Option<&'a str>, Option<&'a str>) {
    match external_id {
        Some(ExternalId::System(system_id)) => (None, Some(system_id.as_str())),
        Some(ExternalId::Public(public_id, system_id)) => {
            (Some(public_id.as_str()), Some(system_id.as_str()))
        }
        None => (None, None),
    }
}

struct DocumentBuilder {
    document: Node,
    // open containers; the document is at the bottom
    stack: Vec<Node>,
    current_element: Option<Node>,
    // attribute names seen on the current start tag
    seen_attributes: HashSet<String>,
    // doctype whose internal subset is being read, with the subset start
    pending_doctype: Option<(Node, usize)>,
}

impl DocumentBuilder {
    fn new(data: &mut XmlData) -> Self {
        let document = data.new_document();
        DocumentBuilder {
            document,
            stack: vec![document],
            current_element: None,
            seen_attributes: HashSet::default(),
            pending_doctype: None,
        }
    }

    fn top(&self) -> Node {
        self.stack[self.stack.len() - 1]
    }

    fn add(&mut self, data: &mut XmlData, node: Node) -> Result<(), Error> {
        data.append(self.top(), node)
    }

    fn element_start(&mut self, data: &mut XmlData, name: &str) -> Result<(), Error> {
        let element = data.new_element(name);
        self.add(data, element)?;
        self.current_element = Some(element);
        self.seen_attributes.clear();
        Ok(())
    }

    fn attribute(&mut self, data: &mut XmlData, name: &str, value: &str) -> Result<(), Error> {
        if !self.seen_attributes.insert(name.to_string()) {
            return Err(Error::DuplicateAttribute(name.to_string()));
        }
        let value = parse_attribute(value)?;
        let element = match self.current_element {
            Some(node) => data.element_mut(node),
            None => None,
        };
        match element {
            Some(element) => {
                element.set_attribute(name, value);
                Ok(())
            }
            None => Err(Error::UnclosedTag(name.to_string())),
        }
    }

    fn open_element(&mut self) -> Result<(), Error> {
        let element = self
            .current_element
            .take()
            .ok_or_else(|| Error::UnclosedTag(String::new()))?;
        self.stack.push(element);
        Ok(())
    }

    fn close_element(&mut self, data: &XmlData, name: &str) -> Result<(), Error> {
        if self.stack.len() <= 1 {
            return Err(Error::UnclosedTag(name.to_string()));
        }
        let top = self.top();
        let open_name = data.element(top).map(|element| element.name());
        if open_name != Some(name) {
            return Err(Error::UnclosedTag(name.to_string()));
        }
        self.stack.pop();
        Ok(())
    }

    fn text(&mut self, data: &mut XmlData, text: &str) -> Result<(), Error> {
        // whitespace around the root element is not kept
        if self.top() == self.document {
            return Ok(());
        }
        for piece in split_entities(text)? {
            match piece {
                TextPiece::Text(text) => {
                    data.append_text(self.top(), &text)?;
                }
                TextPiece::EntityRef(name) => {
                    let entity = data.new_entity_ref(&name);
                    self.add(data, entity)?;
                }
            }
        }
        Ok(())
    }

    fn finish(self, data: &XmlData) -> Result<Node, Error> {
        if self.stack.len() > 1 {
            let name = data
                .element(self.top())
                .map(|element| element.name().to_string())
                .unwrap_or_default();
            return Err(Error::UnclosedTag(name));
        }
        Ok(self.document)
    }
}

/// ## Parsing
impl XmlData {
    /// Parse a string into a new document node.
    ///
    /// Predefined entities and character references are expanded; other
    /// entity references are kept as entity reference nodes. The DOCTYPE is
    /// kept with its identifiers and internal subset as opaque text.
    ///
    /// ```rust
    /// use xmlweave::{ValueType, XmlData};
    ///
    /// let mut data = XmlData::new();
    /// let doc = data.parse("<p>a &amp; b&nbsp;c</p>")?;
    /// let p = data.document_element(doc).unwrap();
    /// assert_eq!(data.child_count(p), 3);
    /// assert_eq!(data.value_type(data.child(p, 1).unwrap()), ValueType::EntityRef);
    /// assert_eq!(data.text_content(p), "a & bc");
    /// # Ok::<(), xmlweave::Error>(())
    /// ```
    pub fn parse(&mut self, xml: &str) -> Result<Node, Error> {
        let mut builder = DocumentBuilder::new(self);

        for token in Tokenizer::from(xml) {
            match token? {
                Token::Declaration { .. } => {}
                Token::ProcessingInstruction {
                    target, content, ..
                } => {
                    let pi = self.new_processing_instruction(
                        target.as_str(),
                        content.map(|content| content.as_str()),
                    );
                    builder.add(self, pi)?;
                }
                Token::Comment { text, .. } => {
                    let comment = self.new_comment(text.as_str());
                    builder.add(self, comment)?;
                }
                Token::EmptyDtd {
                    name, external_id, ..
                } => {
                    let (public_id, system_id) = external_ids(external_id);
                    let doctype = self.new_doctype(name.as_str(), public_id, system_id);
                    builder.add(self, doctype)?;
                }
                Token::DtdStart {
                    name,
                    external_id,
                    span,
                } => {
                    let (public_id, system_id) = external_ids(external_id);
                    let doctype = self.new_doctype(name.as_str(), public_id, system_id);
                    builder.pending_doctype = Some((doctype, span.end()));
                }
                Token::EntityDeclaration { .. } => {}
                Token::DtdEnd { span } => {
                    if let Some((doctype, start)) = builder.pending_doctype.take() {
                        let subset = xml[start..span.start()].trim();
                        if !subset.is_empty() {
                            if let Some(value) = self.doctype_value_mut(doctype) {
                                value.set_internal_subset(Some(subset));
                            }
                        }
                        builder.add(self, doctype)?;
                    }
                }
                Token::ElementStart { prefix, local, .. } => {
                    builder.element_start(self, &qualified_name(prefix, local))?;
                }
                Token::Attribute {
                    prefix,
                    local,
                    value,
                    ..
                } => {
                    builder.attribute(self, &qualified_name(prefix, local), value.as_str())?;
                }
                Token::ElementEnd { end, .. } => match end {
                    ElementEnd::Open => builder.open_element()?,
                    ElementEnd::Close(prefix, local) => {
                        builder.close_element(self, &qualified_name(prefix, local))?
                    }
                    ElementEnd::Empty => {
                        builder.current_element = None;
                    }
                },
                Token::Text { text } => builder.text(self, text.as_str())?,
                Token::Cdata { text, .. } => {
                    let cdata = self.new_cdata(text.as_str());
                    builder.add(self, cdata)?;
                }
            }
        }
        builder.finish(self)
    }
}
