use crate::xmldata::{Node, NodeData, XmlData};
use crate::xmlvalue::{
    Comment, DocType, Element, EntityRef, ProcessingInstruction, Text, Value,
};

/// ## Creation
///
/// New nodes are standalone: they have no owner until they are inserted
/// into the child sequence of a document or element.
impl XmlData {
    pub(crate) fn new_node(&mut self, value: Value) -> Node {
        Node::new(self.arena.new_node(NodeData::new(value)))
    }

    /// Create a new, empty document.
    pub fn new_document(&mut self) -> Node {
        self.new_node(Value::Document)
    }

    /// Create a new element with the given name.
    ///
    /// ```rust
    /// use xmlweave::XmlData;
    ///
    /// let mut data = XmlData::new();
    /// let doc = data.new_document();
    /// let root = data.new_element("root");
    /// data.append(doc, root)?;
    /// assert_eq!(data.to_string(doc)?, "<root/>");
    /// # Ok::<(), xmlweave::Error>(())
    /// ```
    pub fn new_element(&mut self, name: &str) -> Node {
        self.new_node(Value::Element(Element::new(name.to_string())))
    }

    pub fn new_text(&mut self, text: &str) -> Node {
        self.new_node(Value::Text(Text::new(text.to_string())))
    }

    pub fn new_cdata(&mut self, text: &str) -> Node {
        self.new_node(Value::Cdata(Text::new(text.to_string())))
    }

    pub fn new_comment(&mut self, comment: &str) -> Node {
        self.new_node(Value::Comment(Comment::new(comment.to_string())))
    }

    pub fn new_processing_instruction(&mut self, target: &str, data: Option<&str>) -> Node {
        self.new_node(Value::ProcessingInstruction(ProcessingInstruction::new(
            target.to_string(),
            data.filter(|d| !d.is_empty()).map(|s| s.to_string()),
        )))
    }

    /// Create an entity reference; `name` is given without `&` and `;`.
    pub fn new_entity_ref(&mut self, name: &str) -> Node {
        self.new_node(Value::EntityRef(EntityRef::new(name.to_string())))
    }

    /// Create a document type declaration for the given root element name.
    pub fn new_doctype(
        &mut self,
        element_name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Node {
        let mut doctype = DocType::new(element_name.to_string());
        doctype.set_public_id(public_id);
        doctype.set_system_id(system_id);
        self.new_node(Value::DocType(doctype))
    }
}
