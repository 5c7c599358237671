use std::io::Write;

use crate::error::Error;
use crate::output::{gen_outputs, Format, Output, XmlSerializer};
use crate::xmldata::{Node, XmlData};

/// ## Serialization
impl XmlData {
    /// The output tokens for `node` and its subtree.
    ///
    /// This is the stream [`XmlData::serialize_write`] renders; use it for
    /// customized serialization.
    pub fn outputs<'a>(
        &'a self,
        format: &Format,
        node: Node,
    ) -> impl Iterator<Item = Result<Output<'a>, Error>> + 'a {
        gen_outputs(self, node, format)
    }

    /// Write `node` as XML to a writer.
    ///
    /// A document gets an XML declaration unless the format omits it, and a
    /// final line separator if the format has one. Any other node is written
    /// as a fragment.
    pub fn serialize_write<W: Write>(
        &self,
        format: &Format,
        node: Node,
        w: &mut W,
    ) -> Result<(), Error> {
        XmlSerializer::serialize(w, gen_outputs(self, node, format))
    }

    /// Serialize `node` as XML to a string.
    ///
    /// ```rust
    /// use xmlweave::{Format, XmlData};
    ///
    /// let mut data = XmlData::new();
    /// let doc = data.parse("<a>  <b/>  </a>")?;
    /// assert_eq!(
    ///     data.serialize_string(&Format::pretty(), doc)?,
    ///     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a>\n  <b/>\n</a>\n"
    /// );
    /// # Ok::<(), xmlweave::Error>(())
    /// ```
    pub fn serialize_string(&self, format: &Format, node: Node) -> Result<String, Error> {
        let mut buf = Vec::new();
        self.serialize_write(format, node, &mut buf)?;
        // the writer only ever receives str data
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Serialize `node` without any formatting and without declaration.
    ///
    /// ```rust
    /// use xmlweave::XmlData;
    ///
    /// let mut data = XmlData::new();
    /// let doc = data.parse("<a>  <b>x</b> </a>")?;
    /// assert_eq!(data.to_string(doc)?, "<a>  <b>x</b> </a>");
    /// # Ok::<(), xmlweave::Error>(())
    /// ```
    pub fn to_string(&self, node: Node) -> Result<String, Error> {
        self.serialize_string(&Format::raw(), node)
    }

    /// Serialize `node` indented, with text trimmed. Unlike
    /// [`Format::pretty`] no declaration is written.
    pub fn to_pretty_string(&self, node: Node) -> Result<String, Error> {
        self.serialize_string(&Format::pretty().with_omit_declaration(true), node)
    }
}
