/// How text content is treated when serializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextMode {
    /// Text is written exactly as it is, and no indentation is added.
    #[default]
    Preserve,
    /// Each run of text is trimmed on both ends; runs that are only
    /// whitespace disappear.
    Trim,
    /// Like `Trim`, and whitespace inside a run is collapsed to a single
    /// space.
    Normalize,
    /// Runs that are only whitespace disappear; other runs are written
    /// as they are.
    TrimFullWhite,
}

/// Serialization parameters.
///
/// The default is the raw format: no declaration, no added whitespace, text
/// exactly as it is in the tree.
///
/// ```rust
/// use xmlweave::{Format, TextMode, XmlData};
///
/// let mut data = XmlData::new();
/// let root = data.parse("<a><b>  text  </b></a>")?;
/// let format = Format::pretty().with_omit_declaration(true);
/// assert_eq!(
///     data.serialize_string(&format, root)?,
///     "<a>\n  <b>text</b>\n</a>\n"
/// );
/// # Ok::<(), xmlweave::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Format {
    /// Indentation unit added per level; `None` disables indentation.
    pub indent: Option<String>,
    /// Line separator; `None` means no line breaks are ever added.
    pub line_separator: Option<String>,
    /// How text content is treated, unless overridden by `xml:space`.
    pub text_mode: TextMode,
    /// Encoding named in the XML declaration. No conversion is done.
    pub encoding: String,
    /// Leave out the XML declaration when serializing a document.
    pub omit_declaration: bool,
    /// Leave out the encoding in the XML declaration.
    pub omit_encoding: bool,
    /// Write empty elements as `<a></a>` instead of `<a/>`.
    pub expand_empty_elements: bool,
    /// Escape `&`, `<` and `>` in text.
    pub escape_output: bool,
    /// Write escaping processing instructions instead of acting on them.
    pub ignore_escaping_directives: bool,
}

impl Format {
    /// No added whitespace, text preserved, no declaration.
    pub fn raw() -> Self {
        Format {
            indent: None,
            line_separator: None,
            text_mode: TextMode::Preserve,
            encoding: "UTF-8".to_string(),
            omit_declaration: true,
            omit_encoding: false,
            expand_empty_elements: false,
            escape_output: true,
            ignore_escaping_directives: false,
        }
    }

    /// Two space indentation, text trimmed, with declaration.
    pub fn pretty() -> Self {
        Format {
            indent: Some("  ".to_string()),
            line_separator: Some("\n".to_string()),
            text_mode: TextMode::Trim,
            omit_declaration: false,
            ..Self::raw()
        }
    }

    /// No indentation, whitespace normalized, with declaration.
    pub fn compact() -> Self {
        Format {
            line_separator: Some("\n".to_string()),
            text_mode: TextMode::Normalize,
            omit_declaration: false,
            ..Self::raw()
        }
    }

    pub fn with_indent(mut self, indent: Option<&str>) -> Self {
        self.indent = indent.map(|s| s.to_string());
        self
    }

    pub fn with_line_separator(mut self, line_separator: Option<&str>) -> Self {
        self.line_separator = line_separator.map(|s| s.to_string());
        self
    }

    pub fn with_text_mode(mut self, text_mode: TextMode) -> Self {
        self.text_mode = text_mode;
        self
    }

    pub fn with_encoding(mut self, encoding: &str) -> Self {
        self.encoding = encoding.to_string();
        self
    }

    pub fn with_omit_declaration(mut self, omit_declaration: bool) -> Self {
        self.omit_declaration = omit_declaration;
        self
    }

    pub fn with_omit_encoding(mut self, omit_encoding: bool) -> Self {
        self.omit_encoding = omit_encoding;
        self
    }

    pub fn with_expand_empty_elements(mut self, expand_empty_elements: bool) -> Self {
        self.expand_empty_elements = expand_empty_elements;
        self
    }

    pub fn with_escape_output(mut self, escape_output: bool) -> Self {
        self.escape_output = escape_output;
        self
    }

    pub fn with_ignore_escaping_directives(mut self, ignore: bool) -> Self {
        self.ignore_escaping_directives = ignore;
        self
    }
}

impl Default for Format {
    fn default() -> Self {
        Self::raw()
    }
}
