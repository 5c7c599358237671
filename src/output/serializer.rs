use genawaiter::rc::gen;
use genawaiter::yield_;
use tracing::debug;

use super::format::{Format, TextMode};
use super::format_stack::FormatStack;
use super::walker::{Chunk, WalkItem, Walker};
use crate::entity::serialize_text;
use crate::error::Error;
use crate::xmldata::{Node, XmlData};
use crate::xmlvalue::{DocType, Element, Value};

pub(crate) const DISABLE_OUTPUT_ESCAPING: &str = "javax.xml.transform.disable-output-escaping";
pub(crate) const ENABLE_OUTPUT_ESCAPING: &str = "javax.xml.transform.enable-output-escaping";

/// Output of serialization
///
/// Each item is a piece of markup in document order. Text, CDATA and entity
/// references are already formatted (trimmed, padded, and escaped when
/// escaping is on); rendering the rest is left to the writer.
///
/// You can use this information for customized serialization.
#[derive(Debug, PartialEq)]
pub enum Output<'a> {
    /// XML declaration, i.e. `<?xml version="1.0" encoding="UTF-8"?>`
    Declaration { encoding: Option<String> },
    /// Document type declaration, i.e. `<!DOCTYPE foo SYSTEM "foo.dtd">`
    DocType(&'a DocType),
    /// Start tag open with its attributes, i.e `<foo a="A"`
    StartTagOpen(&'a Element),
    /// Start tag close for an element with content, `>`
    StartTagClose,
    /// Close of an empty element, `/>`
    EmptyTagClose,
    /// End tag, i.e. `</foo>`
    EndTag(&'a Element),
    /// Comment, i.e. `<!--foo-->`
    Comment(&'a str),
    /// Processing instruction, i.e. `<?foo bar?>`
    ProcessingInstruction(&'a str, Option<&'a str>),
    /// Text, including padding
    Text(String),
    /// Content of a CDATA section
    Cdata(String),
    /// Name of an entity reference
    EntityRef(String),
}

impl From<Chunk> for Output<'_> {
    fn from(chunk: Chunk) -> Self {
        match chunk {
            Chunk::Text(text) => Output::Text(text),
            Chunk::Cdata(text) => Output::Cdata(text),
            Chunk::EntityRef(name) => Output::EntityRef(name),
        }
    }
}

struct Frame<'a> {
    // `None` for a document
    element: Option<&'a Element>,
    walker: Walker<'a>,
    surround: bool,
}

/// The escaping a directive instruction switches to, if `target` names one.
pub(crate) fn escaping_directive(target: &str) -> Option<bool> {
    match target {
        DISABLE_OUTPUT_ESCAPING => Some(false),
        ENABLE_OUTPUT_ESCAPING => Some(true),
        _ => None,
    }
}

/// Generate the output of `node` and everything below it.
///
/// Nesting is tracked with an explicit stack of walkers, one per open
/// element, so the depth of the tree does not matter.
pub(crate) fn gen_outputs<'a>(
    data: &'a XmlData,
    node: Node,
    format: &Format,
) -> impl Iterator<Item = Result<Output<'a>, Error>> + 'a {
    let mut fstack = FormatStack::new(format);
    gen!({
        let mut frames: Vec<Frame<'a>> = Vec::new();
        let mut start: Option<Node> = None;
        let is_document = matches!(data.value(node), Value::Document);

        match data.value(node) {
            Value::Document => {
                if !fstack.omit_declaration() {
                    let encoding =
                        (!fstack.omit_encoding()).then(|| fstack.encoding().to_string());
                    yield_!(Ok(Output::Declaration { encoding }));
                    if let Some(eol) = fstack.line_separator() {
                        yield_!(Ok(Output::Text(eol.to_string())));
                    }
                }
                frames.push(Frame {
                    element: None,
                    walker: Walker::new(data, node, &fstack),
                    surround: false,
                });
            }
            Value::Element(_) => start = Some(node),
            Value::Text(text) => {
                let text = if fstack.escape_output() {
                    serialize_text(text.get().into())
                } else {
                    text.get().into()
                };
                yield_!(Ok(Output::Text(text.into_owned())));
            }
            Value::Cdata(text) => yield_!(Ok(Output::Cdata(text.get().to_string()))),
            Value::EntityRef(entity) => yield_!(Ok(Output::EntityRef(entity.name().to_string()))),
            Value::Comment(comment) => yield_!(Ok(Output::Comment(comment.get()))),
            Value::ProcessingInstruction(pi) => {
                yield_!(Ok(Output::ProcessingInstruction(pi.target(), pi.data())))
            }
            Value::DocType(doctype) => yield_!(Ok(Output::DocType(doctype))),
        }

        loop {
            if let Some(element_node) = start.take() {
                let element = match data.value(element_node) {
                    Value::Element(element) => element,
                    _ => continue,
                };
                yield_!(Ok(Output::StartTagOpen(element)));
                fstack.push();
                match element.get_attribute("xml:space") {
                    Some("preserve") => fstack.set_text_mode(TextMode::Preserve),
                    Some("default") => fstack.set_text_mode(fstack.default_mode()),
                    _ => {}
                }
                let walker = Walker::new(data, element_node, &fstack);
                if !walker.has_next() {
                    if fstack.expand_empty_elements() {
                        yield_!(Ok(Output::StartTagClose));
                        yield_!(Ok(Output::EndTag(element)));
                    } else {
                        yield_!(Ok(Output::EmptyTagClose));
                    }
                    fstack.pop();
                    continue;
                }
                yield_!(Ok(Output::StartTagClose));
                let pad = fstack.pad_between().map(|s| s.to_string());
                let surround = !walker.is_all_text() && pad.is_some();
                if let Some(pad) = pad.filter(|_| surround) {
                    yield_!(Ok(Output::Text(pad)));
                }
                frames.push(Frame {
                    element: Some(element),
                    walker,
                    surround,
                });
                continue;
            }

            let Some(frame) = frames.last_mut() else {
                break;
            };
            if !frame.walker.has_next() {
                let element = frame.element;
                let surround = frame.surround;
                frames.pop();
                if let Some(element) = element {
                    if surround {
                        if let Some(pad) = fstack.pad_last() {
                            yield_!(Ok(Output::Text(pad.to_string())));
                        }
                    }
                    yield_!(Ok(Output::EndTag(element)));
                    fstack.pop();
                }
                continue;
            }

            let item = match frame.walker.next(&fstack) {
                Ok(item) => item,
                Err(err) => {
                    yield_!(Err(err));
                    break;
                }
            };
            match item {
                WalkItem::Text(chunk) => yield_!(Ok(chunk.into())),
                WalkItem::Node(child) => match data.value(child) {
                    Value::Element(_) => start = Some(child),
                    Value::Comment(comment) => yield_!(Ok(Output::Comment(comment.get()))),
                    Value::ProcessingInstruction(pi) => {
                        match escaping_directive(pi.target()) {
                            Some(escape) if !fstack.ignore_escaping_directives() => {
                                debug!(escape, depth = fstack.depth(), "escaping directive");
                                fstack.set_escape_output(escape);
                            }
                            _ => yield_!(Ok(Output::ProcessingInstruction(
                                pi.target(),
                                pi.data()
                            ))),
                        }
                    }
                    Value::DocType(doctype) => yield_!(Ok(Output::DocType(doctype))),
                    // text-like children come through as chunks, and
                    // documents are never children
                    _ => {}
                },
            }
        }

        if is_document {
            if let Some(eol) = fstack.line_separator() {
                yield_!(Ok(Output::Text(eol.to_string())));
            }
        }
    })
    .into_iter()
}
