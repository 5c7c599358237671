use std::collections::VecDeque;

use tracing::trace;

use super::format::TextMode;
use super::format_stack::FormatStack;
use super::serializer::escaping_directive;
use crate::entity::serialize_text;
use crate::error::Error;
use crate::xmldata::{Node, XmlData};
use crate::xmlvalue::Value;

/// How the edges and inside of a text run are trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trim {
    /// Verbatim.
    None,
    /// Leading whitespace removed.
    Left,
    /// Trailing whitespace removed.
    Right,
    /// Leading and trailing whitespace removed.
    Both,
    /// Like `Both`, and every inner stretch of whitespace becomes a single
    /// space.
    Compact,
}

impl Trim {
    fn trims_left(self) -> bool {
        matches!(self, Trim::Left | Trim::Both | Trim::Compact)
    }

    fn trims_right(self) -> bool {
        matches!(self, Trim::Right | Trim::Both | Trim::Compact)
    }
}

/// A piece of synthesized text produced by a [`Walker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Plain text, escaped if escaping was on for this run.
    Text(String),
    /// Content of a CDATA section, never escaped or merged.
    Cdata(String),
    /// Name of an entity reference, written as `&name;`.
    EntityRef(String),
}

/// What a [`Walker`] returns on each step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkItem {
    /// A child that is not text-like: element, comment, processing
    /// instruction or doctype.
    Node(Node),
    /// A chunk of a text run, or padding.
    Text(Chunk),
}

/// Formatted chunks for a contiguous span of text-like children.
#[derive(Debug, Clone)]
struct TextRun {
    start: usize,
    end: usize,
    escaped: bool,
    chunks: VecDeque<Chunk>,
}

#[derive(Debug, Clone)]
enum Entry {
    Node(Node),
    Run(TextRun),
}

/// Walks the children of a container for serialization.
///
/// Contiguous text, CDATA and entity reference children are merged into a
/// single run and trimmed as a whole according to the text mode in effect
/// when the walker was created. When the format stack has padding for this
/// level, a padding chunk is produced between consecutive items. Padding
/// before the first item and after the last one is left to the caller, who
/// can decide based on [`Walker::is_all_text`].
///
/// An escaping directive that the serializer consumes produces no output,
/// so it gets no padding and does not count when deciding whether the
/// children are all text.
///
/// The walker prepares one item ahead. A run prepared while escaping was
/// on is rebuilt if escaping is off by the time it is served (and the other
/// way around), so a directive that changes escaping between two items
/// takes effect on the very next run.
pub struct Walker<'a> {
    data: &'a XmlData,
    children: &'a [Node],
    trim: Trim,
    drop_whitespace: bool,
    pad: Option<String>,
    all_text: bool,
    all_whitespace: bool,
    position: usize,
    current: Option<TextRun>,
    lookahead: Option<Entry>,
    pad_due: bool,
    directives: bool,
}

impl<'a> Walker<'a> {
    /// Create a walker over the children of `parent`, formatted according to
    /// the current level of `fstack`.
    pub fn new(data: &'a XmlData, parent: Node, fstack: &FormatStack) -> Self {
        let (trim, drop_whitespace) = match fstack.text_mode() {
            TextMode::Preserve => (Trim::None, false),
            TextMode::Trim => (Trim::Both, true),
            TextMode::Normalize => (Trim::Compact, true),
            TextMode::TrimFullWhite => (Trim::None, true),
        };
        Self::build(data, parent, fstack, trim, drop_whitespace)
    }

    /// Create a walker that trims text runs with `trim` regardless of the
    /// text mode. Whitespace-only runs are dropped unless `trim` is
    /// [`Trim::None`].
    pub fn with_trim(data: &'a XmlData, parent: Node, fstack: &FormatStack, trim: Trim) -> Self {
        Self::build(data, parent, fstack, trim, trim != Trim::None)
    }

    fn build(
        data: &'a XmlData,
        parent: Node,
        fstack: &FormatStack,
        trim: Trim,
        drop_whitespace: bool,
    ) -> Self {
        let children = data.children(parent);
        let directives = !fstack.ignore_escaping_directives();
        let mut all_text = true;
        let mut all_whitespace = true;
        for child in children {
            match data.value(*child) {
                Value::Text(text) | Value::Cdata(text) => {
                    if all_whitespace && !is_whitespace(text.get()) {
                        all_whitespace = false;
                    }
                }
                Value::EntityRef(_) => all_whitespace = false,
                Value::ProcessingInstruction(pi)
                    if directives && escaping_directive(pi.target()).is_some() => {}
                _ => {
                    all_text = false;
                    all_whitespace = false;
                    break;
                }
            }
        }
        let mut walker = Walker {
            data,
            children,
            trim,
            drop_whitespace,
            pad: fstack.pad_between().map(|s| s.to_string()),
            all_text,
            all_whitespace,
            position: 0,
            current: None,
            lookahead: None,
            pad_due: false,
            directives,
        };
        walker.lookahead = walker.prepare(fstack.escape_output());
        walker
    }

    /// Every child is text-like (vacuously true without children).
    pub fn is_all_text(&self) -> bool {
        self.all_text
    }

    /// Every child is text-like and contains only whitespace.
    pub fn is_all_whitespace(&self) -> bool {
        self.all_whitespace
    }

    pub fn has_next(&self) -> bool {
        self.lookahead.is_some()
            || self
                .current
                .as_ref()
                .map(|run| !run.chunks.is_empty())
                .unwrap_or(false)
    }

    /// Produce the next item.
    ///
    /// The format stack must be at the level the walker was created for.
    pub fn next(&mut self, fstack: &FormatStack) -> Result<WalkItem, Error> {
        if let Some(run) = self.current.as_mut() {
            if let Some(chunk) = run.chunks.pop_front() {
                return Ok(WalkItem::Text(chunk));
            }
            self.current = None;
        }
        if self.lookahead.is_none() {
            return Err(Error::IteratorExhausted);
        }
        let silent = match &self.lookahead {
            Some(Entry::Node(node)) => self.is_directive(*node),
            _ => false,
        };
        if self.pad_due && !silent {
            self.pad_due = false;
            if let Some(pad) = &self.pad {
                return Ok(WalkItem::Text(Chunk::Text(pad.clone())));
            }
        }
        let escape = fstack.escape_output();
        let entry = self.lookahead.take().ok_or(Error::IteratorExhausted)?;
        self.lookahead = self.prepare(escape);
        if !silent {
            self.pad_due = self.pad.is_some();
        }
        match entry {
            Entry::Node(node) => Ok(WalkItem::Node(node)),
            Entry::Run(mut run) => {
                if run.escaped != escape {
                    trace!(start = run.start, end = run.end, escape, "rebuild text run");
                    run = self.build_run(run.start, run.end, escape);
                }
                let chunk = run.chunks.pop_front().ok_or(Error::IteratorExhausted)?;
                self.current = Some(run);
                Ok(WalkItem::Text(chunk))
            }
        }
    }

    fn prepare(&mut self, escape: bool) -> Option<Entry> {
        while self.position < self.children.len() {
            let start = self.position;
            let node = self.children[start];
            if !self.data.value_type(node).is_text_like() {
                self.position += 1;
                return Some(Entry::Node(node));
            }
            let mut end = start + 1;
            while end < self.children.len() && self.data.value_type(self.children[end]).is_text_like()
            {
                end += 1;
            }
            self.position = end;
            if self.drop_whitespace && self.is_whitespace_span(start, end) {
                continue;
            }
            let run = self.build_run(start, end, escape);
            if !run.chunks.is_empty() {
                return Some(Entry::Run(run));
            }
        }
        None
    }

    fn is_directive(&self, node: Node) -> bool {
        self.directives
            && matches!(self.data.value(node), Value::ProcessingInstruction(pi)
                if escaping_directive(pi.target()).is_some())
    }

    fn is_whitespace_span(&self, start: usize, end: usize) -> bool {
        self.children[start..end]
            .iter()
            .all(|node| match self.data.value(*node) {
                Value::Text(text) | Value::Cdata(text) => is_whitespace(text.get()),
                _ => false,
            })
    }

    fn build_run(&self, start: usize, end: usize, escape: bool) -> TextRun {
        let mut segments = Vec::new();
        let mut buffer = String::new();
        for node in &self.children[start..end] {
            match self.data.value(*node) {
                Value::Text(text) => buffer.push_str(text.get()),
                Value::Cdata(text) => {
                    if !buffer.is_empty() {
                        segments.push(Chunk::Text(std::mem::take(&mut buffer)));
                    }
                    segments.push(Chunk::Cdata(text.get().to_string()));
                }
                Value::EntityRef(entity) => {
                    if !buffer.is_empty() {
                        segments.push(Chunk::Text(std::mem::take(&mut buffer)));
                    }
                    segments.push(Chunk::EntityRef(entity.name().to_string()));
                }
                _ => {}
            }
        }
        if !buffer.is_empty() {
            segments.push(Chunk::Text(buffer));
        }

        let segments = match self.trim {
            Trim::None => segments,
            Trim::Compact => compact(segments),
            trim => trim_edges(segments, trim.trims_left(), trim.trims_right()),
        };

        let chunks = segments
            .into_iter()
            .map(|chunk| match chunk {
                Chunk::Text(text) if escape => Chunk::Text(serialize_text(text.into()).into_owned()),
                chunk => chunk,
            })
            .collect();
        TextRun {
            start,
            end,
            escaped: escape,
            chunks,
        }
    }
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_whitespace(s: &str) -> bool {
    s.chars().all(is_xml_whitespace)
}

fn chunk_text_mut(chunk: &mut Chunk) -> Option<&mut String> {
    match chunk {
        Chunk::Text(text) | Chunk::Cdata(text) => Some(text),
        Chunk::EntityRef(_) => None,
    }
}

fn trim_edges(mut segments: Vec<Chunk>, left: bool, right: bool) -> Vec<Chunk> {
    if left {
        let mut drop = 0;
        for segment in segments.iter_mut() {
            let Some(text) = chunk_text_mut(segment) else {
                break;
            };
            let trimmed = text.trim_start_matches(is_xml_whitespace);
            if trimmed.is_empty() {
                drop += 1;
                continue;
            }
            *text = trimmed.to_string();
            break;
        }
        segments.drain(..drop);
    }
    if right {
        while let Some(segment) = segments.last_mut() {
            let Some(text) = chunk_text_mut(segment) else {
                break;
            };
            let trimmed = text.trim_end_matches(is_xml_whitespace);
            if trimmed.is_empty() {
                segments.pop();
                continue;
            }
            *text = trimmed.to_string();
            break;
        }
    }
    segments
}

// whitespace is only written once something non-white follows it, which
// trims both edges and collapses the inside in one pass, across chunk
// boundaries
fn compact(segments: Vec<Chunk>) -> Vec<Chunk> {
    let mut result: Vec<Chunk> = Vec::with_capacity(segments.len());
    let mut pending_space = false;
    let mut seen_content = false;
    for segment in segments {
        let is_cdata = matches!(segment, Chunk::Cdata(_));
        match segment {
            Chunk::Text(text) | Chunk::Cdata(text) => {
                let mut out = String::with_capacity(text.len());
                for c in text.chars() {
                    if is_xml_whitespace(c) {
                        pending_space = seen_content;
                    } else {
                        if pending_space {
                            out.push(' ');
                            pending_space = false;
                        }
                        out.push(c);
                        seen_content = true;
                    }
                }
                if !out.is_empty() {
                    result.push(if is_cdata {
                        Chunk::Cdata(out)
                    } else {
                        Chunk::Text(out)
                    });
                }
            }
            Chunk::EntityRef(name) => {
                if pending_space {
                    match result.last_mut() {
                        Some(Chunk::Text(text)) => text.push(' '),
                        _ => result.push(Chunk::Text(" ".to_string())),
                    }
                    pending_space = false;
                }
                seen_content = true;
                result.push(Chunk::EntityRef(name));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::serializer::DISABLE_OUTPUT_ESCAPING;
    use crate::output::Format;

    fn walk_all(data: &XmlData, parent: Node, fstack: &FormatStack) -> Vec<WalkItem> {
        let mut walker = Walker::new(data, parent, fstack);
        let mut items = Vec::new();
        while walker.has_next() {
            items.push(walker.next(fstack).unwrap());
        }
        assert!(matches!(walker.next(fstack), Err(Error::IteratorExhausted)));
        items
    }

    fn text(s: &str) -> WalkItem {
        WalkItem::Text(Chunk::Text(s.to_string()))
    }

    #[test]
    fn test_run_keeps_inner_boundaries() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        let t1 = data.new_text("  a");
        let cdata = data.new_cdata("<b>");
        let amp = data.new_entity_ref("amp");
        let t2 = data.new_text("c \n");
        data.append_all(a, &[t1, cdata, amp, t2]).unwrap();

        let fstack = FormatStack::new(&Format::pretty());
        assert_eq!(
            walk_all(&data, a, &fstack),
            vec![
                text("a"),
                WalkItem::Text(Chunk::Cdata("<b>".to_string())),
                WalkItem::Text(Chunk::EntityRef("amp".to_string())),
                text("c"),
            ]
        );
    }

    #[test]
    fn test_adjacent_text_merged() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        data.append_text(a, "one ").unwrap();
        data.append_text(a, "& two").unwrap();
        let fstack = FormatStack::new(&Format::raw());
        assert_eq!(walk_all(&data, a, &fstack), vec![text("one &amp; two")]);
    }

    #[test]
    fn test_whitespace_around_element_becomes_padding() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        data.append_text(a, "  ").unwrap();
        let x = data.append_element(a, "x").unwrap();
        data.append_text(a, "  ").unwrap();

        let mut fstack = FormatStack::new(&Format::compact().with_indent(Some("  ")));
        fstack.push();
        let walker = Walker::new(&data, a, &fstack);
        assert!(!walker.is_all_text());
        assert!(!walker.is_all_whitespace());
        assert_eq!(walk_all(&data, a, &fstack), vec![WalkItem::Node(x)]);
    }

    #[test]
    fn test_padding_between_items() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        let x = data.append_element(a, "x").unwrap();
        data.append_text(a, " mid ").unwrap();
        let y = data.append_element(a, "y").unwrap();

        let mut fstack = FormatStack::new(&Format::pretty());
        fstack.push();
        assert_eq!(
            walk_all(&data, a, &fstack),
            vec![
                WalkItem::Node(x),
                text("\n  "),
                text("mid"),
                text("\n  "),
                WalkItem::Node(y),
            ]
        );
    }

    #[test]
    fn test_preserve_is_verbatim() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        data.append_text(a, "  ").unwrap();
        let x = data.append_element(a, "x").unwrap();
        data.append_text(a, " t ").unwrap();
        let fstack = FormatStack::new(&Format::raw());
        assert_eq!(
            walk_all(&data, a, &fstack),
            vec![text("  "), WalkItem::Node(x), text(" t ")]
        );
    }

    #[test]
    fn test_trim_full_white() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        data.append_text(a, " \n ").unwrap();
        let x = data.append_element(a, "x").unwrap();
        data.append_text(a, " t ").unwrap();
        let fstack = FormatStack::new(&Format::raw().with_text_mode(TextMode::TrimFullWhite));
        assert_eq!(
            walk_all(&data, a, &fstack),
            vec![WalkItem::Node(x), text(" t ")]
        );
    }

    #[test]
    fn test_compact_across_chunks() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        let t1 = data.new_text("  a  ");
        let e = data.new_entity_ref("e");
        let t2 = data.new_text("  b \n\t c  ");
        data.append_all(a, &[t1, e, t2]).unwrap();
        let fstack = FormatStack::new(&Format::compact());
        assert_eq!(
            walk_all(&data, a, &fstack),
            vec![
                text("a "),
                WalkItem::Text(Chunk::EntityRef("e".to_string())),
                text(" b c"),
            ]
        );
    }

    #[test]
    fn test_all_whitespace() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        data.append_text(a, " \t").unwrap();
        let cdata = data.new_cdata("\n");
        data.append(a, cdata).unwrap();
        let fstack = FormatStack::new(&Format::pretty());
        let walker = Walker::new(&data, a, &fstack);
        assert!(walker.is_all_text());
        assert!(walker.is_all_whitespace());
        assert!(!walker.has_next());
    }

    #[test]
    fn test_run_rebuilt_when_escaping_changes() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        let pi = data.new_processing_instruction("p", None);
        data.append(a, pi).unwrap();
        data.append_text(a, "<x>").unwrap();

        let mut fstack = FormatStack::new(&Format::raw());
        let mut walker = Walker::new(&data, a, &fstack);
        // the text run after the instruction is prepared here, escaped
        assert_eq!(walker.next(&fstack).unwrap(), WalkItem::Node(pi));
        fstack.set_escape_output(false);
        assert_eq!(walker.next(&fstack).unwrap(), text("<x>"));
        assert!(!walker.has_next());
    }

    #[test]
    fn test_trim_left_and_right_across_chunks() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        let t1 = data.new_text("  a");
        let cdata = data.new_cdata(" c ");
        let t2 = data.new_text("b  ");
        data.append_all(a, &[t1, cdata, t2]).unwrap();
        data.append_text(a, " ").unwrap();
        let fstack = FormatStack::new(&Format::raw());

        let walk = |trim| {
            let mut walker = Walker::with_trim(&data, a, &fstack, trim);
            let mut items = Vec::new();
            while walker.has_next() {
                items.push(walker.next(&fstack).unwrap());
            }
            items
        };
        let cdata = WalkItem::Text(Chunk::Cdata(" c ".to_string()));
        assert_eq!(
            walk(Trim::Left),
            vec![text("a"), cdata.clone(), text("b   ")]
        );
        assert_eq!(
            walk(Trim::Right),
            vec![text("  a"), cdata.clone(), text("b")]
        );
        assert_eq!(
            walk(Trim::Both),
            vec![text("a"), cdata.clone(), text("b")]
        );
        assert_eq!(
            walk(Trim::None),
            vec![text("  a"), cdata, text("b   ")]
        );
    }

    #[test]
    fn test_trim_left_drops_whitespace_run() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        data.append_text(a, " \n ").unwrap();
        let x = data.append_element(a, "x").unwrap();
        let fstack = FormatStack::new(&Format::raw());
        let mut walker = Walker::with_trim(&data, a, &fstack, Trim::Left);
        assert_eq!(walker.next(&fstack).unwrap(), WalkItem::Node(x));
        assert!(!walker.has_next());
    }

    #[test]
    fn test_escaping_directive_gets_no_padding() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        let b = data.append_element(a, "b").unwrap();
        let pi = data.new_processing_instruction(DISABLE_OUTPUT_ESCAPING, None);
        data.append(a, pi).unwrap();
        let c = data.append_element(a, "c").unwrap();

        let mut fstack = FormatStack::new(&Format::pretty());
        fstack.push();
        assert_eq!(
            walk_all(&data, a, &fstack),
            vec![
                WalkItem::Node(b),
                WalkItem::Node(pi),
                text("\n  "),
                WalkItem::Node(c),
            ]
        );

        fstack.set_ignore_escaping_directives(true);
        assert_eq!(
            walk_all(&data, a, &fstack),
            vec![
                WalkItem::Node(b),
                text("\n  "),
                WalkItem::Node(pi),
                text("\n  "),
                WalkItem::Node(c),
            ]
        );
    }

    #[test]
    fn test_escaping_directive_counts_as_text() {
        let mut data = XmlData::new();
        let a = data.new_element("a");
        data.append_text(a, "x").unwrap();
        let pi = data.new_processing_instruction(DISABLE_OUTPUT_ESCAPING, None);
        data.append(a, pi).unwrap();
        let fstack = FormatStack::new(&Format::pretty());
        assert!(Walker::new(&data, a, &fstack).is_all_text());
    }
}
