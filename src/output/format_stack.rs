use super::format::{Format, TextMode};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Level {
    indent: Option<String>,
    pad_between: Option<String>,
    pad_last: Option<String>,
    eol: Option<String>,
    mode: TextMode,
    escape_output: bool,
    ignore_escaping_directives: bool,
}

/// Formatting state per depth of the tree during serialization.
///
/// Entering an element pushes a level that starts out as a copy of its
/// parent with one more unit of indentation. Overrides on that level (text
/// mode, escaping) disappear again when the level is popped, so the parent
/// never needs to be restored by hand.
///
/// ```rust
/// use xmlweave::{Format, FormatStack, TextMode};
///
/// let mut stack = FormatStack::new(&Format::pretty());
/// stack.push();
/// assert_eq!(stack.indent(), Some("  "));
/// stack.set_text_mode(TextMode::Preserve);
/// assert_eq!(stack.indent(), None);
/// stack.push();
/// assert_eq!(stack.indent(), None);
/// stack.pop();
/// stack.pop();
/// assert_eq!(stack.indent(), Some(""));
/// assert_eq!(stack.text_mode(), TextMode::Trim);
/// ```
#[derive(Debug, Clone)]
pub struct FormatStack {
    indent_unit: Option<String>,
    line_separator: Option<String>,
    encoding: String,
    omit_declaration: bool,
    omit_encoding: bool,
    expand_empty_elements: bool,
    default_mode: TextMode,
    levels: Vec<Level>,
}

impl FormatStack {
    pub fn new(format: &Format) -> Self {
        let mut stack = FormatStack {
            indent_unit: format.indent.clone(),
            line_separator: format.line_separator.clone(),
            encoding: format.encoding.clone(),
            omit_declaration: format.omit_declaration,
            omit_encoding: format.omit_encoding,
            expand_empty_elements: format.expand_empty_elements,
            default_mode: format.text_mode,
            levels: Vec::with_capacity(16),
        };
        let mut base = Level {
            indent: None,
            pad_between: None,
            pad_last: None,
            eol: None,
            mode: format.text_mode,
            escape_output: format.escape_output,
            ignore_escaping_directives: format.ignore_escaping_directives,
        };
        stack.apply_mode(0, &mut base);
        stack.levels.push(base);
        stack
    }

    /// Depth of the current level; the outermost level is 0.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Enter a new level, inheriting from the current one.
    pub fn push(&mut self) {
        let mut level = self.current().clone();
        if let (Some(indent), Some(unit), Some(eol)) =
            (&level.indent, &self.indent_unit, &level.eol)
        {
            let child_indent = format!("{}{}", indent, unit);
            level.pad_last = Some(format!("{}{}", eol, indent));
            level.pad_between = Some(format!("{}{}", eol, child_indent));
            level.indent = Some(child_indent);
        }
        self.levels.push(level);
    }

    /// Leave the current level, dropping its overrides. The outermost level
    /// is never popped.
    pub fn pop(&mut self) {
        if self.levels.len() > 1 {
            self.levels.pop();
        }
    }

    /// Change the text mode of the current level.
    ///
    /// `Preserve` removes indentation and line breaks for this level and
    /// everything pushed on top of it. Leaving `Preserve` brings them back
    /// at the indentation this depth would normally have.
    pub fn set_text_mode(&mut self, mode: TextMode) {
        if self.current().mode == mode {
            return;
        }
        let depth = self.depth();
        let mut level = self.current().clone();
        level.mode = mode;
        self.apply_mode(depth, &mut level);
        *self.current_mut() = level;
    }

    pub fn set_escape_output(&mut self, escape_output: bool) {
        self.current_mut().escape_output = escape_output;
    }

    pub fn set_ignore_escaping_directives(&mut self, ignore: bool) {
        self.current_mut().ignore_escaping_directives = ignore;
    }

    /// Accumulated indentation of this level; `None` when not indenting.
    pub fn indent(&self) -> Option<&str> {
        self.current().indent.as_deref()
    }

    /// Line break for this level; `None` in preserve mode.
    pub fn eol(&self) -> Option<&str> {
        self.current().eol.as_deref()
    }

    /// Whitespace written before each item at this level.
    pub fn pad_between(&self) -> Option<&str> {
        self.current().pad_between.as_deref()
    }

    /// Whitespace written after the last item at this level, before the
    /// end tag of the enclosing element.
    pub fn pad_last(&self) -> Option<&str> {
        self.current().pad_last.as_deref()
    }

    pub fn text_mode(&self) -> TextMode {
        self.current().mode
    }

    pub fn escape_output(&self) -> bool {
        self.current().escape_output
    }

    pub fn ignore_escaping_directives(&self) -> bool {
        self.current().ignore_escaping_directives
    }

    /// The text mode of the format, used by `xml:space="default"`.
    pub fn default_mode(&self) -> TextMode {
        self.default_mode
    }

    pub fn indent_unit(&self) -> Option<&str> {
        self.indent_unit.as_deref()
    }

    pub fn line_separator(&self) -> Option<&str> {
        self.line_separator.as_deref()
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn omit_declaration(&self) -> bool {
        self.omit_declaration
    }

    pub fn omit_encoding(&self) -> bool {
        self.omit_encoding
    }

    pub fn expand_empty_elements(&self) -> bool {
        self.expand_empty_elements
    }

    fn current(&self) -> &Level {
        &self.levels[self.levels.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Level {
        let last = self.levels.len() - 1;
        &mut self.levels[last]
    }

    fn apply_mode(&self, depth: usize, level: &mut Level) {
        if level.mode == TextMode::Preserve {
            level.indent = None;
            level.eol = None;
            level.pad_between = None;
            level.pad_last = None;
            return;
        }
        level.eol = self.line_separator.clone();
        match (&self.indent_unit, &self.line_separator) {
            (Some(unit), Some(eol)) => {
                let indent = unit.repeat(depth);
                level.pad_between = Some(format!("{}{}", eol, indent));
                level.pad_last = Some(format!("{}{}", eol, unit.repeat(depth.saturating_sub(1))));
                level.indent = Some(indent);
            }
            _ => {
                level.indent = None;
                level.pad_between = None;
                level.pad_last = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_accumulates_indent() {
        let mut stack = FormatStack::new(&Format::pretty().with_indent(Some("\t")));
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.indent(), Some(""));
        stack.push();
        stack.push();
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.indent(), Some("\t\t"));
        assert_eq!(stack.pad_between(), Some("\n\t\t"));
        assert_eq!(stack.pad_last(), Some("\n\t"));
    }

    #[test]
    fn test_no_indent() {
        let mut stack = FormatStack::new(&Format::compact());
        stack.push();
        assert_eq!(stack.indent(), None);
        assert_eq!(stack.eol(), Some("\n"));
        assert_eq!(stack.pad_between(), None);
    }

    #[test]
    fn test_preserve_propagates_and_reverts() {
        let mut stack = FormatStack::new(&Format::pretty());
        stack.push();
        stack.set_text_mode(TextMode::Preserve);
        assert_eq!(stack.eol(), None);
        stack.push();
        assert_eq!(stack.text_mode(), TextMode::Preserve);
        assert_eq!(stack.pad_between(), None);
        stack.pop();
        stack.pop();
        assert_eq!(stack.text_mode(), TextMode::Trim);
        assert_eq!(stack.pad_between(), Some("\n"));
    }

    #[test]
    fn test_leave_preserve_recomputes_indent() {
        let mut stack = FormatStack::new(&Format::pretty());
        stack.push();
        stack.set_text_mode(TextMode::Preserve);
        stack.push();
        stack.set_text_mode(TextMode::Trim);
        assert_eq!(stack.indent(), Some("    "));
        assert_eq!(stack.pad_last(), Some("\n  "));
        stack.push();
        assert_eq!(stack.indent(), Some("      "));
    }

    #[test]
    fn test_escape_override_is_scoped() {
        let mut stack = FormatStack::new(&Format::raw());
        stack.push();
        stack.set_escape_output(false);
        stack.push();
        assert!(!stack.escape_output());
        stack.pop();
        stack.pop();
        assert!(stack.escape_output());
    }

    #[test]
    fn test_pop_never_removes_base() {
        let mut stack = FormatStack::new(&Format::raw());
        stack.pop();
        stack.pop();
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.text_mode(), TextMode::Preserve);
    }
}
