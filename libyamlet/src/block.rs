//! Containers that stay open while their children are parsed.
//!
//! A [`Block`] is either a sequence, a mapping, or a [`ScalarSpan`]
//! collecting the text lines of a `|` or `>` block scalar. Indents are
//! `isize` so the root sentinel can sit at column -1.

use serde_json::{Map, Value};

/// How the lines of a block scalar are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    /// `|`: newlines are kept.
    Literal,
    /// `>`: single newlines become spaces.
    Folded,
}

/// Treatment of the trailing newlines of a block scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chomping {
    /// Default: trailing blank lines dropped; a literal keeps one final newline.
    #[default]
    Clip,
    /// `-`: no trailing newline at all.
    Strip,
    /// `+`: every trailing newline kept.
    Keep,
}

/// The indicator that opens a block scalar, e.g. `|`, `>-`, `|2+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub style: ScalarStyle,
    pub chomping: Chomping,
    /// Explicit content indentation, relative to the enclosing block.
    pub indent: Option<usize>,
}

impl BlockHeader {
    /// Parse a header token. Returns `None` if the token is not a header.
    pub fn parse(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        let style = match chars.next()? {
            '|' => ScalarStyle::Literal,
            '>' => ScalarStyle::Folded,
            _ => return None,
        };
        let mut header = BlockHeader {
            style,
            chomping: Chomping::Clip,
            indent: None,
        };
        for c in chars {
            match c {
                '-' if header.chomping == Chomping::Clip => header.chomping = Chomping::Strip,
                '+' if header.chomping == Chomping::Clip => header.chomping = Chomping::Keep,
                '1'..='9' if header.indent.is_none() => header.indent = c.to_digit(10).map(|d| d as usize),
                _ => return None,
            }
        }
        Some(header)
    }
}

/// Text lines of a block scalar being collected.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSpan {
    indent: isize,
    fixed: bool,
    style: ScalarStyle,
    chomping: Chomping,
    lines: Vec<String>,
}

impl ScalarSpan {
    /// Open a span whose enclosing block sits at `parent_indent`.
    pub fn new(header: BlockHeader, parent_indent: isize) -> Self {
        let (indent, fixed) = match header.indent {
            Some(n) => (parent_indent.max(0) + n as isize, true),
            None => (parent_indent + 1, false),
        };
        Self {
            indent,
            fixed,
            style: header.style,
            chomping: header.chomping,
            lines: Vec::new(),
        }
    }

    /// Content column, or the minimum acceptable column before it is fixed.
    pub fn indent(&self) -> isize {
        self.indent
    }

    pub fn style(&self) -> ScalarStyle {
        self.style
    }

    /// Offer a raw source line whose leading whitespace is `indent` wide.
    ///
    /// Returns `false` when the line is less indented than the span and so
    /// belongs to the enclosing structure. Blank lines are always taken.
    pub fn read_line(&mut self, line: &str, indent: usize) -> bool {
        if line.trim().is_empty() {
            self.lines.push(String::new());
            return true;
        }
        let indent = indent as isize;
        if indent < self.indent {
            return false;
        }
        if !self.fixed {
            self.indent = indent;
            self.fixed = true;
        }
        let skip = self.indent.max(0) as usize;
        let text = line
            .char_indices()
            .nth(skip)
            .map_or("", |(offset, _)| &line[offset..]);
        self.lines.push(text.to_string());
        true
    }

    /// Join the collected lines into the final string.
    pub fn finish(self) -> String {
        let content_len = self
            .lines
            .iter()
            .rposition(|l| !l.is_empty())
            .map_or(0, |i| i + 1);
        let trailing = self.lines.len() - content_len;
        let content = &self.lines[..content_len];

        let body = match self.style {
            ScalarStyle::Literal => content.join("\n"),
            ScalarStyle::Folded => fold(content),
        };

        match (self.chomping, self.style) {
            (Chomping::Keep, _) => {
                let newlines = if body.is_empty() { trailing } else { trailing + 1 };
                body + &"\n".repeat(newlines)
            }
            (Chomping::Clip, ScalarStyle::Literal) => {
                let mut body = body.trim_end().to_string();
                if !body.is_empty() {
                    body.push('\n');
                }
                body
            }
            _ => body.trim_end().to_string(),
        }
    }
}

/// Fold lines: a single line break becomes a space, a blank line becomes a
/// newline, and more-indented lines keep their breaks.
fn fold(lines: &[String]) -> String {
    let mut out = String::new();
    let mut prev_indented = false;
    for line in lines {
        if line.is_empty() {
            out.push('\n');
            continue;
        }
        let indented = line.starts_with([' ', '\t']);
        if !out.is_empty() && !out.ends_with('\n') {
            out.push(if indented || prev_indented { '\n' } else { ' ' });
        }
        out.push_str(line);
        prev_indented = indented;
    }
    out
}

/// An open container.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Sequence { indent: isize, items: Vec<Value> },
    Mapping { indent: isize, entries: Map<String, Value> },
    ScalarSpan(ScalarSpan),
}

impl Block {
    pub fn sequence(indent: isize) -> Self {
        Block::Sequence {
            indent,
            items: Vec::new(),
        }
    }

    pub fn mapping(indent: isize) -> Self {
        Block::Mapping {
            indent,
            entries: Map::new(),
        }
    }

    pub fn indent(&self) -> isize {
        match self {
            Block::Sequence { indent, .. } | Block::Mapping { indent, .. } => *indent,
            Block::ScalarSpan(span) => span.indent(),
        }
    }

    /// Short name used in log output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Sequence { .. } => "sequence",
            Block::Mapping { .. } => "mapping",
            Block::ScalarSpan(span) => match span.style() {
                ScalarStyle::Literal => "literal scalar",
                ScalarStyle::Folded => "folded scalar",
            },
        }
    }

    /// Add a completed child value.
    ///
    /// Sequences append and ignore `key`. Mappings insert under `key`,
    /// replacing an earlier entry with the same key. Scalar spans take no
    /// children; the caller rejects that case before getting here.
    pub fn absorb(&mut self, key: Option<String>, value: Value) {
        match self {
            Block::Sequence { items, .. } => items.push(value),
            Block::Mapping { entries, .. } => {
                debug_assert!(key.is_some(), "mapping child without a key");
                if let Some(key) = key {
                    entries.insert(key, value);
                }
            }
            Block::ScalarSpan(_) => {}
        }
    }

    /// Close the block and produce its value.
    pub fn into_value(self) -> Value {
        match self {
            Block::Sequence { items, .. } => Value::Array(items),
            Block::Mapping { entries, .. } => Value::Object(entries),
            Block::ScalarSpan(span) => Value::String(span.finish()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn span(token: &str, parent: isize, lines: &[&str]) -> ScalarSpan {
        let mut span = ScalarSpan::new(BlockHeader::parse(token).unwrap(), parent);
        for line in lines {
            let indent = line.len() - line.trim_start().len();
            assert!(span.read_line(line, indent), "line rejected: {:?}", line);
        }
        span
    }

    #[test]
    fn test_parse_header() {
        let h = BlockHeader::parse("|").unwrap();
        assert_eq!(h.style, ScalarStyle::Literal);
        assert_eq!(h.chomping, Chomping::Clip);
        assert_eq!(h.indent, None);

        let h = BlockHeader::parse(">-").unwrap();
        assert_eq!(h.style, ScalarStyle::Folded);
        assert_eq!(h.chomping, Chomping::Strip);

        let h = BlockHeader::parse("|2+").unwrap();
        assert_eq!(h.chomping, Chomping::Keep);
        assert_eq!(h.indent, Some(2));

        assert_eq!(BlockHeader::parse("|+2").unwrap().indent, Some(2));
        assert!(BlockHeader::parse("|x").is_none());
        assert!(BlockHeader::parse("|--").is_none());
        assert!(BlockHeader::parse("| text").is_none());
        assert!(BlockHeader::parse("a").is_none());
    }

    #[test]
    fn test_literal_clip() {
        let s = span("|", 0, &["  line one", "  line two", ""]);
        assert_eq!(s.finish(), "line one\nline two\n");
    }

    #[test]
    fn test_folded_clip() {
        let s = span(">", 0, &["  line one", "  line two", ""]);
        assert_eq!(s.finish(), "line one line two");
    }

    #[test]
    fn test_folded_blank_line_keeps_newline() {
        let s = span(">", 0, &["  a", "  b", "", "  c"]);
        assert_eq!(s.finish(), "a b\nc");
    }

    #[test]
    fn test_folded_more_indented_lines() {
        let s = span(">", 0, &["  a", "    code", "  b"]);
        assert_eq!(s.finish(), "a\n  code\nb");
    }

    #[test]
    fn test_literal_keeps_extra_indent() {
        let s = span("|", 0, &["  a", "    b", "  c"]);
        assert_eq!(s.finish(), "a\n  b\nc\n");
    }

    #[test]
    fn test_strip_and_keep() {
        assert_eq!(span("|-", 0, &["  a", ""]).finish(), "a");
        assert_eq!(span("|+", 0, &["  a", "", ""]).finish(), "a\n\n\n");
        assert_eq!(span(">+", 0, &["  a", "  b"]).finish(), "a b\n");
    }

    #[test]
    fn test_explicit_indent() {
        let s = span("|2", 0, &["    deep", "  shallow"]);
        assert_eq!(s.finish(), "  deep\nshallow\n");
    }

    #[test]
    fn test_less_indented_line_is_rejected() {
        let mut s = span("|", 0, &["    a"]);
        assert!(!s.read_line("  b", 2));
        assert!(s.read_line("", 0));
        assert_eq!(s.indent(), 4);
    }

    #[test]
    fn test_first_line_must_clear_parent() {
        let mut s = ScalarSpan::new(BlockHeader::parse("|").unwrap(), 2);
        assert!(!s.read_line("  b: 1", 2));
        assert!(s.read_line("   text", 3));
        assert_eq!(s.finish(), "text\n");
    }

    #[test]
    fn test_empty_span() {
        assert_eq!(span("|", 0, &[]).finish(), "");
        assert_eq!(span(">", 0, &["", ""]).finish(), "");
    }

    #[test]
    fn test_absorb() {
        let mut seq = Block::sequence(0);
        seq.absorb(None, json!(1));
        seq.absorb(None, json!("two"));
        assert_eq!(seq.into_value(), json!([1, "two"]));

        let mut map = Block::mapping(0);
        map.absorb(Some("a".into()), json!(1));
        map.absorb(Some("b".into()), json!(2));
        map.absorb(Some("a".into()), json!(3));
        let value = map.into_value();
        assert_eq!(value, json!({"a": 3, "b": 2}));
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn test_indent_and_kind() {
        assert_eq!(Block::sequence(-1).indent(), -1);
        assert_eq!(Block::mapping(4).kind_name(), "mapping");
        let span = ScalarSpan::new(BlockHeader::parse(">").unwrap(), 2);
        let block = Block::ScalarSpan(span);
        assert_eq!(block.indent(), 3);
        assert_eq!(block.kind_name(), "folded scalar");
    }
}
