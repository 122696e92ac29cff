//! Block stack and indentation engine.
//!
//! The stack always holds at least the root sentinel, a sequence at
//! column -1 that receives the document's single root value. Every other
//! block is opened by the parser and closed when a line dedents past it,
//! at which point its value is handed to the block underneath.

use log::trace;
use serde_json::{Map, Value};

use crate::block::{Block, BlockHeader, ScalarSpan};
use crate::error::{ErrorKind, ParseContext, ParseError, Result};

/// Parse session state.
pub struct State<'a> {
    stack: Vec<Block>,
    /// Map keys waiting for their value, with the column they appeared at.
    fields: Vec<(isize, String)>,
    ctx: &'a ParseContext,
    source: &'a str,
    line_starts: Vec<usize>,
    /// 1-based number of the current line; 0 before the first.
    line: usize,
    current: (usize, usize),
}

impl<'a> State<'a> {
    pub fn new(source: &'a str, ctx: &'a ParseContext) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            stack: vec![Block::sequence(-1)],
            fields: Vec::new(),
            ctx,
            source,
            line_starts,
            line: 0,
            current: (0, 0),
        }
    }

    /// Advance to the next source line and return its byte range, without
    /// the line terminator.
    pub fn next_line(&mut self) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(self.line)?;
        let mut end = self
            .line_starts
            .get(self.line + 1)
            .map_or(self.source.len(), |next| next - 1);
        if self.source[start..end].ends_with('\r') {
            end -= 1;
        }
        self.line += 1;
        self.current = (start, end);
        Some((start, end))
    }

    /// 1-based number of the current line.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Text of the current line.
    pub fn line_text(&self) -> &'a str {
        &self.source[self.current.0..self.current.1]
    }

    /// Build an error located at the current line.
    pub fn error(&self, kind: ErrorKind) -> ParseError {
        self.locate(ParseError::new(kind))
    }

    pub fn error_with(&self, kind: ErrorKind, detail: impl std::fmt::Display) -> ParseError {
        self.locate(ParseError::with_detail(kind, detail))
    }

    /// Attach the current line to an error that has no location yet.
    pub fn locate(&self, err: ParseError) -> ParseError {
        if err.has_location() || self.line == 0 {
            return err;
        }
        err.with_location(self.ctx, self.line, self.line_text())
    }

    fn active(&self) -> &Block {
        &self.stack[self.stack.len() - 1]
    }

    /// Whether a block scalar is collecting lines.
    pub fn in_scalar(&self) -> bool {
        matches!(self.active(), Block::ScalarSpan(_))
    }

    /// Close blocks until the active one is indented no deeper than `indent`.
    pub fn pop_to_level(&mut self, indent: usize) -> Result<()> {
        let target = indent as isize;
        let mut popped = false;
        while self.active().indent() > target {
            if self.stack.len() == 1 {
                return Err(self.error(ErrorKind::InvalidIndentation));
            }
            self.end_block()?;
            popped = true;
        }
        if popped && self.active().indent() < target {
            return Err(self.error_with(
                ErrorKind::InvalidIndentation,
                format!(
                    "column {} does not match any open block (nearest is at column {})",
                    target,
                    self.active().indent().max(0)
                ),
            ));
        }
        Ok(())
    }

    /// Close every block and return the document value.
    ///
    /// A document with no content yields an empty mapping.
    pub fn pop_to_top(mut self) -> Result<Value> {
        while self.stack.len() > 1 {
            self.end_block()?;
        }
        match self.stack.pop() {
            Some(Block::Sequence { items, .. }) => Ok(items
                .into_iter()
                .next()
                .unwrap_or_else(|| Value::Object(Map::new()))),
            _ => Err(self.error(ErrorKind::InvalidIndentation)),
        }
    }

    /// Record a map key waiting for its value.
    ///
    /// A waiting key at the same column is replaced rather than stacked.
    pub fn nest_field(&mut self, name: String, indent: isize) {
        trace!("key {:?} at column {}", name, indent);
        match self.fields.last_mut() {
            Some((field_indent, field)) if *field_indent == indent => *field = name,
            _ => self.fields.push((indent, name)),
        }
    }

    pub fn start_block(&mut self, block: Block) -> Result<()> {
        if self.in_scalar() {
            return Err(self.error(ErrorKind::CannotNest));
        }
        trace!("open {} at column {}", block.kind_name(), block.indent());
        self.stack.push(block);
        Ok(())
    }

    /// Close the active block and hand its value to the block below.
    pub fn end_block(&mut self) -> Result<()> {
        if self.stack.len() > 1 {
            if let Some(mut block) = self.stack.pop() {
                trace!("close {} at column {}", block.kind_name(), block.indent());
                if matches!(block, Block::Mapping { .. }) {
                    self.settle_fields(&mut block);
                }
                return self.consume_node(block.into_value());
            }
        }
        Err(self.error(ErrorKind::InvalidIndentation))
    }

    /// Drop the keys still waiting in a closing mapping; its own key gets null.
    fn settle_fields(&mut self, mapping: &mut Block) {
        let indent = mapping.indent();
        while self.fields.last().is_some_and(|(field_indent, _)| *field_indent >= indent) {
            let Some((field_indent, name)) = self.fields.pop() else {
                break;
            };
            if field_indent == indent {
                trace!("key {:?} has no value", name);
                mapping.absorb(Some(name), Value::Null);
            }
        }
    }

    /// Give a completed value to the active block.
    pub fn consume_node(&mut self, value: Value) -> Result<()> {
        let key = match self.active() {
            Block::Mapping { indent, .. } => {
                let indent = *indent;
                Some(self.take_field(indent)?)
            }
            Block::Sequence { items, .. } if self.stack.len() == 1 && !items.is_empty() => {
                return Err(self.error_with(
                    ErrorKind::ExtraContent,
                    "a document holds a single root value",
                ));
            }
            Block::Sequence { .. } => None,
            Block::ScalarSpan(_) => return Err(self.error(ErrorKind::CannotNest)),
        };
        let top = self.stack.len() - 1;
        self.stack[top].absorb(key, value);
        Ok(())
    }

    fn take_field(&mut self, indent: isize) -> Result<String> {
        match self.fields.pop() {
            Some((field_indent, name)) if field_indent == indent => Ok(name),
            Some((field_indent, name)) => Err(self.error_with(
                ErrorKind::IncorrectNesting,
                format!(
                    "key {:?} at column {} does not belong to the mapping at column {}",
                    name, field_indent, indent
                ),
            )),
            None => Err(self.error_with(
                ErrorKind::IncorrectNesting,
                format!("no key is waiting for a value in the mapping at column {}", indent),
            )),
        }
    }

    /// Open a sequence at `indent` unless one is already active there.
    pub fn start_list(&mut self, indent: usize) -> Result<()> {
        let indent = indent as isize;
        match self.active() {
            Block::Sequence { indent: open, .. } if *open == indent => Ok(()),
            Block::Mapping { indent: open, .. } if *open == indent => {
                Err(self.error(ErrorKind::InvalidMixing))
            }
            _ => self.start_block(Block::sequence(indent)),
        }
    }

    /// Record `name` as a key and open a mapping at `indent` if needed.
    pub fn start_map(&mut self, name: String, indent: usize) -> Result<()> {
        let indent = indent as isize;
        match self.active() {
            Block::Mapping { indent: open, .. } if *open == indent => {}
            Block::Sequence { indent: open, .. } if *open == indent => {
                return Err(self.error(ErrorKind::InvalidMixing));
            }
            _ => self.start_block(Block::mapping(indent))?,
        }
        self.nest_field(name, indent);
        Ok(())
    }

    /// Open a block scalar inside the active block.
    pub fn start_scalar(&mut self, header: BlockHeader) -> Result<()> {
        let parent = self.active().indent();
        self.start_block(Block::ScalarSpan(ScalarSpan::new(header, parent)))
    }

    /// Offer a raw line to the active block scalar.
    ///
    /// Returns `false` if no block scalar is active or the line is less
    /// indented than its content.
    pub fn read_text_line(&mut self, line: &str, indent: usize) -> bool {
        match self.stack.last_mut() {
            Some(Block::ScalarSpan(span)) => span.read_line(line, indent),
            _ => false,
        }
    }
}
