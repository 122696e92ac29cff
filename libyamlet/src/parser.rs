//! Line-by-line driver.
//!
//! Each line is tokenized, the block stack is unwound to the line's
//! indentation, and the tokens are scanned left to right for sequence
//! markers (`- `), map keys (`key: `) and scalar values. Several markers on
//! one line (`- - 1`, `- a: b: 1`) nest at the columns where they appear.

use log::debug;
use serde_json::Value;

use crate::error::{ParseContext, Result};
use crate::state::State;
use crate::tokenizer::{
    clean_tokens, count_indent, get_indent, is_whitespace, read_value, tokenize, unquote, Scalar,
};

/// Parse a whole document.
pub fn parse_document(source: &str, ctx: &ParseContext) -> Result<Value> {
    let mut state = State::new(source, ctx);
    while let Some((start, end)) = state.next_line() {
        parse_line(&mut state, source, start, end)?;
    }
    debug!("parsed {} lines", state.line());
    state.pop_to_top()
}

fn parse_line(state: &mut State<'_>, source: &str, start: usize, end: usize) -> Result<()> {
    let line = &source[start..end];
    if state.in_scalar() && state.read_text_line(line, count_indent(line)) {
        return Ok(());
    }

    let tokens = tokenize(source, start, end).map_err(|err| state.locate(err))?;
    let indent = get_indent(&tokens);
    let tokens = clean_tokens(&tokens);
    if tokens.is_empty() {
        return Ok(());
    }

    state.pop_to_level(indent)?;
    scan_tokens(state, tokens, indent)
}

/// Scan the cleaned tokens of a line that starts at column `indent`.
fn scan_tokens(state: &mut State<'_>, tokens: &[String], indent: usize) -> Result<()> {
    let mut pending: Vec<&str> = Vec::new();
    let mut pending_col = indent;
    let mut col = indent;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_str();
        let width = token.chars().count();
        let separated = tokens.get(i + 1).map_or(true, |next| is_whitespace(next));

        if pending.is_empty() && token == "-" && separated {
            state.start_list(col)?;
            (i, col) = skip_separator(tokens, i + 1, col + width);
            continue;
        }

        if pending.len() == 1 && token == ":" && separated {
            state.start_map(unquote(pending[0]), pending_col)?;
            pending.clear();
            (i, col) = skip_separator(tokens, i + 1, col + width);
            continue;
        }

        if pending.is_empty() {
            pending_col = col;
        }
        pending.push(token);
        col += width;
        i += 1;
    }

    if pending.is_empty() {
        return Ok(());
    }
    match read_value(&pending.concat()).map_err(|err| state.locate(err))? {
        Scalar::Block(header) => state.start_scalar(header),
        Scalar::Node(node) => state.consume_node(node.into_value()),
    }
}

/// Step over the whitespace token after a marker, if there is one.
fn skip_separator(tokens: &[String], i: usize, col: usize) -> (usize, usize) {
    match tokens.get(i) {
        Some(token) if is_whitespace(token) => (i + 1, col + token.chars().count()),
        _ => (i, col),
    }
}
