//! Line tokenizer and scalar classification.
//!
//! [`tokenize`] splits one source line into raw token strings:
//! - whitespace runs (the leading one is the indentation)
//! - quoted strings, kept with their quotes
//! - `{...}` / `[...]` literals, rewritten into valid JSON
//! - the control characters `-` and `:` when followed by whitespace or the
//!   end of the line
//! - bare words
//! - a trailing `#` comment
//!
//! [`read_value`] turns a joined run of tokens into a [`Node`], or reports
//! that the run opens a block scalar.

use serde_json::{Number, Value};

use crate::block::BlockHeader;
use crate::error::{ErrorKind, ParseError, Result};
use crate::node::Node;

/// Outcome of classifying a token run.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A complete scalar value.
    Node(Node),
    /// `|` or `>`: the value is the block scalar on the following lines.
    Block(BlockHeader),
}

/// Tokenize `text[start..end]`, which must be a single line.
///
/// `{` and `[` open a literal only where a value starts; inside plain text
/// they stay part of the words around them.
///
/// # Panics
///
/// Panics if `start..end` is out of bounds for `text` or does not fall on
/// `char` boundaries.
pub fn tokenize(text: &str, start: usize, end: usize) -> Result<Vec<String>> {
    let line = &text[start..end];
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();

    if is_document_marker(line) {
        let indent = scan_whitespace(bytes, 0);
        if indent > 0 {
            tokens.push(line[..indent].to_string());
        }
        return Ok(tokens);
    }

    let mut pos = 0;
    // Whether the next word starts a value: line start or after `-`/`:`.
    let mut value_start = true;
    while pos < bytes.len() {
        let next = match bytes[pos] {
            b' ' | b'\t' => {
                let next = scan_whitespace(bytes, pos);
                tokens.push(line[pos..next].to_string());
                pos = next;
                continue;
            }
            b'#' => bytes.len(),
            b'"' | b'\'' => scan_quoted(bytes, pos)?,
            b'{' | b'[' if value_start => {
                let (literal, next) = scan_literal(line, pos)?;
                tokens.push(literal);
                pos = next;
                value_start = false;
                continue;
            }
            b'-' | b':' if is_separator(bytes, pos + 1) => {
                tokens.push(line[pos..pos + 1].to_string());
                pos += 1;
                value_start = true;
                continue;
            }
            _ => scan_word(bytes, pos),
        };
        tokens.push(line[pos..next].to_string());
        pos = next;
        value_start = false;
    }

    Ok(tokens)
}

/// Tokenize a whole line.
pub fn tokenize_line(line: &str) -> Result<Vec<String>> {
    tokenize(line, 0, line.len())
}

/// Width of the leading indentation token, or 0.
pub fn get_indent(tokens: &[String]) -> usize {
    match tokens.first() {
        Some(first) if is_whitespace(first) => first.chars().count(),
        _ => 0,
    }
}

/// Drop the indentation token and any trailing comment or whitespace.
pub fn clean_tokens(tokens: &[String]) -> &[String] {
    let start = usize::from(tokens.first().is_some_and(|t| is_whitespace(t)));
    let mut end = tokens.len();
    while end > start && (is_whitespace(&tokens[end - 1]) || is_comment(&tokens[end - 1])) {
        end -= 1;
    }
    &tokens[start..end]
}

/// Count the leading whitespace characters of a raw line.
pub fn count_indent(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// Whether a token is a whitespace run.
pub fn is_whitespace(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b == b' ' || b == b'\t')
}

/// Whether a token is a comment.
pub fn is_comment(token: &str) -> bool {
    token.starts_with('#')
}

/// Classify a joined token run.
pub fn read_value(token: &str) -> Result<Scalar> {
    if token.starts_with(['{', '[']) {
        return serde_json::from_str::<Value>(token)
            .map(|value| Scalar::Node(Node::Json(value)))
            .map_err(|err| ParseError::with_detail(ErrorKind::InvalidJson, err));
    }

    if token.starts_with(['|', '>']) {
        if let Some(header) = BlockHeader::parse(token) {
            return Ok(Scalar::Block(header));
        }
    }

    Ok(Scalar::Node(classify(token)))
}

/// Classify a scalar that is neither a JSON literal nor a block header.
fn classify(token: &str) -> Node {
    if let Some(b) = parse_boolean(token) {
        return Node::Boolean(b);
    }
    if token == "~" || token.eq_ignore_ascii_case("null") {
        return Node::Null;
    }
    if is_number(token) {
        if let Some(n) = parse_number(token) {
            return Node::Number(n);
        }
    }
    Node::Text(unquote(token))
}

fn parse_boolean(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "yes" | "on" | "true" => Some(true),
        "no" | "off" | "false" => Some(false),
        _ => None,
    }
}

/// Check the number grammar `-?\d*\.?\d+`.
fn is_number(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match digits.split_once('.') {
        Some((int, frac)) => all_digits(int) && !frac.is_empty() && all_digits(frac),
        None => !digits.is_empty() && all_digits(digits),
    }
}

fn parse_number(token: &str) -> Option<Number> {
    if !token.contains('.') {
        if let Ok(n) = token.parse::<i64>() {
            return Some(n.into());
        }
    }
    token.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Strip matching surrounding quotes and resolve escaped quote characters.
///
/// Inside quotes, `\"` or `\'` stands for the quote itself; in single
/// quotes a doubled `''` does too. Unquoted text is returned unchanged.
pub fn unquote(token: &str) -> String {
    let quote = match token.chars().next() {
        Some(q @ ('"' | '\'')) if token.len() >= 2 && token.ends_with(q) => q,
        _ => return token.to_string(),
    };
    let inner = &token[1..token.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if (c == '\\' || (c == '\'' && quote == '\'')) && chars.peek() == Some(&quote) {
            chars.next();
            out.push(quote);
        } else {
            out.push(c);
        }
    }
    out
}

fn is_document_marker(line: &str) -> bool {
    let trimmed = line.trim();
    match trimmed
        .strip_prefix("---")
        .or_else(|| trimmed.strip_prefix("..."))
    {
        Some(rest) => {
            rest.is_empty() || (rest.starts_with([' ', '\t']) && rest.trim_start().starts_with('#'))
        }
        None => false,
    }
}

/// Whether position `i` is whitespace or past the end.
fn is_separator(bytes: &[u8], i: usize) -> bool {
    i >= bytes.len() || bytes[i] == b' ' || bytes[i] == b'\t'
}

fn scan_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
        pos += 1;
    }
    pos
}

/// Scan a bare word: up to whitespace, or a `:` that ends a key.
fn scan_word(bytes: &[u8], start: usize) -> usize {
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b' ' | b'\t' => break,
            b':' if is_separator(bytes, pos + 1) => break,
            _ => pos += 1,
        }
    }
    pos
}

/// Scan a quoted string starting at `start`; returns the end past the
/// closing quote.
fn scan_quoted(bytes: &[u8], start: usize) -> Result<usize> {
    let quote = bytes[start];
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'\'' if quote == b'\'' && bytes.get(pos + 1) == Some(&b'\'') => pos += 2,
            b if b == quote => return Ok(pos + 1),
            _ => pos += 1,
        }
    }
    Err(ParseError::new(ErrorKind::UnterminatedString))
}

/// Scan a bracketed literal and rewrite it into JSON.
///
/// Bare words that are not JSON numbers or keywords get quoted, and
/// single-quoted strings become double-quoted. Strings do not count toward
/// bracket depth.
fn scan_literal(line: &str, start: usize) -> Result<(String, usize)> {
    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len() - start);
    let mut closers: Vec<u8> = Vec::new();
    let mut pos = start;

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => {
                closers.push(b'}');
                out.push('{');
                pos += 1;
            }
            b'[' => {
                closers.push(b']');
                out.push('[');
                pos += 1;
            }
            close @ (b'}' | b']') => {
                if closers.pop() != Some(close) {
                    return Err(ParseError::with_detail(
                        ErrorKind::InvalidJson,
                        format!("unexpected '{}'", close as char),
                    ));
                }
                out.push(close as char);
                pos += 1;
                if closers.is_empty() {
                    return Ok((out, pos));
                }
            }
            quote @ (b'"' | b'\'') => {
                let end = scan_quoted(bytes, pos).map_err(|_| {
                    ParseError::with_detail(ErrorKind::InvalidJson, "unterminated string")
                })?;
                if quote == b'"' {
                    out.push_str(&line[pos..end]);
                } else {
                    out.push_str(&requote(&line[pos + 1..end - 1]));
                }
                pos = end;
            }
            b @ (b',' | b':' | b' ' | b'\t') => {
                out.push(b as char);
                pos += 1;
            }
            _ => {
                let end = scan_bare(bytes, pos);
                let word = &line[pos..end];
                if is_json_number(word) || matches!(word, "true" | "false" | "null") {
                    out.push_str(word);
                } else {
                    out.push_str(&Value::String(word.to_string()).to_string());
                }
                pos = end;
            }
        }
    }

    Err(ParseError::with_detail(
        ErrorKind::InvalidJson,
        "unbalanced brackets",
    ))
}

fn scan_bare(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len()
        && !matches!(
            bytes[pos],
            b'{' | b'}' | b'[' | b']' | b',' | b':' | b'"' | b'\'' | b' ' | b'\t'
        )
    {
        pos += 1;
    }
    pos
}

/// Turn the body of a single-quoted string into a double-quoted one.
fn requote(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len() + 2);
    out.push('"');
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' | '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                out.push('\'');
            }
            '\\' => {
                out.push('\\');
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Check the JSON number grammar.
fn is_json_number(word: &str) -> bool {
    let s = word.strip_prefix('-').unwrap_or(word);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    let (int, frac) = match mantissa.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (mantissa, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let int_ok = digits(int) && (int == "0" || !int.starts_with('0'));
    let frac_ok = frac.map_or(true, digits);
    let exp_ok = exponent.map_or(true, |e| {
        digits(e.strip_prefix(['+', '-']).unwrap_or(e))
    });
    int_ok && frac_ok && exp_ok
}
