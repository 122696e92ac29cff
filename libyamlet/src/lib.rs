//! Parser for yamlet, an indentation-structured configuration format.
//!
//! yamlet is a practical subset of YAML: block sequences (`- item`), block
//! mappings (`key: value`), quoted and bare scalars, inline JSON-style
//! literals (`[1, 2]`, `{a: b}`), `#` comments, and block scalars
//! (`|` literal, `>` folded).
//!
//! # Parsing Pipeline
//!
//! Parsing is a single pass over the source lines:
//!
//! 1. **Tokenizer**: splits each line into whitespace runs, quoted strings,
//!    JSON literals, `-`/`:` markers and words, and classifies a run of
//!    tokens into a scalar.
//!
//! 2. **State**: keeps a stack of open blocks (sequence, mapping, block
//!    scalar) and closes them as lines dedent.
//!
//! 3. **Parser**: scans each line's tokens for sequence markers, map keys
//!    and values, and drives the state.
//!
//! The result is a [`serde_json::Value`] whose maps keep source order.

mod block;
mod error;
mod node;
mod parser;
mod state;
pub mod tokenizer;

use log::debug;
use serde::de::DeserializeOwned;

pub use block::{BlockHeader, Chomping, ScalarStyle};
pub use error::{ErrorKind, ParseContext, ParseError, Result};
pub use node::Node;
pub use serde_json::{Map, Value};

/// Parse a yamlet document from a string.
///
/// # Example
///
/// ```
/// use libyamlet::parse;
///
/// let value = parse("name: demo\nports:\n  - 80\n  - 443").unwrap();
/// assert_eq!(value["ports"][1], 443);
/// ```
pub fn parse(input: &str) -> Result<Value> {
    parse_with_filename(input, None)
}

/// Parse a yamlet document from a string with a filename for error messages.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Value> {
    let ctx = ParseContext::new(filename);
    debug!(
        "parsing {} ({} bytes)",
        filename.unwrap_or("<input>"),
        input.len()
    );
    parser::parse_document(input, &ctx)
}

/// Parse a yamlet document and deserialize it into `T`.
///
/// # Example
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// let server: Server = libyamlet::from_str("host: localhost\nport: 8080").unwrap();
/// assert_eq!(server.port, 8080);
/// ```
pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    let value = parse(input)?;
    serde_json::from_value(value)
        .map_err(|err| ParseError::with_detail(ErrorKind::Deserialize, err))
}
