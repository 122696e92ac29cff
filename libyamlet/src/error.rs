//! Error types for yamlet parsing.

use std::fmt;

use thiserror::Error;

/// Result type for yamlet parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self, line: usize, text: &str) -> String {
        match &self.filename {
            Some(name) => format!(" at line {} of <{}>: {}", line, name, text.trim()),
            None => format!(" at line {}: {}", line, text.trim()),
        }
    }
}

/// The reason a parse failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A quote was opened but never closed on the same line.
    #[error("Unterminated string")]
    UnterminatedString,

    /// A bracketed literal has unbalanced delimiters or is not valid JSON.
    #[error("Invalid JSON literal")]
    InvalidJson,

    /// List items and map keys claim the same indentation level.
    #[error("Cannot mix list items and map keys at the same indentation")]
    InvalidMixing,

    /// Structure was opened while a block scalar is collecting text.
    #[error("Cannot nest inside a block scalar")]
    CannotNest,

    /// The line dedents to a column no open block owns.
    #[error("Invalid indentation")]
    InvalidIndentation,

    /// A value is ready for a mapping that has no matching pending key.
    #[error("Incorrect nesting")]
    IncorrectNesting,

    /// A second value appeared at the document root.
    #[error("Unexpected extra content")]
    ExtraContent,

    /// The parsed value does not fit the requested Rust type.
    #[error("Cannot deserialize value")]
    Deserialize,
}

/// Error type for yamlet parsing.
///
/// `line` is 1-based. Errors that are not tied to a source line (such as
/// [`ErrorKind::Deserialize`]) carry line 0 and an empty `line_text`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}{suffix}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
    pub line_text: String,
    suffix: String,
}

impl ParseError {
    /// Create an error whose message is the kind's description.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.to_string(),
            line: 0,
            line_text: String::new(),
            suffix: String::new(),
        }
    }

    /// Create an error with extra detail appended to the kind's description.
    pub fn with_detail(kind: ErrorKind, detail: impl fmt::Display) -> Self {
        Self {
            message: format!("{}: {}", kind, detail),
            ..Self::new(kind)
        }
    }

    /// Attach the offending source line.
    pub fn with_location(self, ctx: &ParseContext, line: usize, text: &str) -> Self {
        Self {
            line,
            line_text: text.to_string(),
            suffix: ctx.loc_suffix(line, text),
            ..self
        }
    }

    /// Whether a source line has been attached.
    pub fn has_location(&self) -> bool {
        self.line > 0
    }
}

impl From<ErrorKind> for ParseError {
    fn from(kind: ErrorKind) -> Self {
        ParseError::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_location() {
        let err = ParseError::new(ErrorKind::InvalidMixing);
        assert_eq!(
            err.to_string(),
            "Cannot mix list items and map keys at the same indentation"
        );
        assert!(!err.has_location());
    }

    #[test]
    fn test_display_with_location() {
        let ctx = ParseContext::new(None);
        let err = ParseError::new(ErrorKind::UnterminatedString).with_location(&ctx, 3, "  a: \"b");
        assert_eq!(err.line, 3);
        assert_eq!(err.line_text, "  a: \"b");
        assert_eq!(err.to_string(), "Unterminated string at line 3: a: \"b");
    }

    #[test]
    fn test_display_with_filename() {
        let ctx = ParseContext::new(Some("config.yaml"));
        let err = ParseError::with_detail(ErrorKind::InvalidJson, "unbalanced brackets")
            .with_location(&ctx, 7, "x: [1");
        assert_eq!(
            err.to_string(),
            "Invalid JSON literal: unbalanced brackets at line 7 of <config.yaml>: x: [1"
        );
    }
}
