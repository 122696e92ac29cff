//! Classified scalar values.

use serde_json::{Number, Value};

/// A scalar produced by classifying a run of tokens.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Plain or quoted text, with quotes and quote escapes resolved.
    Text(String),
    /// Numeric literal. Whole numbers that fit in `i64` stay integral.
    Number(Number),
    /// yes/no/on/off/true/false in any case.
    Boolean(bool),
    /// `null` in any case, or `~`.
    Null,
    /// Value of an inline `{...}` or `[...]` literal.
    Json(Value),
}

impl Node {
    /// Returns `true` if this node is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Returns the boolean if this is a `Boolean`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number as `f64` if this is a `Number`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Returns a reference to the text if this is a `Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert into the value tree representation.
    pub fn into_value(self) -> Value {
        match self {
            Node::Text(s) => Value::String(s),
            Node::Number(n) => Value::Number(n),
            Node::Boolean(b) => Value::Bool(b),
            Node::Null => Value::Null,
            Node::Json(v) => v,
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        node.into_value()
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Boolean(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(n.into())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Text(s)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        assert!(Node::Null.is_null());
        assert_eq!(Node::from(true).as_bool(), Some(true));
        assert_eq!(Node::from(7).as_f64(), Some(7.0));
        assert_eq!(Node::from("hi").as_str(), Some("hi"));
        assert_eq!(Node::from("hi").as_bool(), None);
    }

    #[test]
    fn test_into_value() {
        assert_eq!(Node::from("a").into_value(), json!("a"));
        assert_eq!(Node::from(42).into_value(), json!(42));
        assert_eq!(Node::Boolean(false).into_value(), json!(false));
        assert_eq!(Node::Null.into_value(), Value::Null);
        assert_eq!(
            Value::from(Node::Json(json!({"k": [1, 2]}))),
            json!({"k": [1, 2]})
        );
    }
}
