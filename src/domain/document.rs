// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hierarchical document tree consumed by the flattener and the codec layer.
//!
//! A [`DocumentNode`] is the parsed form of a configuration document. Concrete syntax
//! is YAML: [`DocumentNode::parse`] turns text into a tree and [`DocumentNode::render`]
//! turns a tree back into text. Scalars are kept as their literal text; interpreting
//! that text is the job of the [`Codec`](crate::domain::codec::Codec) for the target type.

use crate::domain::errors::{ConfigError, Result};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::str::FromStr;

/// A node of a parsed configuration document.
///
/// # Examples
///
/// ```
/// use cfgvar::domain::DocumentNode;
///
/// let root = DocumentNode::parse("system:\n  port: 9900\n").unwrap();
/// let port = root.get("system").and_then(|s| s.get("port"));
/// assert_eq!(port.and_then(|p| p.as_scalar()), Some("9900"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DocumentNode {
    /// An absent or explicitly null value.
    #[default]
    Null,
    /// A scalar kept as its literal text.
    Scalar(String),
    /// An ordered list of nodes.
    Sequence(Vec<DocumentNode>),
    /// A mapping from text keys to nodes, in document order.
    Mapping(IndexMap<String, DocumentNode>),
}

impl DocumentNode {
    /// Parses YAML text into a document tree.
    ///
    /// Empty input parses to [`DocumentNode::Null`].
    pub fn parse(text: &str) -> Result<Self> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| ConfigError::ParseError {
                message: format!("Failed to parse YAML: {}", e),
                source: Some(Box::new(e)),
            })?;
        Ok(Self::from(value))
    }

    /// Renders the tree as YAML text.
    pub fn render(&self) -> String {
        match serde_yaml::to_string(self) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "failed to render document node");
                String::new()
            }
        }
    }

    /// Returns the text handed to an entry when this node is applied to it.
    ///
    /// Scalars yield their literal text, null yields the empty string and
    /// composite nodes are rendered back to YAML.
    pub fn to_text(&self) -> String {
        match self {
            DocumentNode::Null => String::new(),
            DocumentNode::Scalar(text) => text.clone(),
            DocumentNode::Sequence(_) | DocumentNode::Mapping(_) => self.render(),
        }
    }

    /// Creates a scalar node.
    pub fn scalar(text: impl Into<String>) -> Self {
        DocumentNode::Scalar(text.into())
    }

    /// Creates a sequence node from its items.
    pub fn sequence(items: impl IntoIterator<Item = DocumentNode>) -> Self {
        DocumentNode::Sequence(items.into_iter().collect())
    }

    /// Creates a mapping node from key/node pairs, keeping their order.
    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, DocumentNode)>) -> Self {
        DocumentNode::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns the scalar text, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            DocumentNode::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the items, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[DocumentNode]> {
        match self {
            DocumentNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries, if this is a mapping.
    pub fn as_mapping(&self) -> Option<&IndexMap<String, DocumentNode>> {
        match self {
            DocumentNode::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` if this is a mapping.
    pub fn get(&self, key: &str) -> Option<&DocumentNode> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Returns true for [`DocumentNode::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, DocumentNode::Null)
    }

    /// Returns true for sequences and mappings.
    pub fn is_composite(&self) -> bool {
        matches!(self, DocumentNode::Sequence(_) | DocumentNode::Mapping(_))
    }

    /// Short name of the node kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentNode::Null => "null",
            DocumentNode::Scalar(_) => "scalar",
            DocumentNode::Sequence(_) => "sequence",
            DocumentNode::Mapping(_) => "mapping",
        }
    }
}

impl FromStr for DocumentNode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<serde_yaml::Value> for DocumentNode {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => DocumentNode::Null,
            Value::Bool(b) => DocumentNode::Scalar(b.to_string()),
            Value::Number(n) => DocumentNode::Scalar(n.to_string()),
            Value::String(s) => DocumentNode::Scalar(s),
            Value::Sequence(items) => {
                DocumentNode::Sequence(items.into_iter().map(DocumentNode::from).collect())
            }
            Value::Mapping(map) => DocumentNode::Mapping(
                map.into_iter()
                    .map(|(k, v)| (key_text(k), DocumentNode::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => DocumentNode::from(tagged.value),
        }
    }
}

/// Mapping keys that are not strings are addressed by their scalar text.
fn key_text(key: serde_yaml::Value) -> String {
    match DocumentNode::from(key) {
        DocumentNode::Scalar(text) => text,
        other => other.to_text().trim_end().to_string(),
    }
}

impl Serialize for DocumentNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DocumentNode::Null => serializer.serialize_unit(),
            DocumentNode::Scalar(text) => serialize_scalar(text, serializer),
            DocumentNode::Sequence(items) => serializer.collect_seq(items),
            DocumentNode::Mapping(map) => serializer.collect_map(map),
        }
    }
}

/// Emits literals that read back identically as plain YAML values, everything
/// else as a string so the emitter quotes it when needed.
fn serialize_scalar<S: Serializer>(text: &str, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match text {
        "true" => return serializer.serialize_bool(true),
        "false" => return serializer.serialize_bool(false),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        if n.to_string() == text {
            return serializer.serialize_i64(n);
        }
    }
    if let Ok(n) = text.parse::<u64>() {
        if n.to_string() == text {
            return serializer.serialize_u64(n);
        }
    }
    if let Ok(f) = text.parse::<f64>() {
        if f.is_finite() && format!("{:?}", f) == text {
            return serializer.serialize_f64(f);
        }
    }
    serializer.serialize_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars_keep_literal_text() {
        let root = DocumentNode::parse("a: 42\nb: true\nc: hello\nd: 3.5\n").unwrap();
        assert_eq!(root.get("a"), Some(&DocumentNode::scalar("42")));
        assert_eq!(root.get("b"), Some(&DocumentNode::scalar("true")));
        assert_eq!(root.get("c"), Some(&DocumentNode::scalar("hello")));
        assert_eq!(root.get("d"), Some(&DocumentNode::scalar("3.5")));
    }

    #[test]
    fn test_parse_preserves_mapping_order() {
        let root = DocumentNode::parse("z: 1\na: 2\nm: 3\n").unwrap();
        let keys: Vec<&str> = root.as_mapping().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_parse_null_and_empty() {
        assert_eq!(DocumentNode::parse("").unwrap(), DocumentNode::Null);
        assert_eq!(DocumentNode::parse("~").unwrap(), DocumentNode::Null);
        let root = DocumentNode::parse("key: null").unwrap();
        assert!(root.get("key").unwrap().is_null());
    }

    #[test]
    fn test_parse_sequence() {
        let root = DocumentNode::parse("[1, 2, 2, 3]").unwrap();
        let items = root.as_sequence().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[2], DocumentNode::scalar("2"));
    }

    #[test]
    fn test_parse_non_string_keys() {
        let root = DocumentNode::parse("1: one\ntrue: yes\n").unwrap();
        assert_eq!(root.get("1"), Some(&DocumentNode::scalar("one")));
        assert_eq!(root.get("true"), Some(&DocumentNode::scalar("yes")));
    }

    #[test]
    fn test_parse_invalid() {
        let result = DocumentNode::parse("invalid: yaml: content:");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_render_round_trip() {
        let node = DocumentNode::mapping([
            ("name", DocumentNode::scalar("root")),
            ("port", DocumentNode::scalar("8080")),
            ("ratio", DocumentNode::scalar("0.5")),
            ("flag", DocumentNode::scalar("false")),
            ("quoted", DocumentNode::scalar("a: b")),
            ("numeric_text", DocumentNode::scalar("1e5")),
            ("nothing", DocumentNode::Null),
            (
                "items",
                DocumentNode::sequence([DocumentNode::scalar("x"), DocumentNode::scalar("- y")]),
            ),
        ]);
        let text = node.render();
        assert_eq!(DocumentNode::parse(&text).unwrap(), node);
    }

    #[test]
    fn test_render_numbers_unquoted() {
        let node = DocumentNode::mapping([("port", DocumentNode::scalar("8080"))]);
        assert_eq!(node.render().trim(), "port: 8080");
    }

    #[test]
    fn test_to_text() {
        assert_eq!(DocumentNode::scalar("10").to_text(), "10");
        assert_eq!(DocumentNode::Null.to_text(), "");
        let seq = DocumentNode::sequence([DocumentNode::scalar("1"), DocumentNode::scalar("2")]);
        assert_eq!(DocumentNode::parse(&seq.to_text()).unwrap(), seq);
    }

    #[test]
    fn test_accessors() {
        let node = DocumentNode::scalar("v");
        assert_eq!(node.as_scalar(), Some("v"));
        assert!(node.as_sequence().is_none());
        assert!(node.as_mapping().is_none());
        assert!(node.get("v").is_none());
        assert!(!node.is_composite());
        assert_eq!(node.kind(), "scalar");
        assert_eq!(DocumentNode::Null.kind(), "null");
        assert!(DocumentNode::sequence([]).is_composite());
    }

    #[test]
    fn test_from_str() {
        let node: DocumentNode = "k: v".parse().unwrap();
        assert_eq!(node.get("k"), Some(&DocumentNode::scalar("v")));
    }
}
