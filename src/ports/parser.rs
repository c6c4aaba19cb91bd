// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document parser trait definition.
//!
//! This module defines the `DocumentParser` trait, which turns the raw text of a
//! configuration document into a [`DocumentNode`] tree.

use crate::domain::{DocumentNode, Result};

/// A trait for parsing configuration documents.
///
/// Parsers keep the document's structure; flattening into dotted paths is done by
/// the registry when the document is applied.
///
/// # Examples
///
/// ```rust
/// use cfgvar::ports::DocumentParser;
/// use cfgvar::domain::{DocumentNode, Result};
///
/// struct KeyValueParser;
///
/// impl DocumentParser for KeyValueParser {
///     fn parse(&self, content: &str) -> Result<DocumentNode> {
///         Ok(DocumentNode::mapping(content.lines().filter_map(|line| {
///             line.split_once('=')
///                 .map(|(k, v)| (k.trim(), DocumentNode::scalar(v.trim())))
///         })))
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["properties"]
///     }
/// }
///
/// let root = KeyValueParser.parse("port = 80").unwrap();
/// assert_eq!(root.get("port"), Some(&DocumentNode::scalar("80")));
/// ```
pub trait DocumentParser: Send + Sync {
    /// Parses document content into a tree.
    ///
    /// # Returns
    ///
    /// * `Ok(DocumentNode)` - The root of the parsed document
    /// * `Err(ConfigError::ParseError)` - The content is not well formed
    fn parse(&self, content: &str) -> Result<DocumentNode>;

    /// Returns the file extensions (without the leading dot) this parser handles.
    fn supported_extensions(&self) -> &[&str];

    /// Returns true if `extension` is one of [`supported_extensions`](Self::supported_extensions),
    /// ignoring ASCII case.
    fn supports_extension(&self, extension: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigError;

    struct FixedParser;

    impl DocumentParser for FixedParser {
        fn parse(&self, content: &str) -> Result<DocumentNode> {
            if content.is_empty() {
                return Err(ConfigError::ParseError {
                    message: "empty document".to_string(),
                    source: None,
                });
            }
            Ok(DocumentNode::mapping([(
                "database",
                DocumentNode::mapping([("port", DocumentNode::scalar(content))]),
            )]))
        }

        fn supported_extensions(&self) -> &[&str] {
            &["test", "tst"]
        }
    }

    #[test]
    fn test_parser_parse() {
        let root = FixedParser.parse("5432").unwrap();
        assert_eq!(
            root.get("database").and_then(|db| db.get("port")),
            Some(&DocumentNode::scalar("5432"))
        );
    }

    #[test]
    fn test_parser_parse_error() {
        assert!(matches!(
            FixedParser.parse(""),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_parser_supported_extensions() {
        assert_eq!(FixedParser.supported_extensions(), &["test", "tst"]);
        assert!(FixedParser.supports_extension("TST"));
        assert!(!FixedParser.supports_extension("yaml"));
    }

    #[test]
    fn test_parser_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn DocumentParser>();
    }
}
