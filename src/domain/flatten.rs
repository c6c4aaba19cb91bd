// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flattening of nested documents into dotted paths.
//!
//! A document such as
//!
//! ```yaml
//! system:
//!   port: 9900
//!   int_vec: [10, 30]
//! ```
//!
//! flattens to `("", root)`, `("system", {..})`, `("system.port", 9900)` and
//! `("system.int_vec", [10, 30])`. Composite nodes are emitted as well as their
//! children; sequences are leaves.

use crate::domain::config_key::ConfigKey;
use crate::domain::document::DocumentNode;
use crate::domain::errors::ConfigError;

/// A dotted path paired with the subtree found there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlattenedPath<'a> {
    /// Mapping keys from the root, joined with `.`; empty for the root itself.
    pub path: String,
    /// The node at `path`.
    pub node: &'a DocumentNode,
}

/// Walks `root` depth-first, in document order.
///
/// A key that would produce a path outside the name charset is reported and its
/// subtree skipped; sibling subtrees are still visited.
///
/// # Examples
///
/// ```
/// use cfgvar::domain::{flatten, DocumentNode};
///
/// let root = DocumentNode::parse("a:\n  b: 1\n  c: [2]\n").unwrap();
/// let paths: Vec<String> = flatten(&root).into_iter().map(|p| p.path).collect();
/// assert_eq!(paths, vec!["", "a", "a.b", "a.c"]);
/// ```
pub fn flatten(root: &DocumentNode) -> Vec<FlattenedPath<'_>> {
    let mut output = Vec::new();
    collect("", root, &mut output);
    output
}

fn collect<'a>(prefix: &str, node: &'a DocumentNode, output: &mut Vec<FlattenedPath<'a>>) {
    if !ConfigKey::is_valid_name(prefix) {
        let error = ConfigError::FlattenNameError {
            path: prefix.to_string(),
        };
        tracing::warn!(%error, node = node.kind(), "skipping document subtree");
        return;
    }

    output.push(FlattenedPath {
        path: prefix.to_string(),
        node,
    });

    if let DocumentNode::Mapping(map) = node {
        for (key, child) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            collect(&path, child, output);
        }
    }
}
