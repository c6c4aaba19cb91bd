// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic codecs for containers.
//!
//! Sequences and sets decode from a sequence node, maps from a mapping node whose
//! keys are used verbatim. Null decodes to an empty container. Each element goes
//! through its own codec, which is what lets containers of containers and
//! containers of user records compose.

use super::{expect_mapping, Codec};
use crate::domain::document::DocumentNode;
use crate::domain::errors::{ConfigError, Result};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::{BuildHasher, Hash};

/// Decodes every item of a sequence node, in order.
fn decode_items<C, T>(node: &DocumentNode) -> Result<Vec<T>>
where
    T: Codec,
{
    let items = match node {
        DocumentNode::Null => return Ok(Vec::new()),
        DocumentNode::Sequence(items) => items,
        other => {
            return Err(ConfigError::decode(
                std::any::type_name::<C>(),
                format!("expected a sequence, found a {}", other.kind()),
            ))
        }
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            T::decode_node(item).map_err(|e| {
                ConfigError::decode(
                    std::any::type_name::<C>(),
                    format!("item {}: {}", index, e),
                )
            })
        })
        .collect()
}

/// Decodes every entry of a mapping node, keeping keys as written.
fn decode_entries<C, T>(node: &DocumentNode) -> Result<Vec<(String, T)>>
where
    T: Codec,
{
    if node.is_null() {
        return Ok(Vec::new());
    }
    expect_mapping(node, std::any::type_name::<C>())?
        .iter()
        .map(|(key, value)| {
            T::decode_node(value).map(|v| (key.clone(), v)).map_err(|e| {
                ConfigError::decode(
                    std::any::type_name::<C>(),
                    format!("key `{}`: {}", key, e),
                )
            })
        })
        .collect()
}

fn encode_items<'a, T: Codec + 'a>(items: impl IntoIterator<Item = &'a T>) -> DocumentNode {
    DocumentNode::sequence(items.into_iter().map(Codec::encode_node))
}

fn encode_entries<'a, T: Codec + 'a>(
    entries: impl IntoIterator<Item = (&'a String, &'a T)>,
) -> DocumentNode {
    DocumentNode::mapping(
        entries
            .into_iter()
            .map(|(key, value)| (key.clone(), value.encode_node())),
    )
}

impl<T: Codec> Codec for Vec<T> {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        decode_items::<Self, T>(node)
    }

    fn encode_node(&self) -> DocumentNode {
        encode_items(self)
    }
}

impl<T: Codec> Codec for VecDeque<T> {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        decode_items::<Self, T>(node).map(VecDeque::from)
    }

    fn encode_node(&self) -> DocumentNode {
        encode_items(self)
    }
}

impl<T: Codec> Codec for LinkedList<T> {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        decode_items::<Self, T>(node).map(|items| items.into_iter().collect())
    }

    fn encode_node(&self) -> DocumentNode {
        encode_items(self)
    }
}

impl<T: Codec + Ord> Codec for BTreeSet<T> {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        decode_items::<Self, T>(node).map(|items| items.into_iter().collect())
    }

    fn encode_node(&self) -> DocumentNode {
        encode_items(self)
    }
}

impl<T, S> Codec for HashSet<T, S>
where
    T: Codec + Eq + Hash,
    S: BuildHasher + Default,
{
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        decode_items::<Self, T>(node).map(|items| items.into_iter().collect())
    }

    fn encode_node(&self) -> DocumentNode {
        encode_items(self)
    }
}

impl<T: Codec> Codec for BTreeMap<String, T> {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        decode_entries::<Self, T>(node).map(|entries| entries.into_iter().collect())
    }

    fn encode_node(&self) -> DocumentNode {
        encode_entries(self)
    }
}

impl<T, S> Codec for HashMap<String, T, S>
where
    T: Codec,
    S: BuildHasher + Default,
{
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        decode_entries::<Self, T>(node).map(|entries| entries.into_iter().collect())
    }

    fn encode_node(&self) -> DocumentNode {
        encode_entries(self)
    }
}

impl<T, S> Codec for IndexMap<String, T, S>
where
    T: Codec,
    S: BuildHasher + Default,
{
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        decode_entries::<Self, T>(node).map(|entries| entries.into_iter().collect())
    }

    fn encode_node(&self) -> DocumentNode {
        encode_entries(self)
    }
}

impl<T: Codec> Codec for Option<T> {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        match node {
            DocumentNode::Null => Ok(None),
            other => T::decode_node(other).map(Some),
        }
    }

    fn encode_node(&self) -> DocumentNode {
        match self {
            Some(value) => value.encode_node(),
            None => DocumentNode::Null,
        }
    }

    /// Empty text and a YAML null are `None`; anything else must decode as `T`.
    ///
    /// Text that is not a document `T` accepts, such as a bare scalar containing
    /// `: `, is handed to `T::decode` unchanged.
    fn decode(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Ok(None);
        }
        match DocumentNode::parse(text) {
            Ok(DocumentNode::Null) => Ok(None),
            Ok(node) => T::decode_node(&node)
                .or_else(|_| T::decode(text))
                .map(Some),
            Err(_) => T::decode(text).map(Some),
        }
    }

    /// `None` is the empty string; `Some` is rendered as a document so that
    /// strings such as `""` or `null` stay quoted.
    fn encode(&self) -> String {
        match self {
            Some(_) => self.encode_node().render(),
            None => String::new(),
        }
    }
}
