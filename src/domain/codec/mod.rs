// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bidirectional conversion between typed values and document form.
//!
//! A [`Codec`] maps a Rust type onto the [`DocumentNode`] vocabulary. Built-in codecs
//! cover scalars, sequences, sets and text-keyed maps; container codecs are written
//! once in terms of their element codec, so a `BTreeMap<String, Vec<Person>>` works as
//! soon as `Person` has a codec.
//!
//! # Custom record types
//!
//! ```
//! use cfgvar::domain::codec::{optional_field, required_field, Codec};
//! use cfgvar::domain::{DocumentNode, Result};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Codec for Person {
//!     fn decode_node(node: &DocumentNode) -> Result<Self> {
//!         Ok(Person {
//!             name: required_field(node, "name")?,
//!             age: optional_field(node, "age")?.unwrap_or_default(),
//!         })
//!     }
//!
//!     fn encode_node(&self) -> DocumentNode {
//!         DocumentNode::mapping([
//!             ("name", self.name.encode_node()),
//!             ("age", self.age.encode_node()),
//!         ])
//!     }
//! }
//!
//! let people = Vec::<Person>::decode("- name: ann\n  age: 31\n- name: bob\n").unwrap();
//! assert_eq!(people[1], Person { name: "bob".into(), age: 0 });
//! ```

mod collections;
mod scalar;

use crate::domain::document::DocumentNode;
use crate::domain::errors::{ConfigError, Result};
use indexmap::IndexMap;

/// Conversion between a value and its document representation.
///
/// Implementors provide the node-level pair; the text-level pair defaults to
/// parsing and rendering YAML and only needs overriding for scalars, whose text
/// is used verbatim.
pub trait Codec: Sized {
    /// Builds a value from a document node.
    ///
    /// Must not have side effects: on error nothing has been changed.
    fn decode_node(node: &DocumentNode) -> Result<Self>;

    /// Converts the value into a document node.
    fn encode_node(&self) -> DocumentNode;

    /// Builds a value from document text.
    fn decode(text: &str) -> Result<Self> {
        Self::decode_node(&DocumentNode::parse(text)?)
    }

    /// Converts the value into document text.
    fn encode(&self) -> String {
        self.encode_node().to_text()
    }
}

/// Bound for values that can be stored in a configuration entry.
pub trait ConfigType: Codec + Clone + PartialEq + Send + Sync + 'static {}

impl<T> ConfigType for T where T: Codec + Clone + PartialEq + Send + Sync + 'static {}

impl Codec for DocumentNode {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        Ok(node.clone())
    }

    fn encode_node(&self) -> DocumentNode {
        self.clone()
    }
}

/// Returns the scalar text of `node`, or a decode error naming `target_type`.
pub fn expect_scalar<'a>(node: &'a DocumentNode, target_type: &str) -> Result<&'a str> {
    node.as_scalar().ok_or_else(|| {
        ConfigError::decode(target_type, format!("expected a scalar, found a {}", node.kind()))
    })
}

/// Returns the entries of `node`, or a decode error naming `target_type`.
pub fn expect_mapping<'a>(
    node: &'a DocumentNode,
    target_type: &str,
) -> Result<&'a IndexMap<String, DocumentNode>> {
    node.as_mapping().ok_or_else(|| {
        ConfigError::decode(target_type, format!("expected a mapping, found a {}", node.kind()))
    })
}

/// Decodes the field `key` of a mapping node; a missing field is an error.
pub fn required_field<T: Codec>(node: &DocumentNode, key: &str) -> Result<T> {
    let map = expect_mapping(node, std::any::type_name::<T>())?;
    match map.get(key) {
        Some(value) => T::decode_node(value).map_err(|e| field_error::<T>(key, e)),
        None => Err(ConfigError::decode(
            std::any::type_name::<T>(),
            format!("missing field `{}`", key),
        )),
    }
}

/// Decodes the field `key` of a mapping node; missing or null yields `None`.
pub fn optional_field<T: Codec>(node: &DocumentNode, key: &str) -> Result<Option<T>> {
    let map = expect_mapping(node, std::any::type_name::<T>())?;
    match map.get(key) {
        Some(value) if !value.is_null() => T::decode_node(value)
            .map(Some)
            .map_err(|e| field_error::<T>(key, e)),
        _ => Ok(None),
    }
}

fn field_error<T>(key: &str, err: ConfigError) -> ConfigError {
    ConfigError::decode(std::any::type_name::<T>(), format!("field `{}`: {}", key, err))
}
