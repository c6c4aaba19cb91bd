// SPDX-License-Identifier: MIT OR Apache-2.0

//! Codecs for scalar types.
//!
//! Scalars decode from their literal text without going through the YAML parser,
//! so a string entry receives exactly the text found in the document.

use super::{expect_scalar, Codec};
use crate::domain::document::DocumentNode;
use crate::domain::errors::{ConfigError, Result};

macro_rules! integer_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Codec for $ty {
                fn decode_node(node: &DocumentNode) -> Result<Self> {
                    Self::decode(expect_scalar(node, stringify!($ty))?)
                }

                fn encode_node(&self) -> DocumentNode {
                    DocumentNode::Scalar(self.to_string())
                }

                fn decode(text: &str) -> Result<Self> {
                    let text = text.trim();
                    text.parse::<$ty>()
                        .map_err(|e| ConfigError::from_parse_int_error(stringify!($ty), text, e))
                }
            }
        )*
    };
}

integer_codec!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Codec for $ty {
                fn decode_node(node: &DocumentNode) -> Result<Self> {
                    Self::decode(expect_scalar(node, stringify!($ty))?)
                }

                fn encode_node(&self) -> DocumentNode {
                    DocumentNode::Scalar(self.to_string())
                }

                fn decode(text: &str) -> Result<Self> {
                    let text = text.trim();
                    match yaml_float_literal(text) {
                        Some(special) => Ok(special as $ty),
                        None => text
                            .parse::<$ty>()
                            .map_err(|e| ConfigError::from_parse_float_error(stringify!($ty), text, e)),
                    }
                }
            }
        )*
    };
}

float_codec!(f32, f64);

/// YAML spells infinities and NaN as `.inf`, `-.inf` and `.nan`.
fn yaml_float_literal(text: &str) -> Option<f64> {
    match text {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        _ => None,
    }
}

impl Codec for bool {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        Self::decode(expect_scalar(node, "bool")?)
    }

    fn encode_node(&self) -> DocumentNode {
        DocumentNode::Scalar(self.to_string())
    }

    /// Recognizes the following values (case-insensitive):
    /// - `true`: "true", "yes", "1", "on"
    /// - `false`: "false", "no", "0", "off"
    fn decode(text: &str) -> Result<Self> {
        let text = text.trim();
        match text.to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => text
                .parse::<bool>()
                .map_err(|e| ConfigError::from_parse_bool_error(text, e)),
        }
    }
}

impl Codec for char {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        Self::decode(expect_scalar(node, "char")?)
    }

    fn encode_node(&self) -> DocumentNode {
        DocumentNode::Scalar(self.to_string())
    }

    fn decode(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConfigError::decode(
                "char",
                format!("'{}' is not a single character", text),
            )),
        }
    }
}

impl Codec for String {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        match node {
            DocumentNode::Null => Ok(String::new()),
            other => expect_scalar(other, "String").map(str::to_string),
        }
    }

    fn encode_node(&self) -> DocumentNode {
        DocumentNode::Scalar(self.clone())
    }

    fn decode(text: &str) -> Result<Self> {
        Ok(text.to_string())
    }
}
