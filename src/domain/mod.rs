// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core business logic and types.
//!
//! This module holds the document model, the codec layer, typed entries with their
//! change listeners, and the flattening algorithm. It performs no I/O.

pub mod codec;
pub mod config_key;
pub mod document;
pub mod entry;
pub mod errors;
pub mod flatten;

// Re-export commonly used types
pub use codec::{Codec, ConfigType};
pub use config_key::ConfigKey;
pub use document::DocumentNode;
pub use entry::{listener_key, ChangeListener, ConfigEntry, TypedEntry};
pub use errors::{ConfigError, Result};
pub use flatten::{flatten, FlattenedPath};
