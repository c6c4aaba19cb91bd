// SPDX-License-Identifier: MIT OR Apache-2.0

//! A typed configuration registry with YAML document loading and change notification.
//!
//! Components declare named, typed configuration entries with a default value. A YAML
//! document applied to the registry updates every declared entry whose dotted path
//! appears in it; entries notify their listeners with the old and new value whenever
//! a change is committed. Unknown paths and malformed values are reported and
//! skipped, so one bad key never aborts loading the rest of a document.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: the document model, codecs, typed entries and flattening
//! - **Ports**: trait definitions for parsing, obtaining and watching documents
//! - **Adapters**: YAML files and file system watching
//! - **Service**: the registry and the loader that feeds it
//! - **Logging**: logger settings that follow a `logs` entry
//!
//! # Feature Flags
//!
//! - `yaml`: Enable YAML file sources (default)
//! - `reload`: Enable reloading when a watched file changes
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust
//! use cfgvar::prelude::*;
//! use std::collections::BTreeSet;
//!
//! # fn main() -> Result<()> {
//! let registry = ConfigRegistry::new();
//! let port = registry
//!     .lookup_or_create("system.port", 8080u16, "system port")?
//!     .expect("no other type declared under this name");
//! let ids = registry
//!     .lookup_or_create("system.ids", BTreeSet::from([1u32]), "")?
//!     .expect("no other type declared under this name");
//!
//! port.add_listener(listener_key("port.log"), |old, new| {
//!     println!("port changed from {} to {}", old, new);
//! });
//!
//! registry.apply_yaml("system:\n  port: 9900\n  ids: [3, 1, 3]\n")?;
//! assert_eq!(port.value(), 9900);
//! assert_eq!(ids.value(), BTreeSet::from([1, 3]));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        listener_key, Codec, ConfigEntry, ConfigError, ConfigKey, ConfigType, DocumentNode,
        Result, TypedEntry,
    };
    pub use crate::ports::{ConfigWatcher, DocumentParser, DocumentSource};
    pub use crate::service::{ApplyReport, ConfigLoader, ConfigRegistry};

    // Re-export adapters based on feature flags
    #[cfg(feature = "reload")]
    pub use crate::adapters::FileWatcher;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::{YamlFileAdapter, YamlParser};
}
