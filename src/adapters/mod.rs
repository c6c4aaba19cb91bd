// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing document source and watcher implementations.
//!
//! Each adapter implements one of the traits defined in the ports layer for a
//! concrete medium.

#[cfg(feature = "yaml")]
pub mod yaml_file;

pub mod watchers;

// Re-export adapters based on feature flags
#[cfg(feature = "reload")]
pub use watchers::FileWatcher;
#[cfg(feature = "yaml")]
pub use yaml_file::{YamlFileAdapter, YamlParser};
