// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! These traits are the seams between the registry and the outside world: parsing
//! document text, obtaining documents, and learning that a document changed. The
//! adapters layer implements them.

pub mod parser;
pub mod source;
pub mod watcher;

// Re-export commonly used types
pub use parser::DocumentParser;
pub use source::DocumentSource;
pub use watcher::{ChangeCallback, ConfigWatcher};
