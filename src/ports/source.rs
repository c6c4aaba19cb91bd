// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document source trait definition.
//!
//! This module defines the `DocumentSource` trait, the port through which the loader
//! obtains configuration documents. A source is read in full on every load; the
//! registry decides which paths of the document matter.

use crate::domain::{DocumentNode, Result};

/// A trait for configuration document sources.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a loader can be reloaded from a watcher
/// thread.
///
/// # Examples
///
/// ```rust
/// use cfgvar::ports::DocumentSource;
/// use cfgvar::domain::{DocumentNode, Result};
///
/// struct InlineSource(&'static str);
///
/// impl DocumentSource for InlineSource {
///     fn name(&self) -> &str {
///         "inline"
///     }
///
///     fn load(&self) -> Result<DocumentNode> {
///         DocumentNode::parse(self.0)
///     }
/// }
///
/// let source = InlineSource("system:\n  port: 80\n");
/// assert!(source.load().unwrap().get("system").is_some());
/// ```
pub trait DocumentSource: Send + Sync {
    /// Returns a short identifier used in logs and errors, like "yaml-file".
    fn name(&self) -> &str;

    /// Reads the current document.
    ///
    /// # Returns
    ///
    /// * `Ok(DocumentNode)` - The root of the document as it is now
    /// * `Err(ConfigError)` - The document could not be read or parsed
    fn load(&self) -> Result<DocumentNode>;
}

impl DocumentSource for DocumentNode {
    fn name(&self) -> &str {
        "document"
    }

    fn load(&self) -> Result<DocumentNode> {
        Ok(self.clone())
    }
}
