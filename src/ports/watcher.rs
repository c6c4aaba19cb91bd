// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document watcher trait definition.
//!
//! This module defines the `ConfigWatcher` trait, which monitors a document source and
//! invokes a callback when the source may have changed.

use crate::domain::Result;
use std::sync::Arc;

/// Type alias for change notification callbacks.
///
/// The callback receives a description of what changed, such as the path of a
/// modified file. Receivers typically reload every source rather than inspect it.
pub type ChangeCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// A trait for watching document sources for changes.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Callbacks are usually invoked from a
/// watcher-owned thread.
///
/// # Examples
///
/// ```rust
/// use cfgvar::ports::{ChangeCallback, ConfigWatcher};
/// use cfgvar::domain::Result;
/// use std::sync::Arc;
///
/// struct ManualWatcher {
///     callback: Option<ChangeCallback>,
/// }
///
/// impl ConfigWatcher for ManualWatcher {
///     fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
///         self.callback = Some(callback);
///         Ok(())
///     }
///
///     fn stop(&mut self) -> Result<()> {
///         self.callback = None;
///         Ok(())
///     }
/// }
///
/// let mut watcher = ManualWatcher { callback: None };
/// watcher.watch(Arc::new(|changed: &str| println!("changed: {}", changed))).unwrap();
/// watcher.stop().unwrap();
/// ```
pub trait ConfigWatcher: Send + Sync {
    /// Starts watching for changes.
    ///
    /// The callback should return quickly; a slow callback delays later events.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The watcher was successfully started
    /// * `Err(ConfigError::WatcherError)` - The watcher could not be started
    fn watch(&mut self, callback: ChangeCallback) -> Result<()>;

    /// Stops watching. No callback is invoked after this returns.
    fn stop(&mut self) -> Result<()>;
}
