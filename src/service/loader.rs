// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading documents into a registry and reloading them on change.
//!
//! A [`ConfigLoader`] owns an ordered list of document sources. Each
//! [`reload`](ConfigLoader::reload) reads every source and applies its document to the
//! registry in order, so a later source overrides an earlier one for the paths both
//! define. Watchers registered with the loader trigger a reload from their own thread.

use crate::domain::Result;
use crate::ports::{ChangeCallback, ConfigWatcher, DocumentSource};
use crate::service::registry::{ApplyReport, ConfigRegistry};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

struct LoaderInner {
    registry: Arc<ConfigRegistry>,
    sources: Vec<Box<dyn DocumentSource>>,
    reload_lock: Mutex<()>,
}

impl LoaderInner {
    fn reload(&self) -> ApplyReport {
        // Overlapping reloads would interleave sources and break their ordering.
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut report = ApplyReport::default();
        for source in &self.sources {
            match source.load() {
                Ok(root) => report.merge(self.registry.apply_document(&root)),
                Err(error) => {
                    tracing::warn!(source = source.name(), %error, "failed to load configuration source");
                }
            }
        }
        report
    }
}

/// Applies document sources to a registry, on demand or when a watcher fires.
///
/// # Examples
///
/// ```rust
/// use cfgvar::domain::DocumentNode;
/// use cfgvar::service::{ConfigLoader, ConfigRegistry};
/// use std::sync::Arc;
///
/// # fn main() -> cfgvar::domain::Result<()> {
/// let registry = Arc::new(ConfigRegistry::new());
/// let port = registry.lookup_or_create("server.port", 80u16, "")?.unwrap();
///
/// let loader = ConfigLoader::builder()
///     .with_registry(Arc::clone(&registry))
///     .with_source(Box::new(DocumentNode::parse("server:\n  port: 8080\n")?))
///     .build()?;
///
/// loader.reload();
/// assert_eq!(port.value(), 8080);
/// # Ok(())
/// # }
/// ```
pub struct ConfigLoader {
    inner: Arc<LoaderInner>,
    watchers: Vec<Box<dyn ConfigWatcher>>,
}

impl ConfigLoader {
    /// Creates a loader for the global registry with no sources.
    pub fn new() -> Self {
        Self::from_parts(ConfigRegistry::global(), Vec::new())
    }

    /// Returns a builder for a loader.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Creates a loader for the global registry reading `config.yaml` from the
    /// OS-appropriate configuration directory, if that file exists.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use cfgvar::service::ConfigLoader;
    ///
    /// # fn main() -> cfgvar::domain::Result<()> {
    /// let loader = ConfigLoader::with_defaults("myapp", "com.example")?;
    /// loader.reload();
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "yaml")]
    pub fn with_defaults(app_name: &str, qualifier: &str) -> Result<Self> {
        use crate::adapters::YamlFileAdapter;

        let mut builder = Self::builder();
        match YamlFileAdapter::from_default_location(app_name, qualifier) {
            Ok(adapter) => builder = builder.with_source(Box::new(adapter)),
            Err(error) => {
                tracing::debug!(%error, "no default configuration file");
            }
        }
        builder.build()
    }

    fn from_parts(registry: Arc<ConfigRegistry>, sources: Vec<Box<dyn DocumentSource>>) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                registry,
                sources,
                reload_lock: Mutex::new(()),
            }),
            watchers: Vec::new(),
        }
    }

    /// The registry documents are applied to.
    pub fn registry(&self) -> &Arc<ConfigRegistry> {
        &self.inner.registry
    }

    /// Names of the sources, in application order.
    pub fn source_names(&self) -> Vec<&str> {
        self.inner.sources.iter().map(|s| s.name()).collect()
    }

    /// Loads every source and applies it to the registry.
    ///
    /// A source that fails to load is reported and skipped; the registry keeps the
    /// values it had for that source's paths. The returned report covers all sources.
    pub fn reload(&self) -> ApplyReport {
        let report = self.inner.reload();
        tracing::info!(
            sources = self.inner.sources.len(),
            applied = report.applied.len(),
            failed = report.failed.len(),
            "configuration reloaded"
        );
        report
    }

    /// Starts `watcher` with a callback that reloads this loader, and keeps it until
    /// [`stop_watchers`](Self::stop_watchers) or drop.
    pub fn register_watcher(&mut self, mut watcher: Box<dyn ConfigWatcher>) -> Result<()> {
        let inner: Weak<LoaderInner> = Arc::downgrade(&self.inner);
        let callback: ChangeCallback = Arc::new(move |origin: &str| {
            if let Some(inner) = inner.upgrade() {
                tracing::info!(origin, "configuration change detected");
                inner.reload();
            }
        });

        watcher.watch(callback)?;
        self.watchers.push(watcher);
        Ok(())
    }

    /// Watches the file at `path` and reloads when it changes.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use cfgvar::service::ConfigLoader;
    ///
    /// # fn main() -> cfgvar::domain::Result<()> {
    /// let mut loader = ConfigLoader::builder()
    ///     .with_yaml_file("/etc/myapp/config.yaml")?
    ///     .build()?;
    /// loader.reload();
    /// loader.watch_file("/etc/myapp/config.yaml", None)?;
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "reload")]
    pub fn watch_file(
        &mut self,
        path: impl AsRef<std::path::Path>,
        debounce_delay: Option<std::time::Duration>,
    ) -> Result<()> {
        use crate::adapters::FileWatcher;
        self.register_watcher(Box::new(FileWatcher::new(path, debounce_delay)?))
    }

    /// Number of registered watchers.
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Stops and drops every registered watcher.
    ///
    /// All watchers are stopped even if one fails; the first failure is returned.
    pub fn stop_watchers(&mut self) -> Result<()> {
        let mut first_error = None;
        for mut watcher in self.watchers.drain(..) {
            if let Err(error) = watcher.stop() {
                tracing::warn!(%error, "failed to stop configuration watcher");
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ConfigLoader {
    fn drop(&mut self) {
        let _ = self.stop_watchers();
    }
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("sources", &self.source_names())
            .field("watchers", &self.watchers.len())
            .finish()
    }
}

/// Builder for constructing a [`ConfigLoader`].
///
/// Without [`with_registry`](Self::with_registry) the loader targets
/// [`ConfigRegistry::global`].
pub struct ConfigLoaderBuilder {
    registry: Option<Arc<ConfigRegistry>>,
    sources: Vec<Box<dyn DocumentSource>>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            registry: None,
            sources: Vec::new(),
        }
    }

    /// Applies documents to `registry` instead of the global one.
    pub fn with_registry(mut self, registry: Arc<ConfigRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Appends a source; sources added later override earlier ones.
    pub fn with_source(mut self, source: Box<dyn DocumentSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Appends a YAML file as a source.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use cfgvar::service::ConfigLoaderBuilder;
    ///
    /// # fn main() -> cfgvar::domain::Result<()> {
    /// let loader = ConfigLoaderBuilder::new()
    ///     .with_yaml_file("/etc/myapp/base.yaml")?
    ///     .with_yaml_file("/etc/myapp/local.yaml")?
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "yaml")]
    pub fn with_yaml_file(self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        use crate::adapters::YamlFileAdapter;
        let adapter = YamlFileAdapter::from_file(path)?;
        Ok(self.with_source(Box::new(adapter)))
    }

    /// Builds the loader. Nothing is loaded until [`ConfigLoader::reload`].
    pub fn build(self) -> Result<ConfigLoader> {
        let registry = self.registry.unwrap_or_else(ConfigRegistry::global);
        Ok(ConfigLoader::from_parts(registry, self.sources))
    }
}

impl Default for ConfigLoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConfigError, DocumentNode};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FailingSource;

    impl DocumentSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        fn load(&self) -> Result<DocumentNode> {
            Err(ConfigError::SourceError {
                source_name: "failing".to_string(),
                message: "unavailable".to_string(),
                source: None,
            })
        }
    }

    #[derive(Default)]
    struct ManualWatcher {
        callback: Arc<Mutex<Option<ChangeCallback>>>,
        stopped: Arc<AtomicBool>,
    }

    impl ConfigWatcher for ManualWatcher {
        fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
            *self.callback.lock().unwrap() = Some(callback);
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            *self.callback.lock().unwrap() = None;
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn yaml(text: &str) -> Box<dyn DocumentSource> {
        Box::new(DocumentNode::parse(text).unwrap())
    }

    #[test]
    fn test_later_sources_override_earlier() {
        let registry = Arc::new(ConfigRegistry::new());
        let port = registry.lookup_or_create("server.port", 1u16, "").unwrap().unwrap();
        let host = registry
            .lookup_or_create("server.host", String::new(), "")
            .unwrap()
            .unwrap();

        let loader = ConfigLoader::builder()
            .with_registry(Arc::clone(&registry))
            .with_source(yaml("server:\n  port: 80\n  host: base\n"))
            .with_source(yaml("server:\n  port: 8080\n"))
            .build()
            .unwrap();

        let report = loader.reload();
        assert_eq!(port.value(), 8080);
        assert_eq!(host.value(), "base");
        assert_eq!(
            report.applied,
            vec!["server.port", "server.host", "server.port"]
        );
    }

    #[test]
    fn test_failing_source_is_skipped() {
        let registry = Arc::new(ConfigRegistry::new());
        let port = registry.lookup_or_create("server.port", 1u16, "").unwrap().unwrap();

        let loader = ConfigLoader::builder()
            .with_registry(Arc::clone(&registry))
            .with_source(Box::new(FailingSource))
            .with_source(yaml("server:\n  port: 2\n"))
            .build()
            .unwrap();

        loader.reload();
        assert_eq!(port.value(), 2);
        assert_eq!(loader.source_names(), vec!["failing", "document"]);
    }

    #[test]
    fn test_builder_defaults_to_global_registry() {
        let loader = ConfigLoader::builder().build().unwrap();
        assert!(Arc::ptr_eq(loader.registry(), &ConfigRegistry::global()));
        assert!(loader.reload().applied.is_empty());
    }

    #[test]
    fn test_watcher_triggers_reload() {
        let registry = Arc::new(ConfigRegistry::new());
        let port = registry.lookup_or_create("server.port", 1u16, "").unwrap().unwrap();

        let mut loader = ConfigLoader::builder()
            .with_registry(Arc::clone(&registry))
            .with_source(yaml("server:\n  port: 3\n"))
            .build()
            .unwrap();

        let watcher = ManualWatcher::default();
        let callback = Arc::clone(&watcher.callback);
        let stopped = Arc::clone(&watcher.stopped);
        loader.register_watcher(Box::new(watcher)).unwrap();
        assert_eq!(loader.watcher_count(), 1);

        let fire = callback.lock().unwrap().clone().unwrap();
        fire("test");
        assert_eq!(port.value(), 3);

        loader.stop_watchers().unwrap();
        assert!(stopped.load(Ordering::SeqCst));
        assert_eq!(loader.watcher_count(), 0);
    }

    #[test]
    fn test_callback_after_drop_is_harmless() {
        let registry = Arc::new(ConfigRegistry::new());
        let mut loader = ConfigLoader::builder()
            .with_registry(registry)
            .build()
            .unwrap();

        let watcher = ManualWatcher::default();
        let callback = Arc::clone(&watcher.callback);
        loader.register_watcher(Box::new(watcher)).unwrap();
        let fire = callback.lock().unwrap().clone().unwrap();

        drop(loader);
        fire("late");
    }
}
