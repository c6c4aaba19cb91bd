// SPDX-License-Identifier: MIT OR Apache-2.0

//! File system watcher for configuration documents.
//!
//! The watcher observes the directory containing the file, so editors that replace
//! the file by renaming a temporary copy over it are still noticed. Bursts of events
//! are debounced: the callback fires once the file has been quiet for the debounce
//! delay, which keeps a reload from reading a half-written document.

use crate::domain::{ConfigError, Result};
use crate::ports::{ChangeCallback, ConfigWatcher};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Watches one configuration file.
///
/// # Examples
///
/// ```rust,no_run
/// use cfgvar::adapters::FileWatcher;
/// use cfgvar::ports::ConfigWatcher;
/// use std::sync::Arc;
///
/// # fn main() -> cfgvar::domain::Result<()> {
/// let mut watcher = FileWatcher::new("/path/to/config.yaml", None)?;
///
/// watcher.watch(Arc::new(|path: &str| {
///     println!("Configuration changed: {}", path);
/// }))?;
///
/// // Later, stop watching
/// watcher.stop()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileWatcher {
    file_path: PathBuf,
    debounce_delay: Duration,
    watcher: Option<RecommendedWatcher>,
    watch_thread: Option<JoinHandle<()>>,
    stop_flag: Arc<AtomicBool>,
}

impl FileWatcher {
    /// Creates a watcher for the file at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to an existing file
    /// * `debounce_delay` - Quiet period before the callback fires (default 500ms)
    pub fn new(path: impl AsRef<Path>, debounce_delay: Option<Duration>) -> Result<Self> {
        let path = path.as_ref();
        let file_path = path.canonicalize().map_err(|e| ConfigError::WatcherError {
            message: format!("File does not exist: {}", path.display()),
            source: Some(Box::new(e)),
        })?;

        if !file_path.is_file() {
            return Err(ConfigError::WatcherError {
                message: format!("Not a file: {}", file_path.display()),
                source: None,
            });
        }

        Ok(Self {
            file_path,
            debounce_delay: debounce_delay.unwrap_or(DEFAULT_DEBOUNCE),
            watcher: None,
            watch_thread: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns the canonical path of the watched file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Returns true while the watcher thread is running.
    pub fn is_watching(&self) -> bool {
        self.watch_thread.is_some()
    }
}

impl ConfigWatcher for FileWatcher {
    fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
        if self.watcher.is_some() {
            return Err(ConfigError::WatcherError {
                message: "Watcher is already running".to_string(),
                source: None,
            });
        }

        let (event_tx, event_rx) = channel();
        let mut watcher =
            RecommendedWatcher::new(event_tx, notify::Config::default()).map_err(|e| {
                ConfigError::WatcherError {
                    message: format!("Failed to create file watcher: {}", e),
                    source: Some(Box::new(e)),
                }
            })?;

        let directory = self
            .file_path
            .parent()
            .ok_or_else(|| ConfigError::WatcherError {
                message: "Failed to get parent directory".to_string(),
                source: None,
            })?;

        watcher
            .watch(directory, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatcherError {
                message: format!("Failed to start watching: {}", e),
                source: Some(Box::new(e)),
            })?;

        self.stop_flag.store(false, Ordering::SeqCst);
        let worker = Debouncer {
            file_name: self.file_path.file_name().map(OsString::from),
            origin: self.file_path.to_string_lossy().into_owned(),
            delay: self.debounce_delay,
            stop_flag: Arc::clone(&self.stop_flag),
            callback,
        };

        self.watch_thread = Some(thread::spawn(move || worker.run(event_rx)));
        self.watcher = Some(watcher);
        tracing::debug!(path = %self.file_path.display(), "watching configuration file");

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.stop_flag.store(true, Ordering::SeqCst);

        // Dropping the notify watcher closes the event channel as well.
        self.watcher = None;

        if let Some(handle) = self.watch_thread.take() {
            handle.join().map_err(|_| ConfigError::WatcherError {
                message: "Failed to join watcher thread".to_string(),
                source: None,
            })?;
            tracing::debug!(path = %self.file_path.display(), "stopped watching configuration file");
        }

        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

struct Debouncer {
    file_name: Option<OsString>,
    origin: String,
    delay: Duration,
    stop_flag: Arc<AtomicBool>,
    callback: ChangeCallback,
}

impl Debouncer {
    fn run(self, events: Receiver<notify::Result<Event>>) {
        let mut pending: Option<Instant> = None;

        while !self.stop_flag.load(Ordering::SeqCst) {
            match events.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(event)) if self.concerns_file(&event) => {
                    pending = Some(Instant::now());
                }
                Ok(Ok(_)) => {}
                Ok(Err(error)) => {
                    tracing::warn!(%error, path = %self.origin, "file watcher reported an error");
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if let Some(since) = pending {
                if since.elapsed() >= self.delay {
                    pending = None;
                    tracing::debug!(path = %self.origin, "configuration file changed");
                    (self.callback)(&self.origin);
                }
            }
        }
    }

    fn concerns_file(&self, event: &Event) -> bool {
        if matches!(event.kind, EventKind::Access(_)) {
            return false;
        }
        event
            .paths
            .iter()
            .any(|p| p.file_name().map(OsString::from) == self.file_name)
    }
}
