// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named, typed configuration entries and their change listeners.
//!
//! [`TypedEntry<T>`] owns the current value of one configuration setting. The registry
//! stores entries behind the type-erased [`ConfigEntry`] trait and recovers the
//! concrete type with a checked downcast against [`ConfigEntry::value_type_id`].

use crate::domain::codec::ConfigType;
use crate::domain::document::DocumentNode;
use crate::domain::errors::{ConfigError, Result};
use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Callback invoked with `(old, new)` when an entry's value changes.
pub type ChangeListener<T> = Arc<dyn Fn(&T, &T) + Send + Sync>;

/// Type-erased view of a configuration entry.
///
/// This is what the registry stores and what the document loader works with,
/// since it does not know value types statically.
pub trait ConfigEntry: Send + Sync {
    /// The normalized entry name.
    fn name(&self) -> &str;

    /// Human-readable description given at declaration.
    fn description(&self) -> &str;

    /// Name of the value type, for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Identity of the value type, used for checked downcasts.
    fn value_type_id(&self) -> TypeId;

    /// Encodes the current value as document text.
    fn to_text(&self) -> String;

    /// Encodes the current value as a document node.
    fn to_node(&self) -> DocumentNode;

    /// Decodes `text` and commits the result.
    ///
    /// On failure the current value is kept and the error is both logged and returned.
    fn decode_and_commit(&self, text: &str) -> Result<()>;

    /// Converts the handle for downcasting to the concrete entry type.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl fmt::Debug for dyn ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigEntry")
            .field("name", &self.name())
            .field("type", &self.type_name())
            .finish()
    }
}

/// A configuration entry holding a value of type `T`.
///
/// Listeners are kept ordered by their key and run synchronously, in ascending key
/// order, before the new value is stored. While a listener runs, [`value`](Self::value)
/// still returns the old value.
///
/// # Examples
///
/// ```
/// use cfgvar::domain::{ConfigEntry, TypedEntry};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicI32, Ordering};
///
/// let entry = TypedEntry::new("system.port", 8080, "listen port");
/// let seen = Arc::new(AtomicI32::new(0));
/// let seen_clone = Arc::clone(&seen);
/// entry.add_listener(1, move |_old, new| seen_clone.store(*new, Ordering::SeqCst));
///
/// entry.decode_and_commit("9090").unwrap();
/// assert_eq!(entry.value(), 9090);
/// assert_eq!(seen.load(Ordering::SeqCst), 9090);
///
/// assert!(entry.decode_and_commit("not a port").is_err());
/// assert_eq!(entry.value(), 9090);
/// ```
pub struct TypedEntry<T: ConfigType> {
    name: String,
    description: String,
    value: RwLock<T>,
    listeners: Mutex<BTreeMap<u64, ChangeListener<T>>>,
}

impl<T: ConfigType> TypedEntry<T> {
    /// Creates a standalone entry.
    ///
    /// The name is stored as given; validation against the name charset is the
    /// registry's job when the entry is declared.
    pub fn new(name: &str, default: T, description: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            description: description.into(),
            value: RwLock::new(default),
            listeners: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns a copy of the current value.
    pub fn value(&self) -> T {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the value, notifying listeners first.
    ///
    /// Equal values are ignored without notification. Returns whether the value changed.
    pub fn set_value(&self, new_value: T) -> bool {
        let old_value = self.value();
        if old_value == new_value {
            return false;
        }

        // Listeners may add or remove listeners, so run them over a snapshot with no lock held.
        let listeners: Vec<ChangeListener<T>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for listener in &listeners {
            listener(&old_value, &new_value);
        }

        *self.value.write().unwrap_or_else(PoisonError::into_inner) = new_value;
        tracing::debug!(entry = %self.name, "configuration value changed");
        true
    }

    /// Registers `callback` under `key`, replacing any callback already there.
    pub fn add_listener<F>(&self, key: u64, callback: F)
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::new(callback));
    }

    /// Removes the listener under `key`. Returns whether one was registered.
    pub fn remove_listener(&self, key: u64) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
            .is_some()
    }

    /// Removes every listener.
    pub fn clear_listeners(&self) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Returns the listener registered under `key`, if any.
    pub fn listener(&self, key: u64) -> Option<ChangeListener<T>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Returns true if a listener is registered under `key`.
    pub fn has_listener(&self, key: u64) -> bool {
        self.listener(key).is_some()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T: ConfigType> ConfigEntry for TypedEntry<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn to_text(&self) -> String {
        self.value().encode()
    }

    fn to_node(&self) -> DocumentNode {
        self.value().encode_node()
    }

    fn decode_and_commit(&self, text: &str) -> Result<()> {
        match T::decode(text) {
            Ok(value) => {
                self.set_value(value);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    entry = %self.name,
                    target_type = std::any::type_name::<T>(),
                    text,
                    error = %e,
                    "rejected configuration update, keeping previous value"
                );
                Err(ConfigError::TypeConversionError {
                    key: self.name.clone(),
                    target_type: std::any::type_name::<T>().to_string(),
                    source: Box::new(e),
                })
            }
        }
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<T: ConfigType + fmt::Debug> fmt::Debug for TypedEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("value", &self.value())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Derives a listener key from a purpose string (64-bit FNV-1a).
///
/// Listener keys are chosen by callers; hashing a descriptive string is a convenient
/// way to keep them unique and stable across runs.
///
/// ```
/// use cfgvar::domain::entry::listener_key;
///
/// assert_eq!(listener_key("logs.reconfigure"), listener_key("logs.reconfigure"));
/// assert_ne!(listener_key("a"), listener_key("b"));
/// ```
pub fn listener_key(purpose: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    purpose
        .bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}
