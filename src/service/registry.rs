// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration registry.
//!
//! A [`ConfigRegistry`] maps normalized names to type-erased entries. Entries are
//! declared with [`ConfigRegistry::lookup_or_create`] from anywhere in the program and
//! live as long as the registry. Documents are applied with
//! [`ConfigRegistry::apply_document`], which only touches entries that already exist,
//! so declarations and loads may happen in any order.
//!
//! The process-wide instance returned by [`ConfigRegistry::global`] is created on first
//! access and never torn down. Declaring entries before any document is loaded is the
//! expected startup order; a later load re-applies to whatever entries exist by then.

use crate::domain::{
    flatten, ConfigEntry, ConfigError, ConfigKey, ConfigType, DocumentNode, FlattenedPath,
    Result, TypedEntry,
};
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

static GLOBAL_REGISTRY: Lazy<Arc<ConfigRegistry>> = Lazy::new(|| Arc::new(ConfigRegistry::new()));

/// Summary of one [`ConfigRegistry::apply_document`] pass.
///
/// All lists hold normalized paths in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Paths whose entry accepted the document value (changed or not).
    pub applied: Vec<String>,
    /// Paths with no declared entry.
    pub unknown: Vec<String>,
    /// Paths whose entry rejected the document value and kept its previous one.
    pub failed: Vec<String>,
}

impl ApplyReport {
    /// Appends the results of another pass.
    pub fn merge(&mut self, other: ApplyReport) {
        self.applied.extend(other.applied);
        self.unknown.extend(other.unknown);
        self.failed.extend(other.failed);
    }

    /// Returns true if no entry rejected its value.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A store of named, typed configuration entries.
///
/// # Examples
///
/// ```
/// use cfgvar::service::ConfigRegistry;
/// use cfgvar::domain::DocumentNode;
///
/// # fn main() -> cfgvar::domain::Result<()> {
/// let registry = ConfigRegistry::new();
/// let port = registry
///     .lookup_or_create("system.port", 8080u16, "system port")?
///     .expect("declared with the same type");
///
/// registry.apply_document(&DocumentNode::parse("system:\n  port: 9900\n")?);
/// assert_eq!(port.value(), 9900);
/// # Ok(())
/// # }
/// ```
pub struct ConfigRegistry {
    entries: RwLock<BTreeMap<String, Arc<dyn ConfigEntry>>>,
}

impl ConfigRegistry {
    /// Creates an empty, independent registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the process-wide registry.
    pub fn global() -> Arc<ConfigRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Returns the entry `name`, declaring it with `default` if it does not exist.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(entry))` - The entry existed with type `T`, or was just created
    /// * `Ok(None)` - An entry with this name exists with another type (reported, not fatal)
    /// * `Err(ConfigError::InvalidName)` - `name` is empty or not entirely `[a-z0-9_.]`
    pub fn lookup_or_create<T: ConfigType>(
        &self,
        name: &str,
        default: T,
        description: impl Into<String>,
    ) -> Result<Option<Arc<TypedEntry<T>>>> {
        // Declared names are never normalized; an upper-case name is illegal.
        let key = ConfigKey::parse(name).map_err(|e| {
            tracing::error!(name, "invalid configuration entry name");
            e
        })?;

        // Held across check and insert so concurrent declarations cannot both create.
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = entries.get(key.as_str()) {
            return Ok(match downcast::<T>(existing) {
                Some(entry) => {
                    tracing::debug!(entry = %key, "configuration entry already declared");
                    Some(entry)
                }
                None => {
                    report_mismatch::<T>(existing.as_ref());
                    None
                }
            });
        }

        let entry = Arc::new(TypedEntry::new(key.as_str(), default, description));
        entries.insert(key.into_string(), Arc::clone(&entry) as Arc<dyn ConfigEntry>);
        Ok(Some(entry))
    }

    /// Returns the entry `name` if it exists with value type `T`.
    ///
    /// An entry of another type yields `None` and a type mismatch diagnostic.
    pub fn lookup<T: ConfigType>(&self, name: &str) -> Option<Arc<TypedEntry<T>>> {
        let existing = self.lookup_untyped(name)?;
        let entry = downcast::<T>(&existing);
        if entry.is_none() {
            report_mismatch::<T>(existing.as_ref());
        }
        entry
    }

    /// Returns the entry `name` without knowing its type.
    pub fn lookup_untyped(&self, name: &str) -> Option<Arc<dyn ConfigEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ConfigKey::normalize(name))
            .cloned()
    }

    /// Returns true if an entry named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup_untyped(name).is_some()
    }

    /// Number of declared entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of all declared entries, sorted.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Snapshot of all declared entries, sorted by name.
    pub fn entries(&self) -> Vec<Arc<dyn ConfigEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Applies a document to the declared entries.
    ///
    /// Every non-root path of the flattened document is matched against the registry.
    /// Unknown paths are skipped. Matching entries decode the node's text and commit it,
    /// notifying their listeners if the value changed. A rejected value is reported and
    /// leaves that entry unchanged; the rest of the document is still applied.
    pub fn apply_document(&self, root: &DocumentNode) -> ApplyReport {
        let mut report = ApplyReport::default();

        for FlattenedPath { path, node } in flatten(root) {
            if path.is_empty() {
                continue;
            }
            let key = ConfigKey::normalize(&path);

            // The registry lock is released here; listeners may declare entries.
            let entry = match self.lookup_untyped(&key) {
                Some(entry) => entry,
                None => {
                    tracing::trace!(path = %key, "no configuration entry for document path");
                    report.unknown.push(key);
                    continue;
                }
            };

            match entry.decode_and_commit(&node.to_text()) {
                Ok(()) => report.applied.push(key),
                Err(_) => report.failed.push(key),
            }
        }

        tracing::debug!(
            applied = report.applied.len(),
            unknown = report.unknown.len(),
            failed = report.failed.len(),
            "applied configuration document"
        );
        report
    }

    /// Parses YAML `text` and applies it.
    ///
    /// Only a parse failure is an error; see [`apply_document`](Self::apply_document).
    pub fn apply_yaml(&self, text: &str) -> Result<ApplyReport> {
        Ok(self.apply_document(&DocumentNode::parse(text)?))
    }

    /// Exports every entry's current value as a mapping from name to encoded node.
    pub fn to_document(&self) -> DocumentNode {
        DocumentNode::mapping(
            self.entries()
                .into_iter()
                .map(|entry| (entry.name().to_string(), entry.to_node())),
        )
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigRegistry")
            .field("entries", &self.names())
            .finish()
    }
}

fn downcast<T: ConfigType>(entry: &Arc<dyn ConfigEntry>) -> Option<Arc<TypedEntry<T>>> {
    if entry.value_type_id() != TypeId::of::<T>() {
        return None;
    }
    Arc::clone(entry).into_any().downcast::<TypedEntry<T>>().ok()
}

fn report_mismatch<T>(entry: &dyn ConfigEntry) {
    let error = ConfigError::TypeMismatch {
        name: entry.name().to_string(),
        expected: std::any::type_name::<T>().to_string(),
        actual: entry.type_name().to_string(),
    };
    tracing::error!(%error, "configuration entry type mismatch");
}
