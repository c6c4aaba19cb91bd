// SPDX-License-Identifier: MIT OR Apache-2.0

//! The live logger table, driven by the `logs` configuration entry.

use crate::domain::codec::Codec;
use crate::domain::{listener_key, ConfigError, DocumentNode, Result, TypedEntry};
use crate::logging::definition::{LogLevel, LoggerDefinition, LoggerDefinitions, SinkDefinition};
use crate::service::ConfigRegistry;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::Level;

/// Name of the entry holding logger definitions.
pub const LOGS_ENTRY: &str = "logs";

/// Default format pattern of a logger.
pub const DEFAULT_PATTERN: &str = "%d{%Y-%m-%d %H:%M:%S}%T%t%T%N%T%F%T[%p]%T[%c]%T%f:%l%T%m%n";

/// Name of the logger used for names with no entry of their own.
pub const ROOT_LOGGER: &str = "root";

/// Current settings of one logger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggerSettings {
    /// Threshold.
    pub level: LogLevel,
    /// Format pattern.
    pub pattern: String,
    /// Outputs.
    pub sinks: Vec<SinkDefinition>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        LoggerSettings {
            level: LogLevel::DEBUG,
            pattern: DEFAULT_PATTERN.to_string(),
            sinks: Vec::new(),
        }
    }
}

/// Table of loggers that follows the `logs` entry.
///
/// The table starts with a `root` logger writing to standard output. After
/// [`install`](Self::install), every committed change to the `logs` entry is diffed
/// against the previous definitions: new or changed loggers are reconfigured, and
/// loggers that disappeared are disabled but stay in the table.
///
/// # Examples
///
/// ```
/// use cfgvar::logging::{LogLevel, LoggerManager};
/// use cfgvar::service::ConfigRegistry;
/// use std::sync::Arc;
///
/// # fn main() -> cfgvar::domain::Result<()> {
/// let registry = ConfigRegistry::new();
/// let manager = Arc::new(LoggerManager::new());
/// manager.install(&registry)?;
///
/// registry.apply_yaml("logs:\n  - name: db\n    level: warn\n")?;
/// assert_eq!(manager.logger("db").unwrap().level, LogLevel::WARN);
/// assert!(!manager.is_enabled("db", tracing::Level::INFO));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LoggerManager {
    loggers: RwLock<BTreeMap<String, LoggerSettings>>,
}

impl LoggerManager {
    /// Creates a table holding only the root logger.
    pub fn new() -> Self {
        let root = LoggerSettings {
            sinks: vec![SinkDefinition::stdout()],
            ..LoggerSettings::default()
        };
        Self {
            loggers: RwLock::new(BTreeMap::from([(ROOT_LOGGER.to_string(), root)])),
        }
    }

    /// Declares the `logs` entry in `registry` and keeps this table in step with it.
    ///
    /// Definitions already committed to the entry are applied immediately. The
    /// listener holds only a weak reference, so dropping the manager detaches it.
    pub fn install(
        self: &Arc<Self>,
        registry: &ConfigRegistry,
    ) -> Result<Arc<TypedEntry<LoggerDefinitions>>> {
        let entry = registry
            .lookup_or_create(LOGS_ENTRY, LoggerDefinitions::new(), "logs config")?
            .ok_or_else(|| ConfigError::TypeMismatch {
                name: LOGS_ENTRY.to_string(),
                expected: std::any::type_name::<LoggerDefinitions>().to_string(),
                actual: registry
                    .lookup_untyped(LOGS_ENTRY)
                    .map(|e| e.type_name().to_string())
                    .unwrap_or_default(),
            })?;

        let manager: Weak<Self> = Arc::downgrade(self);
        entry.add_listener(listener_key("logs.reconfigure"), move |old, new| {
            if let Some(manager) = manager.upgrade() {
                manager.reconfigure(old, new);
            }
        });

        self.reconfigure(&LoggerDefinitions::new(), &entry.value());
        Ok(entry)
    }

    /// Applies the difference between two sets of definitions.
    pub fn reconfigure(&self, old: &LoggerDefinitions, new: &LoggerDefinitions) {
        let mut loggers = self.loggers.write().unwrap_or_else(PoisonError::into_inner);

        for definition in new.iter() {
            if old.get(&definition.name) == Some(definition) {
                continue;
            }
            let settings = loggers.entry(definition.name.clone()).or_default();
            settings.level = definition.level;
            if let Some(pattern) = &definition.pattern {
                settings.pattern = pattern.clone();
            }
            settings.sinks = definition.sinks.clone();
            tracing::info!(
                logger = %definition.name,
                level = %definition.level,
                sinks = definition.sinks.len(),
                "logger configured"
            );
        }

        for removed in old.iter().filter(|d| !new.contains(&d.name)) {
            if let Some(settings) = loggers.get_mut(&removed.name) {
                settings.level = LogLevel::OFF;
                settings.sinks.clear();
            }
            tracing::info!(logger = %removed.name, "logger disabled");
        }
    }

    /// Current settings of the logger `name`.
    pub fn logger(&self, name: &str) -> Option<LoggerSettings> {
        self.loggers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names of all loggers in the table.
    pub fn names(&self) -> Vec<String> {
        self.loggers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Returns true if events at `level` pass the logger `name`.
    ///
    /// A name with no logger of its own is checked against the root logger.
    pub fn is_enabled(&self, name: &str, level: Level) -> bool {
        let loggers = self.loggers.read().unwrap_or_else(PoisonError::into_inner);
        loggers
            .get(name)
            .or_else(|| loggers.get(ROOT_LOGGER))
            .map(|settings| settings.level.enables(level))
            .unwrap_or(false)
    }

    /// Exports the table in the document form of the `logs` entry.
    pub fn to_document(&self) -> DocumentNode {
        let loggers = self.loggers.read().unwrap_or_else(PoisonError::into_inner);
        DocumentNode::sequence(loggers.iter().map(|(name, settings)| {
            LoggerDefinition {
                name: name.clone(),
                level: settings.level,
                pattern: Some(settings.pattern.clone()),
                sinks: settings.sinks.clone(),
            }
            .encode_node()
        }))
    }
}

impl Default for LoggerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed() -> (ConfigRegistry, Arc<LoggerManager>, Arc<TypedEntry<LoggerDefinitions>>) {
        let registry = ConfigRegistry::new();
        let manager = Arc::new(LoggerManager::new());
        let entry = manager.install(&registry).unwrap();
        (registry, manager, entry)
    }

    #[test]
    fn test_new_has_root_logger() {
        let manager = LoggerManager::new();
        let root = manager.logger(ROOT_LOGGER).unwrap();
        assert_eq!(root.level, LogLevel::DEBUG);
        assert_eq!(root.pattern, DEFAULT_PATTERN);
        assert_eq!(root.sinks, vec![SinkDefinition::stdout()]);
        assert!(manager.is_enabled("anything", Level::INFO));
        assert!(!manager.is_enabled("anything", Level::TRACE));
    }

    #[test]
    fn test_install_declares_entry_with_listener() {
        let (registry, _manager, entry) = installed();
        assert!(registry.contains(LOGS_ENTRY));
        assert!(entry.has_listener(listener_key("logs.reconfigure")));
    }

    #[test]
    fn test_added_logger_is_configured() {
        let (registry, manager, _entry) = installed();
        registry
            .apply_yaml("logs:\n  - name: system\n    level: error\n    formatter: \"%m%n\"\n    appenders:\n      - type: StdoutAppender\n")
            .unwrap();

        let system = manager.logger("system").unwrap();
        assert_eq!(system.level, LogLevel::ERROR);
        assert_eq!(system.pattern, "%m%n");
        assert_eq!(system.sinks, vec![SinkDefinition::stdout()]);
    }

    #[test]
    fn test_unknown_level_does_not_block_other_loggers() {
        let (registry, manager, _entry) = installed();
        let report = registry
            .apply_yaml("logs:\n  - name: noisy\n    level: verbose\n  - name: db\n    level: warn\n")
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(manager.logger("noisy").unwrap().level, LogLevel::TRACE);
        assert_eq!(manager.logger("db").unwrap().level, LogLevel::WARN);
    }

    #[test]
    fn test_missing_pattern_keeps_current() {
        let (registry, manager, _entry) = installed();
        registry
            .apply_yaml("logs:\n  - name: root\n    level: warn\n")
            .unwrap();

        let root = manager.logger(ROOT_LOGGER).unwrap();
        assert_eq!(root.level, LogLevel::WARN);
        assert_eq!(root.pattern, DEFAULT_PATTERN);
        assert!(root.sinks.is_empty());
    }

    #[test]
    fn test_removed_logger_is_disabled() {
        let (registry, manager, _entry) = installed();
        registry
            .apply_yaml("logs:\n  - name: a\n    level: info\n    appenders:\n      - type: StdoutAppender\n  - name: b\n    level: info\n")
            .unwrap();
        registry
            .apply_yaml("logs:\n  - name: b\n    level: info\n")
            .unwrap();

        let a = manager.logger("a").unwrap();
        assert_eq!(a.level, LogLevel::OFF);
        assert!(a.sinks.is_empty());
        assert!(!manager.is_enabled("a", Level::ERROR));
        assert_eq!(manager.logger("b").unwrap().level, LogLevel::INFO);
    }

    #[test]
    fn test_unchanged_definitions_do_not_notify() {
        let (registry, manager, entry) = installed();
        let doc = "logs:\n  - name: a\n    level: info\n";
        registry.apply_yaml(doc).unwrap();

        // A manual tweak survives re-applying identical definitions.
        manager.reconfigure(
            &LoggerDefinitions::new(),
            &[LoggerDefinition::new("a", LogLevel::ERROR)].into_iter().collect(),
        );
        registry.apply_yaml(doc).unwrap();

        assert_eq!(manager.logger("a").unwrap().level, LogLevel::ERROR);
        assert_eq!(entry.value().len(), 1);
    }

    #[test]
    fn test_install_applies_existing_value() {
        let registry = ConfigRegistry::new();
        let entry = registry
            .lookup_or_create(LOGS_ENTRY, LoggerDefinitions::new(), "")
            .unwrap()
            .unwrap();
        entry.set_value([LoggerDefinition::new("early", LogLevel::WARN)].into_iter().collect());

        let manager = Arc::new(LoggerManager::new());
        manager.install(&registry).unwrap();
        assert_eq!(manager.logger("early").unwrap().level, LogLevel::WARN);
    }

    #[test]
    fn test_install_type_mismatch() {
        let registry = ConfigRegistry::new();
        registry.lookup_or_create(LOGS_ENTRY, 1i32, "").unwrap();

        let manager = Arc::new(LoggerManager::new());
        assert!(matches!(
            manager.install(&registry),
            Err(ConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_dropped_manager_detaches() {
        let (registry, manager, entry) = installed();
        drop(manager);
        registry.apply_yaml("logs:\n  - name: a\n").unwrap();
        assert!(entry.value().contains("a"));
    }

    #[test]
    fn test_to_document() {
        let (registry, manager, _entry) = installed();
        registry
            .apply_yaml("logs:\n  - name: db\n    level: info\n")
            .unwrap();

        let doc = manager.to_document();
        let loggers = doc.as_sequence().unwrap();
        assert_eq!(loggers.len(), 2);
        assert_eq!(loggers[0].get("name"), Some(&DocumentNode::scalar("db")));
        assert_eq!(loggers[0].get("level"), Some(&DocumentNode::scalar("INFO")));
        assert_eq!(loggers[1].get("name"), Some(&DocumentNode::scalar("root")));

        let round_trip = LoggerDefinitions::decode_node(&doc).unwrap();
        assert_eq!(round_trip.len(), 2);
    }
}
