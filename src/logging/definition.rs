// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logger definitions as they appear in configuration documents.
//!
//! ```yaml
//! logs:
//!   - name: root
//!     level: info
//!     formatter: "%d%T%m%n"
//!     appenders:
//!       - type: FileLogAppender
//!         file: /var/log/root.txt
//!       - type: StdoutAppender
//!         level: warn
//! ```

use crate::domain::codec::{expect_mapping, expect_scalar, optional_field, required_field, Codec};
use crate::domain::{ConfigError, DocumentNode, Result};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing::Level;

/// Severity threshold of a logger or sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LogLevel(LevelFilter);

impl LogLevel {
    /// Everything is enabled.
    pub const TRACE: LogLevel = LogLevel(LevelFilter::TRACE);
    /// Debug and more severe.
    pub const DEBUG: LogLevel = LogLevel(LevelFilter::DEBUG);
    /// Info and more severe.
    pub const INFO: LogLevel = LogLevel(LevelFilter::INFO);
    /// Warnings and errors.
    pub const WARN: LogLevel = LogLevel(LevelFilter::WARN);
    /// Errors only.
    pub const ERROR: LogLevel = LogLevel(LevelFilter::ERROR);
    /// Nothing is enabled.
    pub const OFF: LogLevel = LogLevel(LevelFilter::OFF);

    /// The equivalent `tracing` filter.
    pub fn filter(self) -> LevelFilter {
        self.0
    }

    /// Returns true if events at `level` pass this threshold.
    pub fn enables(self, level: Level) -> bool {
        level <= self.0
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::TRACE
    }
}

impl From<LevelFilter> for LogLevel {
    fn from(filter: LevelFilter) -> Self {
        LogLevel(filter)
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        LogLevel(LevelFilter::from_level(level))
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    /// Parses a level name, ignoring ASCII case. `fatal` is an alias for `error`
    /// and `none` for `off`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::TRACE),
            "debug" => Ok(LogLevel::DEBUG),
            "info" => Ok(LogLevel::INFO),
            "warn" | "warning" => Ok(LogLevel::WARN),
            "error" | "fatal" => Ok(LogLevel::ERROR),
            "off" | "none" => Ok(LogLevel::OFF),
            _ => Err(ConfigError::decode(
                "LogLevel",
                format!("unknown log level `{}`", s.trim()),
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.0 == LevelFilter::OFF {
            "OFF"
        } else if self.0 == LevelFilter::ERROR {
            "ERROR"
        } else if self.0 == LevelFilter::WARN {
            "WARN"
        } else if self.0 == LevelFilter::INFO {
            "INFO"
        } else if self.0 == LevelFilter::DEBUG {
            "DEBUG"
        } else {
            "TRACE"
        };
        f.write_str(name)
    }
}

impl Codec for LogLevel {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        expect_scalar(node, "LogLevel")?.parse()
    }

    fn encode_node(&self) -> DocumentNode {
        DocumentNode::scalar(self.to_string())
    }

    fn decode(text: &str) -> Result<Self> {
        text.parse()
    }
}

/// Where a sink writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkKind {
    /// Standard output (`StdoutAppender`).
    Stdout,
    /// An append-only file (`FileLogAppender`).
    File {
        /// Destination file.
        path: PathBuf,
    },
}

/// One output of a logger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkDefinition {
    /// Destination.
    pub kind: SinkKind,
    /// Threshold of this sink; `None` defers to the logger.
    pub level: Option<LogLevel>,
    /// Format pattern of this sink; `None` defers to the logger.
    pub pattern: Option<String>,
}

impl SinkDefinition {
    /// A standard output sink with no overrides.
    pub fn stdout() -> Self {
        SinkDefinition {
            kind: SinkKind::Stdout,
            level: None,
            pattern: None,
        }
    }

    /// A file sink with no overrides.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        SinkDefinition {
            kind: SinkKind::File { path: path.into() },
            level: None,
            pattern: None,
        }
    }
}

impl Codec for SinkDefinition {
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        let kind_name: String = required_field(node, "type")?;
        let kind = match kind_name.as_str() {
            "StdoutAppender" => SinkKind::Stdout,
            "FileLogAppender" => {
                let path: String = optional_field(node, "file")?.unwrap_or_default();
                if path.is_empty() {
                    return Err(ConfigError::decode(
                        "SinkDefinition",
                        "FileLogAppender requires a `file`",
                    ));
                }
                SinkKind::File { path: path.into() }
            }
            other => {
                return Err(ConfigError::decode(
                    "SinkDefinition",
                    format!("unknown appender type `{}`", other),
                ))
            }
        };

        Ok(SinkDefinition {
            kind,
            level: level_field(node, "appender")?,
            pattern: optional_field(node, "formatter")?,
        })
    }

    fn encode_node(&self) -> DocumentNode {
        let mut fields = Vec::new();
        match &self.kind {
            SinkKind::Stdout => fields.push(("type", DocumentNode::scalar("StdoutAppender"))),
            SinkKind::File { path } => {
                fields.push(("type", DocumentNode::scalar("FileLogAppender")));
                fields.push(("file", DocumentNode::scalar(path.to_string_lossy())));
            }
        }
        if let Some(level) = self.level {
            fields.push(("level", level.encode_node()));
        }
        if let Some(pattern) = &self.pattern {
            fields.push(("formatter", pattern.encode_node()));
        }
        DocumentNode::mapping(fields)
    }
}

/// Reads the `level` field. An unknown level name is reported and enables
/// everything, so one typo does not reject the whole definition.
fn level_field(node: &DocumentNode, owner: &str) -> Result<Option<LogLevel>> {
    let text: Option<String> = optional_field(node, "level")?;
    Ok(text.map(|text| {
        text.parse().unwrap_or_else(|error: ConfigError| {
            tracing::warn!(owner, %error, "unknown log level, using TRACE");
            LogLevel::default()
        })
    }))
}

/// Settings of one named logger.
///
/// Two definitions are equal when name, level, pattern and every sink are equal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoggerDefinition {
    /// Logger name; never empty.
    pub name: String,
    /// Threshold; a missing `level` enables everything.
    pub level: LogLevel,
    /// Format pattern; `None` keeps the logger's current one.
    pub pattern: Option<String>,
    /// Outputs, in document order.
    pub sinks: Vec<SinkDefinition>,
}

impl LoggerDefinition {
    /// A definition with the given name and level and no sinks.
    pub fn new(name: impl Into<String>, level: LogLevel) -> Self {
        LoggerDefinition {
            name: name.into(),
            level,
            pattern: None,
            sinks: Vec::new(),
        }
    }
}

impl Codec for LoggerDefinition {
    /// Decodes a definition. A missing or empty `name` is an error; an appender
    /// that cannot be decoded is reported and left out.
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        let name: String = optional_field(node, "name")?.unwrap_or_default();
        if name.is_empty() {
            return Err(ConfigError::decode(
                "LoggerDefinition",
                "logger definition has no `name`",
            ));
        }

        let mut sinks = Vec::new();
        if let Some(appenders) = expect_mapping(node, "LoggerDefinition")?.get("appenders") {
            let items = match appenders {
                DocumentNode::Null => &[][..],
                DocumentNode::Sequence(items) => items.as_slice(),
                other => {
                    return Err(ConfigError::decode(
                        "LoggerDefinition",
                        format!("`appenders` must be a sequence, found a {}", other.kind()),
                    ))
                }
            };
            for (index, item) in items.iter().enumerate() {
                match SinkDefinition::decode_node(item) {
                    Ok(sink) => sinks.push(sink),
                    Err(error) => {
                        tracing::warn!(logger = %name, index, %error, "skipping invalid appender");
                    }
                }
            }
        }

        Ok(LoggerDefinition {
            level: level_field(node, &name)?.unwrap_or_default(),
            pattern: optional_field(node, "formatter")?,
            sinks,
            name,
        })
    }

    fn encode_node(&self) -> DocumentNode {
        let mut fields = vec![
            ("name", self.name.encode_node()),
            ("level", self.level.encode_node()),
        ];
        if let Some(pattern) = &self.pattern {
            fields.push(("formatter", pattern.encode_node()));
        }
        if !self.sinks.is_empty() {
            fields.push(("appenders", self.sinks.encode_node()));
        }
        DocumentNode::mapping(fields)
    }
}

/// The set of logger definitions held by the `logs` entry, keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoggerDefinitions(BTreeMap<String, LoggerDefinition>);

impl LoggerDefinitions {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `definition` unless one with the same name is present.
    ///
    /// Returns false if the name was already taken.
    pub fn insert(&mut self, definition: LoggerDefinition) -> bool {
        match self.0.entry(definition.name.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(definition);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// The definition named `name`.
    pub fn get(&self, name: &str) -> Option<&LoggerDefinition> {
        self.0.get(name)
    }

    /// Returns true if a definition named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no definitions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Definitions sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &LoggerDefinition> {
        self.0.values()
    }
}

impl FromIterator<LoggerDefinition> for LoggerDefinitions {
    fn from_iter<I: IntoIterator<Item = LoggerDefinition>>(iter: I) -> Self {
        let mut definitions = LoggerDefinitions::new();
        for definition in iter {
            definitions.insert(definition);
        }
        definitions
    }
}

impl Codec for LoggerDefinitions {
    /// Decodes a sequence of definitions. Any invalid definition fails the whole
    /// decode; a repeated name keeps the first definition.
    fn decode_node(node: &DocumentNode) -> Result<Self> {
        let mut definitions = LoggerDefinitions::new();
        for definition in Vec::<LoggerDefinition>::decode_node(node)? {
            let name = definition.name.clone();
            if !definitions.insert(definition) {
                tracing::warn!(logger = %name, "duplicate logger definition ignored");
            }
        }
        Ok(definitions)
    }

    fn encode_node(&self) -> DocumentNode {
        DocumentNode::sequence(self.iter().map(Codec::encode_node))
    }
}
