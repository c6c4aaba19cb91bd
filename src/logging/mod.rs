// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logger configuration driven by the registry.
//!
//! The `logs` entry holds a set of [`LoggerDefinition`]s. A [`LoggerManager`] installed
//! on a registry keeps a table of live logger settings in step with that entry, so a
//! reloaded document reconfigures loggers without a restart.

pub mod definition;
pub mod manager;

pub use definition::{LogLevel, LoggerDefinition, LoggerDefinitions, SinkDefinition, SinkKind};
pub use manager::{LoggerManager, LoggerSettings, DEFAULT_PATTERN, LOGS_ENTRY, ROOT_LOGGER};
