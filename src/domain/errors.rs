// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration registry.
//!
//! Only [`ConfigError::InvalidName`] is ever returned to abort a caller. Every other
//! variant describes a condition that arises from untrusted document input and is
//! reported through `tracing` and recovered locally by the registry.

use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;
use thiserror::Error;

/// The main error type for configuration operations.
///
/// This enum is marked as `#[non_exhaustive]` to allow for future additions
/// without breaking backwards compatibility.
///
/// # Examples
///
/// ```
/// use cfgvar::domain::errors::ConfigError;
///
/// let error = ConfigError::InvalidName {
///     name: "Bad-Name!".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid configuration name: Bad-Name!");
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A configuration entry was declared with a name outside `[a-z0-9_.]+`.
    #[error("Invalid configuration name: {name}")]
    InvalidName {
        /// The rejected name, as given by the caller
        name: String,
    },

    /// An entry exists under the name but holds a different value type.
    #[error("Configuration entry '{name}' has type {actual}, not {expected}")]
    TypeMismatch {
        /// The entry name
        name: String,
        /// The type the caller asked for
        expected: String,
        /// The type the entry was declared with
        actual: String,
    },

    /// A document node could not be decoded into the requested type.
    #[error("Failed to decode {target_type}: {message}")]
    DecodeError {
        /// The target type name
        target_type: String,
        /// What was wrong with the input
        message: String,
    },

    /// Failed to convert document text into the value type of a named entry.
    #[error(
        "Failed to convert configuration value for key '{key}' to type {target_type}: {source}"
    )]
    TypeConversionError {
        /// The entry being updated
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A document key does not form a legal configuration path.
    #[error("Invalid configuration path in document: {path}")]
    FlattenNameError {
        /// The dotted path that was rejected
        path: String,
    },

    /// Failed to parse document text.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error occurred while loading a document source.
    #[error("Configuration source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error occurred in a configuration watcher.
    #[error("Configuration watcher error: {message}")]
    WatcherError {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a `DecodeError` for `target_type`.
    pub fn decode(target_type: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::DecodeError {
            target_type: target_type.into(),
            message: message.into(),
        }
    }

    /// Creates a `DecodeError` from a `ParseIntError`.
    pub fn from_parse_int_error(target_type: &str, input: &str, err: ParseIntError) -> Self {
        Self::decode(target_type, format!("'{}' is not an integer: {}", input, err))
    }

    /// Creates a `DecodeError` from a `ParseFloatError`.
    pub fn from_parse_float_error(target_type: &str, input: &str, err: ParseFloatError) -> Self {
        Self::decode(target_type, format!("'{}' is not a float: {}", input, err))
    }

    /// Creates a `DecodeError` from a `ParseBoolError`.
    pub fn from_parse_bool_error(input: &str, err: ParseBoolError) -> Self {
        Self::decode("bool", format!("'{}' is not a boolean: {}", input, err))
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_name_error() {
        let error = ConfigError::InvalidName {
            name: "Bad-Name!".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid configuration name: Bad-Name!");
    }

    #[test]
    fn test_type_mismatch_error() {
        let error = ConfigError::TypeMismatch {
            name: "system.port".to_string(),
            expected: "f32".to_string(),
            actual: "i32".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration entry 'system.port' has type i32, not f32"
        );
    }

    #[test]
    fn test_type_conversion_error() {
        let source_error = ConfigError::decode("i32", "bad input");
        let error = ConfigError::TypeConversionError {
            key: "test.key".to_string(),
            target_type: "i32".to_string(),
            source: Box::new(source_error),
        };
        assert!(error.to_string().contains("test.key"));
        assert!(error.to_string().contains("i32"));
        assert!(error.to_string().contains("bad input"));
    }

    #[test]
    fn test_flatten_name_error() {
        let error = ConfigError::FlattenNameError {
            path: "server.Bad-Key".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration path in document: server.Bad-Key"
        );
    }

    #[test]
    fn test_source_error() {
        let error = ConfigError::SourceError {
            source_name: "yaml-file".to_string(),
            message: "Failed to read file".to_string(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "Configuration source 'yaml-file' error: Failed to read file"
        );
    }

    #[test]
    fn test_parse_error() {
        let error = ConfigError::ParseError {
            message: "Invalid YAML".to_string(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration: Invalid YAML"
        );
    }

    #[test]
    fn test_watcher_error() {
        let error = ConfigError::WatcherError {
            message: "File watcher failed".to_string(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "Configuration watcher error: File watcher failed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = ConfigError::from(io_error);
        assert!(matches!(error, ConfigError::IoError(_)));
    }

    #[test]
    fn test_from_parse_int_error() {
        let parse_err = "not_a_number".parse::<i32>().unwrap_err();
        let error = ConfigError::from_parse_int_error("i32", "not_a_number", parse_err);
        assert!(matches!(error, ConfigError::DecodeError { .. }));
        assert!(error.to_string().contains("not_a_number"));
        assert!(error.to_string().contains("i32"));
    }

    #[test]
    fn test_from_parse_float_error() {
        let parse_err = "not_a_float".parse::<f64>().unwrap_err();
        let error = ConfigError::from_parse_float_error("f64", "not_a_float", parse_err);
        assert!(matches!(error, ConfigError::DecodeError { .. }));
        assert!(error.to_string().contains("float"));
    }

    #[test]
    fn test_from_parse_bool_error() {
        let parse_err = "not_a_bool".parse::<bool>().unwrap_err();
        let error = ConfigError::from_parse_bool_error("not_a_bool", parse_err);
        assert!(matches!(error, ConfigError::DecodeError { .. }));
        assert!(error.to_string().contains("boolean"));
    }
}
