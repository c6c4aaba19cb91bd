// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration key newtype with name normalization and validation.
//!
//! Every configuration entry is addressed by a dotted, lowercase name such as
//! `system.port`. Declared names and document keys must already be lowercase;
//! only lookups of existing entries lowercase the requested name.

use crate::domain::errors::{ConfigError, Result};
use std::fmt;

/// A validated, normalized configuration entry name.
///
/// # Examples
///
/// ```
/// use cfgvar::domain::config_key::ConfigKey;
///
/// let key = ConfigKey::parse("system.port").unwrap();
/// assert_eq!(key.as_str(), "system.port");
///
/// assert!(ConfigKey::parse("System.Port").is_err());
/// assert!(ConfigKey::parse("Bad-Name!").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Validates `name`.
    ///
    /// The name must be non-empty and consist only of `[a-z0-9_.]`. Upper-case
    /// letters are violations too. Violations are rejected rather than truncated.
    ///
    /// # Examples
    ///
    /// ```
    /// use cfgvar::domain::config_key::ConfigKey;
    ///
    /// assert!(ConfigKey::parse("logs").is_ok());
    /// assert!(ConfigKey::parse("").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() || !Self::is_valid_name(name) {
            return Err(ConfigError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(ConfigKey(name.to_string()))
    }

    /// Lowercases `name` without validating it, for looking up existing entries.
    pub fn normalize(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    /// Returns true if every character of `name` is in `[a-z0-9_.]`.
    ///
    /// The empty string is valid here; the flattener relies on this for the
    /// document root.
    pub fn is_valid_name(name: &str) -> bool {
        name.bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.'))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
