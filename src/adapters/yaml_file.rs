// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML file document source adapter.
//!
//! This module provides a parser for YAML text and an adapter that reads a YAML
//! file from disk each time it is loaded.

use crate::domain::{ConfigError, DocumentNode, Result};
use crate::ports::{DocumentParser, DocumentSource};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum allowed file size for YAML configuration files (10MB)
const MAX_YAML_FILE_SIZE: u64 = 10 * 1024 * 1024;

const SOURCE_NAME: &str = "yaml-file";

/// YAML parser implementation.
///
/// # Examples
///
/// ```rust
/// use cfgvar::adapters::YamlParser;
/// use cfgvar::domain::DocumentNode;
/// use cfgvar::ports::DocumentParser;
///
/// let parser = YamlParser::new();
/// let root = parser.parse("database:\n  host: localhost\n  port: 5432").unwrap();
/// assert_eq!(
///     root.get("database").and_then(|db| db.get("port")),
///     Some(&DocumentNode::scalar("5432"))
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }
}

impl DocumentParser for YamlParser {
    fn parse(&self, content: &str) -> Result<DocumentNode> {
        DocumentNode::parse(content)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

/// Document source for a YAML file.
///
/// The path is checked when the adapter is created; the file itself is read on every
/// [`load`](DocumentSource::load), so the adapter always reflects the file's current
/// content.
///
/// # Examples
///
/// ```rust,no_run
/// use cfgvar::adapters::YamlFileAdapter;
/// use cfgvar::ports::DocumentSource;
///
/// // Load from a specific file
/// let adapter = YamlFileAdapter::from_file("/path/to/config.yaml").unwrap();
/// let root = adapter.load().unwrap();
///
/// // Load from default OS location
/// let adapter = YamlFileAdapter::from_default_location("myapp", "com.example").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct YamlFileAdapter {
    file_path: PathBuf,
    parser: YamlParser,
}

impl YamlFileAdapter {
    /// Creates an adapter for the file at `path`.
    ///
    /// The path is canonicalized and the file must exist, be within the size limit,
    /// and currently parse as YAML.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use cfgvar::adapters::YamlFileAdapter;
    ///
    /// let adapter = YamlFileAdapter::from_file("/etc/myapp/config.yaml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref();

        // Canonicalize path to prevent directory traversal attacks
        let canonical_path = file_path
            .canonicalize()
            .map_err(|e| source_error(format!("Invalid or inaccessible path: {}", display_name(file_path)), e))?;

        let adapter = Self {
            file_path: canonical_path,
            parser: YamlParser::new(),
        };
        adapter.load()?;
        Ok(adapter)
    }

    /// Creates an adapter for `config.yaml` in the OS-appropriate configuration
    /// directory of the application.
    ///
    /// # Arguments
    ///
    /// * `app_name` - The application name (e.g., "myapp")
    /// * `qualifier` - The organization/qualifier (e.g., "com.example")
    pub fn from_default_location(app_name: &str, qualifier: &str) -> Result<Self> {
        Self::with_filename(app_name, qualifier, "config.yaml")
    }

    /// Creates an adapter for `filename` in the OS-appropriate configuration directory.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use cfgvar::adapters::YamlFileAdapter;
    ///
    /// let adapter = YamlFileAdapter::with_filename("myapp", "com.example", "settings.yaml").unwrap();
    /// ```
    pub fn with_filename(app_name: &str, qualifier: &str, filename: &str) -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| ConfigError::SourceError {
                source_name: SOURCE_NAME.to_string(),
                message: "Failed to determine project directories".to_string(),
                source: None,
            })?;

        Self::from_file(proj_dirs.config_dir().join(filename))
    }

    /// Returns the canonical path of the configuration file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn read(&self) -> Result<String> {
        // Check file size before reading to prevent DoS via large files
        let metadata = fs::metadata(&self.file_path).map_err(|e| {
            source_error(
                format!("Failed to read file metadata: {}", display_name(&self.file_path)),
                e,
            )
        })?;

        if metadata.len() > MAX_YAML_FILE_SIZE {
            return Err(ConfigError::SourceError {
                source_name: SOURCE_NAME.to_string(),
                message: format!(
                    "Configuration file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_YAML_FILE_SIZE
                ),
                source: None,
            });
        }

        fs::read_to_string(&self.file_path).map_err(|e| {
            source_error(
                format!("Failed to read configuration file: {}", display_name(&self.file_path)),
                e,
            )
        })
    }
}

impl DocumentSource for YamlFileAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn load(&self) -> Result<DocumentNode> {
        let content = self.read()?;
        self.parser.parse(&content)
    }
}

fn source_error(message: String, error: std::io::Error) -> ConfigError {
    ConfigError::SourceError {
        source_name: SOURCE_NAME.to_string(),
        message,
        source: Some(Box::new(error)),
    }
}

fn display_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_yaml_parser_nested() {
        let parser = YamlParser::new();
        let yaml = r#"
app:
  database:
    connection:
      host: localhost
      port: 5432
"#;
        let root = parser.parse(yaml).unwrap();
        let connection = root
            .get("app")
            .and_then(|n| n.get("database"))
            .and_then(|n| n.get("connection"))
            .unwrap();

        assert_eq!(connection.get("host"), Some(&DocumentNode::scalar("localhost")));
        assert_eq!(connection.get("port"), Some(&DocumentNode::scalar("5432")));
    }

    #[test]
    fn test_yaml_parser_keeps_sequences() {
        let parser = YamlParser::new();
        let root = parser.parse("servers:\n  - server1\n  - server2\n").unwrap();
        assert_eq!(root.get("servers").unwrap().as_sequence().unwrap().len(), 2);
    }

    #[test]
    fn test_yaml_parser_invalid() {
        let parser = YamlParser::new();
        assert!(matches!(
            parser.parse("invalid: yaml: content:"),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_yaml_parser_supported_extensions() {
        let parser = YamlParser::default();
        assert_eq!(parser.supported_extensions(), &["yaml", "yml"]);
        assert!(parser.supports_extension("YML"));
    }

    #[test]
    fn test_yaml_adapter_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "database:\n  host: localhost\n  port: 5432").unwrap();

        let adapter = YamlFileAdapter::from_file(temp_file.path()).unwrap();
        assert_eq!(adapter.name(), "yaml-file");

        let root = adapter.load().unwrap();
        assert_eq!(
            root.get("database").and_then(|db| db.get("host")),
            Some(&DocumentNode::scalar("localhost"))
        );
    }

    #[test]
    fn test_yaml_adapter_load_reads_current_content() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        fs::write(&path, "key: initial_value\n").unwrap();

        let adapter = YamlFileAdapter::from_file(&path).unwrap();
        assert_eq!(
            adapter.load().unwrap().get("key"),
            Some(&DocumentNode::scalar("initial_value"))
        );

        fs::write(&path, "key: updated_value\n").unwrap();
        assert_eq!(
            adapter.load().unwrap().get("key"),
            Some(&DocumentNode::scalar("updated_value"))
        );
    }

    #[test]
    fn test_yaml_adapter_load_reports_broken_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        fs::write(&path, "key: value\n").unwrap();
        let adapter = YamlFileAdapter::from_file(&path).unwrap();

        fs::write(&path, "key: [unclosed\n").unwrap();
        assert!(matches!(adapter.load(), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_yaml_adapter_rejects_invalid_yaml_up_front() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "invalid: yaml: content:").unwrap();
        assert!(YamlFileAdapter::from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_yaml_adapter_file_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "key: value").unwrap();

        let adapter = YamlFileAdapter::from_file(temp_file.path()).unwrap();
        assert_eq!(adapter.file_path(), temp_file.path().canonicalize().unwrap());
    }

    #[test]
    fn test_yaml_adapter_nonexistent_file() {
        let result = YamlFileAdapter::from_file("/nonexistent/path/to/config.yaml");
        assert!(matches!(result, Err(ConfigError::SourceError { .. })));
    }

    #[test]
    fn test_yaml_adapter_too_large() {
        let temp_file = NamedTempFile::new().unwrap();
        let file = temp_file.as_file();
        file.set_len(MAX_YAML_FILE_SIZE + 1).unwrap();

        let err = YamlFileAdapter::from_file(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
