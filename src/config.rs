//! Connection configuration loaded from a JSON file.
//!
//! ```json
//! {
//!   "url": "https://erp.example.com",
//!   "username": "admin@example.com",
//!   "api_key": "...",
//!   "db": "production"
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Connection parameters for a server.
///
/// Absent and `null` keys deserialize as empty strings and are then
/// rejected by [`ConnectionConfig::validate`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the server, without the `/xmlrpc/2/...` suffix.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    /// API key (or password) of `username`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub api_key: String,
    /// Database (tenant) name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub db: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ConnectionConfig {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        api_key: impl Into<String>,
        db: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            api_key: api_key.into(),
            db: db.into(),
        }
    }

    /// Check required fields in order: url, username, api_key, db.
    ///
    /// Returns the first missing field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("url", &self.url),
            ("username", &self.username),
            ("api_key", &self.api_key),
            ("db", &self.db),
        ];

        for (field, value) in fields {
            if value.is_empty() {
                return Err(Error::Validation { field });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .field("db", &self.db)
            .finish()
    }
}

/// Load and validate a configuration file.
///
/// # Errors
///
/// - `Error::Io` if the file cannot be read
/// - `Error::Parse` if it is not a JSON object with string fields
/// - `Error::Validation` for the first empty required field
pub fn load_config(path: impl AsRef<Path>) -> Result<ConnectionConfig> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: ConnectionConfig = serde_json::from_str(&data).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    config.validate()?;
    Ok(config)
}

/// Conventional location of the config file.
///
/// Resolution order:
/// 1. `<config dir>/odoo-connector/config.json` (`~/.config` on Linux,
///    `~/Library/Application Support` on macOS)
/// 2. `./config.json` (fallback)
///
/// Nothing reads this path implicitly; pass it to [`load_config`] or
/// [`Connector::from_config`](crate::Connector::from_config).
pub fn default_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("odoo-connector").join("config.json");
    }

    PathBuf::from("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(
            r#"{"url": "https://erp.example.com", "username": "u", "api_key": "k", "db": "d"}"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config, ConnectionConfig::new("https://erp.example.com", "u", "k", "d"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let file = write_config(
            r#"{"url": "http://x", "username": "u", "api_key": "k", "db": "d", "timeout": 5}"#,
        );
        assert!(load_config(file.path()).is_ok());
    }

    #[test]
    fn test_each_empty_field_fails_validation() {
        let cases = [
            (r#"{"url": "", "username": "u", "api_key": "k", "db": "d"}"#, "url"),
            (r#"{"url": "http://x", "username": "", "api_key": "k", "db": "d"}"#, "username"),
            (r#"{"url": "http://x", "username": "u", "api_key": "", "db": "d"}"#, "api_key"),
            (r#"{"url": "http://x", "username": "u", "api_key": "k", "db": ""}"#, "db"),
        ];

        for (contents, expected) in cases {
            let file = write_config(contents);
            match load_config(file.path()) {
                Err(Error::Validation { field }) => assert_eq!(field, expected),
                other => panic!("Expected validation error for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_null_field_fails_validation() {
        let cases = [
            (r#"{"url": null, "username": "u", "api_key": "k", "db": "d"}"#, "url"),
            (r#"{"url": "http://x", "username": null, "api_key": "k", "db": "d"}"#, "username"),
            (r#"{"url": "http://x", "username": "u", "api_key": null, "db": "d"}"#, "api_key"),
            (r#"{"url": "http://x", "username": "u", "api_key": "k", "db": null}"#, "db"),
        ];

        for (contents, expected) in cases {
            let file = write_config(contents);
            match load_config(file.path()) {
                Err(Error::Validation { field }) => assert_eq!(field, expected),
                other => panic!("Expected validation error for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_validation_reports_first_missing_field() {
        let file = write_config(r#"{"api_key": "k"}"#);
        match load_config(file.path()) {
            Err(Error::Validation { field }) => assert_eq!(field, "url"),
            other => panic!("Expected validation error, got {:?}", other),
        }

        let config = ConnectionConfig::new("http://x", "", "", "");
        assert!(matches!(
            config.validate(),
            Err(Error::Validation { field: "username" })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("absent.json"), "{}", err);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        for contents in ["not json", r#"{"url": 5}"#, "42"] {
            let file = write_config(contents);
            let err = load_config(file.path()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parse, "{}", contents);
        }
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ConnectionConfig::new("http://x", "u", "secret-key", "d");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_default_config_path_format() {
        let path = default_config_path();
        assert_eq!(path.file_name().unwrap(), "config.json");
    }
}
