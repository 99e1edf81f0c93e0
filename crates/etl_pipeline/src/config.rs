//! Configuration file handling
//!
//! Settings come from a JSON file. Every key is optional; missing keys take
//! the defaults below and CLI flags are applied on top by the binary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::{DecodeConfig, DeletedRecordPolicy, NumericErrorPolicy, ReservedWords, TextEncoding};

use crate::error::{EtlError, EtlResult};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "DBF2SQL_CONFIG";

/// Target database connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dbf2sql.sqlite"),
        }
    }
}

/// Configuration for a conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    /// Target table name; prompted for when absent
    pub table: Option<String>,
    /// Rows per INSERT statement
    pub batch_size: usize,
    /// Whether to drop an existing table of the same name first
    pub drop_existing: bool,
    pub encoding: TextEncoding,
    pub deleted_records: DeletedRecordPolicy,
    pub numeric_errors: NumericErrorPolicy,
    /// Whether to decode large files in parallel
    pub parallel: bool,
    /// Whether to show a progress bar while loading
    pub progress: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            table: None,
            batch_size: 500,
            drop_existing: true,
            encoding: TextEncoding::Utf8,
            deleted_records: DeletedRecordPolicy::Include,
            numeric_errors: NumericErrorPolicy::Abort,
            parallel: true,
            progress: true,
        }
    }
}

impl AppConfig {
    pub fn from_json_str(json: &str, origin: &str) -> EtlResult<Self> {
        serde_json::from_str(json).map_err(|e| EtlError::config(origin, e.to_string()))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> EtlResult<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| EtlError::config(&origin, e.to_string()))?;
        let config = Self::from_json_str(&json, &origin)?;
        log::info!("Loaded config from {}", origin);
        Ok(config)
    }

    /// Load the config file found by [`locate`], or the defaults
    pub fn load(explicit: Option<&Path>) -> EtlResult<Self> {
        let env_value = std::env::var_os(CONFIG_ENV_VAR);
        match locate(explicit, env_value, dirs::config_dir()) {
            Some(path) => Self::from_path(path),
            None => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Decoder options derived from this config
    pub fn decode_config(&self) -> DecodeConfig {
        DecodeConfig {
            encoding: self.encoding,
            deleted_records: self.deleted_records,
            numeric_errors: self.numeric_errors,
            reserved_words: ReservedWords::sqlite(),
            parallel: self.parallel,
            ..Default::default()
        }
    }
}

/// Pick the config file to read.
///
/// An explicit path always wins and must exist. Then the environment
/// variable, then `<config_dir>/dbf2sql/config.json` if present.
pub fn locate(explicit: Option<&Path>, env_value: Option<OsString>, config_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(value));
    }
    config_dir
        .map(|dir| dir.join("dbf2sql").join("config.json"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.batch_size, 500);
        assert!(config.drop_existing);
        assert_eq!(config.table, None);
        assert_eq!(config.database.path, PathBuf::from("dbf2sql.sqlite"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(
            r#"{ "database": { "path": "/srv/legacy.db" }, "encoding": "latin1", "numeric_errors": "skip_record" }"#,
            "inline",
        )
        .unwrap();
        assert_eq!(config.database.path, PathBuf::from("/srv/legacy.db"));
        assert_eq!(config.encoding, TextEncoding::Latin1);
        assert_eq!(config.numeric_errors, NumericErrorPolicy::SkipRecord);
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.deleted_records, DeletedRecordPolicy::Include);
    }

    #[test]
    fn test_invalid_json_names_origin() {
        let err = AppConfig::from_json_str("{ batch_size: }", "/etc/dbf2sql.json").unwrap_err();
        assert!(matches!(err, EtlError::Config { ref path, .. } if path == "/etc/dbf2sql.json"));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = AppConfig::from_json_str(r#"{ "deleted_records": "maybe" }"#, "inline").unwrap_err();
        assert!(matches!(err, EtlError::Config { .. }));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "table": "people", "batch_size": 10, "drop_existing": false }}"#).unwrap();

        let config = AppConfig::from_path(file.path()).unwrap();
        assert_eq!(config.table.as_deref(), Some("people"));
        assert_eq!(config.batch_size, 10);
        assert!(!config.drop_existing);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = AppConfig::from_path("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, EtlError::Config { .. }));
    }

    #[test]
    fn test_locate_order() {
        let dir = tempfile::tempdir().unwrap();
        let default_path = dir.path().join("dbf2sql").join("config.json");
        std::fs::create_dir_all(default_path.parent().unwrap()).unwrap();
        std::fs::write(&default_path, "{}").unwrap();

        let explicit = PathBuf::from("/tmp/explicit.json");
        assert_eq!(
            locate(Some(&explicit), Some("/tmp/env.json".into()), Some(dir.path().to_path_buf())),
            Some(explicit)
        );
        assert_eq!(
            locate(None, Some("/tmp/env.json".into()), Some(dir.path().to_path_buf())),
            Some(PathBuf::from("/tmp/env.json"))
        );
        assert_eq!(
            locate(None, Some("".into()), Some(dir.path().to_path_buf())),
            Some(default_path)
        );
        assert_eq!(locate(None, None, Some(PathBuf::from("/nonexistent"))), None);
        assert_eq!(locate(None, None, None), None);
    }

    #[test]
    fn test_decode_config() {
        let config = AppConfig {
            encoding: TextEncoding::Latin1,
            parallel: false,
            deleted_records: DeletedRecordPolicy::Skip,
            ..Default::default()
        };
        let decode = config.decode_config();
        assert_eq!(decode.encoding, TextEncoding::Latin1);
        assert!(!decode.parallel);
        assert_eq!(decode.deleted_records, DeletedRecordPolicy::Skip);
        assert!(decode.reserved_words.is_reserved("select"));
    }
}
