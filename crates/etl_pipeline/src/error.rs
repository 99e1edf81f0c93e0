use shared::DbfError;
use thiserror::Error;

/// Errors raised while turning a DBF file into SQL
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Decode error: {0}")]
    Decode(#[from] DbfError),

    #[error("Connection error: {0}")]
    Connection(#[from] rusqlite::Error),

    #[error("Config error in {path}: {message}")]
    Config { path: String, message: String },

    #[error("Table {table} has no columns to create")]
    EmptySchema { table: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtlError {
    pub fn config<P: AsRef<str>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Config {
            path: path.as_ref().to_string(),
            message: message.into(),
        }
    }
}

pub type EtlResult<T> = Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_stay_distinct() {
        let decode: EtlError = DbfError::from(shared::FormatError::HeaderTooShort { len: 1, required: 12 }).into();
        assert!(matches!(decode, EtlError::Decode(_)));

        let connection: EtlError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(connection, EtlError::Connection(_)));

        let config = EtlError::config("/etc/dbf2sql.json", "expected value");
        assert_eq!(config.to_string(), "Config error in /etc/dbf2sql.json: expected value");

        let empty = EtlError::EmptySchema {
            table: "sys".to_string(),
        };
        assert_eq!(empty.to_string(), "Table sys has no columns to create");
    }
}
