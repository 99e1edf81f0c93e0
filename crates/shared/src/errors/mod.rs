use std::io;

use thiserror::Error;

/// Centralized error type for DBF decoding
#[derive(Error, Debug)]
pub enum DbfError {
    #[error("I/O error with {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Format error: {0}")]
    Format(#[from] FormatError),
}

impl DbfError {
    pub fn io_error<P: AsRef<str>>(err: io::Error, path: P) -> Self {
        Self::Io {
            path: path.as_ref().to_string(),
            source: err,
        }
    }

    /// The underlying format error, if this is one
    pub fn as_format(&self) -> Option<&FormatError> {
        match self {
            DbfError::Format(e) => Some(e),
            DbfError::Io { .. } => None,
        }
    }
}

impl From<io::Error> for DbfError {
    fn from(value: io::Error) -> Self {
        Self::io_error(value, "unknown source")
    }
}

/// Structural or content problems in a DBF buffer.
///
/// Every variant carries enough position information (byte offset, field
/// name, record index) to locate the problem in the source file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("header too short: {len} bytes, need at least {required}")]
    HeaderTooShort { len: usize, required: usize },

    #[error("field descriptor terminator 0x{terminator:02X} not found (buffer ends at byte {offset})")]
    MissingTerminator { offset: usize, terminator: u8 },

    #[error("invalid field name in descriptor at byte {offset}")]
    InvalidFieldName { offset: usize },

    #[error("duplicate field name {name} in descriptor at byte {offset}")]
    DuplicateField { name: String, offset: usize },

    #[error("field {field} spans bytes {start}..{end} of a {record_length}-byte record")]
    FieldOutsideRecord {
        field: String,
        start: usize,
        end: usize,
        record_length: usize,
    },

    #[error("{records} records of {record_length} bytes end at byte {expected_end}, buffer length is {len}")]
    RecordRegionTruncated {
        records: u32,
        record_length: u16,
        expected_end: u64,
        len: usize,
    },

    #[error("record {record}, field {field}: bytes {start}..{end} exceed buffer length {len}")]
    RecordOutOfBounds {
        record: usize,
        field: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("record {record}, field {field} at byte {offset}: cannot parse {raw:?} as integer")]
    InvalidNumeric {
        record: usize,
        field: String,
        offset: usize,
        raw: String,
    },

    #[error("record {record}, field {field} at byte {offset}: {message}")]
    InvalidText {
        record: usize,
        field: String,
        offset: usize,
        message: String,
    },

    #[error("field {field}: value {value:?} does not fit in {length} bytes")]
    ValueTooWide {
        field: String,
        value: String,
        length: usize,
    },
}

impl FormatError {
    /// Record index the error refers to, for record-level errors
    pub fn record(&self) -> Option<usize> {
        match self {
            FormatError::RecordOutOfBounds { record, .. }
            | FormatError::InvalidNumeric { record, .. }
            | FormatError::InvalidText { record, .. } => Some(*record),
            _ => None,
        }
    }
}

/// Alias for fallible operations in the shared crate
pub type DbfResult<T> = Result<T, DbfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            DbfError::io_error(io::Error::new(io::ErrorKind::NotFound, "gone"), "/data/sys.dbf"),
            FormatError::HeaderTooShort { len: 3, required: 12 }.into(),
            FormatError::MissingTerminator { offset: 64, terminator: 0x0D }.into(),
            FormatError::InvalidNumeric {
                record: 4,
                field: "ID".to_string(),
                offset: 225,
                raw: "".to_string(),
            }
            .into(),
        ];

        for err in errors {
            assert!(!format!("{err}").is_empty());
        }
    }

    #[test]
    fn test_io_error_keeps_path() {
        let err = DbfError::io_error(io::Error::new(io::ErrorKind::NotFound, "gone"), "/data/sys.dbf");
        assert!(matches!(&err, DbfError::Io { path, .. } if path == "/data/sys.dbf"));
        assert!(err.to_string().contains("/data/sys.dbf"));
        assert!(err.as_format().is_none());
    }

    #[test]
    fn test_missing_terminator_message_is_hex() {
        let err = FormatError::MissingTerminator { offset: 64, terminator: 0x0D };
        assert!(err.to_string().contains("0x0D"));
    }

    #[test]
    fn test_record_index() {
        let err = FormatError::RecordOutOfBounds {
            record: 7,
            field: "NAME".to_string(),
            start: 300,
            end: 310,
            len: 305,
        };
        assert_eq!(err.record(), Some(7));
        assert_eq!(FormatError::HeaderTooShort { len: 0, required: 12 }.record(), None);

        let truncated = FormatError::RecordRegionTruncated {
            records: 3,
            record_length: 10,
            expected_end: 63,
            len: 33,
        };
        assert_eq!(truncated.record(), None);
        assert!(truncated.to_string().contains("byte 63"));
    }
}
