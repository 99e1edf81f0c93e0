use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::FormatError;
use crate::models::bytes::RawBytes;
use crate::models::field::FieldDescriptor;
use crate::models::header::Header;
use crate::models::reserved::ReservedWords;
use crate::models::text::{TextEncoding, trim_padding};

/// Marker byte of a deleted record
pub const DELETED_FLAG: u8 = b'*';

/// A decoded cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

/// One record, values in field order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub values: Vec<Value>,
    /// Whether the record carried the deletion marker
    pub deleted: bool,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values, deleted: false }
    }
}

/// What to do with records flagged as deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletedRecordPolicy {
    /// Keep them, with `Row::deleted` set
    #[default]
    Include,
    Skip,
}

/// What to do with a numeric field that does not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericErrorPolicy {
    /// Fail the whole conversion
    #[default]
    Abort,
    /// Drop the record and log it
    SkipRecord,
}

/// Options for decoding a DBF buffer
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    pub encoding: TextEncoding,
    pub deleted_records: DeletedRecordPolicy,
    pub numeric_errors: NumericErrorPolicy,
    /// Reserved words of the target dialect
    pub reserved_words: ReservedWords,
    /// Decode records on the rayon pool
    pub parallel: bool,
    /// Minimum record count before going parallel
    pub parallel_threshold: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::Utf8,
            deleted_records: DeletedRecordPolicy::Include,
            numeric_errors: NumericErrorPolicy::Abort,
            reserved_words: ReservedWords::sqlite(),
            parallel: true,
            parallel_threshold: 10_000,
        }
    }
}

/// Position of the record region and the fields inside each record
#[derive(Debug, Clone, Copy)]
pub struct RecordLayout<'a> {
    pub header: &'a Header,
    pub fields: &'a [FieldDescriptor],
    /// Absolute offset of record 0
    pub region_start: usize,
}

impl RecordLayout<'_> {
    /// Byte 0 holds the deletion flag unless a field claims it
    pub fn has_deletion_flag(&self) -> bool {
        self.fields.iter().all(|f| f.displacement >= 1)
    }

    pub fn record_offset(&self, index: usize) -> usize {
        self.region_start + index * usize::from(self.header.record_length)
    }
}

/// Decode one field slice into a value
pub fn decode_value(
    bytes: &[u8],
    field: &FieldDescriptor,
    record: usize,
    offset: usize,
    encoding: TextEncoding,
) -> Result<Value, FormatError> {
    let text = encoding.decode(bytes).map_err(|message| FormatError::InvalidText {
        record,
        field: field.name.clone(),
        offset,
        message,
    })?;
    let trimmed = trim_padding(&text);

    if field.field_type.is_numeric() {
        trimmed
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| FormatError::InvalidNumeric {
                record,
                field: field.name.clone(),
                offset,
                raw: trimmed.to_string(),
            })
    } else if trimmed.contains('\0') {
        // Embedded NULs are dropped
        Ok(Value::Text(trimmed.replace('\0', "")))
    } else {
        Ok(Value::Text(trimmed.to_string()))
    }
}

/// Decode record `index`. `Ok(None)` means the record was skipped by policy.
pub fn decode_record(
    raw: &RawBytes,
    layout: &RecordLayout<'_>,
    index: usize,
    config: &DecodeConfig,
) -> Result<Option<Row>, FormatError> {
    let cursor = layout.record_offset(index);

    let deleted = layout.has_deletion_flag() && raw.u8_at(cursor) == Some(DELETED_FLAG);
    if deleted && config.deleted_records == DeletedRecordPolicy::Skip {
        log::debug!("Skipping deleted record {}", index);
        return Ok(None);
    }

    let mut values = Vec::with_capacity(layout.fields.len());
    for field in layout.fields {
        let span = field.span();
        let start = cursor + span.start;
        let end = cursor + span.end;
        let bytes = raw.get(start..end).ok_or_else(|| FormatError::RecordOutOfBounds {
            record: index,
            field: field.name.clone(),
            start,
            end,
            len: raw.len(),
        })?;

        match decode_value(bytes, field, index, start, config.encoding) {
            Ok(value) => values.push(value),
            Err(e @ FormatError::InvalidNumeric { .. })
                if config.numeric_errors == NumericErrorPolicy::SkipRecord =>
            {
                log::warn!("Skipping record: {}", e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Some(Row { values, deleted }))
}

/// Every declared record must lie inside the buffer, whether or not a field
/// covers its last bytes
fn check_region(raw: &RawBytes, layout: &RecordLayout<'_>) -> Result<(), FormatError> {
    let expected_end = layout.region_start as u64 + layout.header.record_region_len();
    if expected_end > raw.len() as u64 {
        return Err(FormatError::RecordRegionTruncated {
            records: layout.header.record_count,
            record_length: layout.header.record_length,
            expected_end,
            len: raw.len(),
        });
    }
    Ok(())
}

/// Decode every record the header declares, in file order
pub fn decode_records(
    raw: &RawBytes,
    layout: &RecordLayout<'_>,
    config: &DecodeConfig,
) -> Result<Vec<Row>, FormatError> {
    check_region(raw, layout)?;
    let count = layout.header.record_count as usize;

    let decoded: Vec<Option<Row>> = if config.parallel && count >= config.parallel_threshold {
        log::debug!("Decoding {} records in parallel", count);
        (0..count)
            .into_par_iter()
            .map(|i| decode_record(raw, layout, i, config))
            .collect::<Result<_, _>>()?
    } else {
        (0..count)
            .map(|i| decode_record(raw, layout, i, config))
            .collect::<Result<_, _>>()?
    };

    let rows: Vec<Row> = decoded.into_iter().flatten().collect();
    if rows.len() != count {
        log::info!("Decoded {} of {} records", rows.len(), count);
    }
    Ok(rows)
}
