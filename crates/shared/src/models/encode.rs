//! Writing a table back into the DBF layout it was decoded from

use chrono::Datelike;

use crate::errors::FormatError;
use crate::models::field::{DESCRIPTOR_SIZE, DESCRIPTOR_START, FIELD_NAME_LEN, FIELD_TERMINATOR, FieldDescriptor};
use crate::models::header::{DBASE_DATE_BASE_YEAR, HEADER_SIZE, Header};
use crate::models::record::{DELETED_FLAG, RecordLayout, Row, Value};
use crate::models::table::Table;
use crate::models::text::TextEncoding;

/// End-of-file marker written after the last record
pub const EOF_MARKER: u8 = 0x1A;

fn encode_header(header: &Header, out: &mut [u8]) {
    out[0] = header.version;
    if let Some(date) = header.last_update {
        let years = date.year() - DBASE_DATE_BASE_YEAR;
        if (0..=255).contains(&years) {
            out[1] = years as u8;
            out[2] = date.month() as u8;
            out[3] = date.day() as u8;
        }
    }
    out[4..8].copy_from_slice(&header.record_count.to_le_bytes());
    out[8..10].copy_from_slice(&header.first_record_offset.to_le_bytes());
    out[10..12].copy_from_slice(&header.record_length.to_le_bytes());
}

fn encode_descriptor(field: &FieldDescriptor) -> Result<[u8; DESCRIPTOR_SIZE], FormatError> {
    let mut out = [0u8; DESCRIPTOR_SIZE];
    let name = field.original_name.as_bytes();
    if name.len() > FIELD_NAME_LEN {
        return Err(FormatError::ValueTooWide {
            field: field.name.clone(),
            value: field.original_name.clone(),
            length: FIELD_NAME_LEN,
        });
    }
    out[..name.len()].copy_from_slice(name);
    out[11] = field.field_type.tag() as u8;
    out[12..16].copy_from_slice(&field.displacement.to_le_bytes());
    out[16] = field.length;
    out[17] = field.decimal_count;
    Ok(out)
}

fn encode_value(value: &Value, field: &FieldDescriptor, encoding: TextEncoding) -> Result<Vec<u8>, FormatError> {
    let width = usize::from(field.length);
    let too_wide = || FormatError::ValueTooWide {
        field: field.name.clone(),
        value: value.to_string(),
        length: width,
    };

    let bytes = match value {
        Value::Integer(n) => format!("{n:>width$}").into_bytes(),
        Value::Text(s) => {
            let mut bytes = encoding.encode(s).map_err(|_| too_wide())?;
            if bytes.len() < width {
                bytes.resize(width, b' ');
            }
            bytes
        }
    };
    if bytes.len() > width {
        return Err(too_wide());
    }
    Ok(bytes)
}

fn encode_row(row: &Row, layout: &RecordLayout<'_>, encoding: TextEncoding, out: &mut [u8]) -> Result<(), FormatError> {
    out.fill(b' ');
    if layout.has_deletion_flag() && row.deleted {
        out[0] = DELETED_FLAG;
    }
    for (field, value) in layout.fields.iter().zip(&row.values) {
        let bytes = encode_value(value, field, encoding)?;
        out[field.span()].copy_from_slice(&bytes);
    }
    Ok(())
}

/// Encode `table` with its own header and descriptors.
///
/// The record count written is the number of rows held, so tables decoded
/// with a skipping policy produce a consistent file.
pub fn encode_table(table: &Table, encoding: TextEncoding) -> Result<Vec<u8>, FormatError> {
    let mut header = *table.header();
    header.record_count = table.len() as u32;

    let fields = table.fields();
    let terminator_offset = DESCRIPTOR_START + fields.len() * DESCRIPTOR_SIZE;
    let region_start = header.record_region_start(terminator_offset);
    let record_length = usize::from(header.record_length);

    for field in fields {
        let span = field.span();
        if span.end > record_length {
            return Err(FormatError::FieldOutsideRecord {
                field: field.name.clone(),
                start: span.start,
                end: span.end,
                record_length,
            });
        }
    }

    let mut out = vec![0u8; region_start + table.len() * record_length + 1];
    encode_header(&header, &mut out[..HEADER_SIZE]);
    for (i, field) in fields.iter().enumerate() {
        let at = DESCRIPTOR_START + i * DESCRIPTOR_SIZE;
        out[at..at + DESCRIPTOR_SIZE].copy_from_slice(&encode_descriptor(field)?);
    }
    out[terminator_offset] = FIELD_TERMINATOR;

    let layout = RecordLayout {
        header: &header,
        fields,
        region_start,
    };
    for (i, row) in table.records().iter().enumerate() {
        let at = layout.record_offset(i);
        encode_row(row, &layout, encoding, &mut out[at..at + record_length])?;
    }
    out[region_start + table.len() * record_length] = EOF_MARKER;

    Ok(out)
}
