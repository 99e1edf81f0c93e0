//! Field descriptor array decoding
//!
//! Descriptors start right after the 32-byte file header, one every 32 bytes,
//! until a `0x0D` terminator byte. Layout of one descriptor:
//!
//! | bytes   | content                                  |
//! |---------|------------------------------------------|
//! | 0..10   | name, NUL padded                         |
//! | 11      | type tag (`C`, `N`, ...)                 |
//! | 12..16  | displacement within the record (LE u32)  |
//! | 16      | field length                             |
//! | 17      | decimal count                            |

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::errors::FormatError;
use crate::models::bytes::{RawBytes, le_uint};
use crate::models::header::{HEADER_SIZE, Header};
use crate::models::reserved::ReservedWords;

pub const DESCRIPTOR_START: usize = HEADER_SIZE;
pub const DESCRIPTOR_SIZE: usize = 32;
pub const FIELD_NAME_LEN: usize = 10;

/// Byte that ends the descriptor array
pub const FIELD_TERMINATOR: u8 = 0x0D;

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Character,
    Numeric,
    /// Any other tag; decoded as text
    Other(char),
}

impl FieldType {
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            b'C' => FieldType::Character,
            b'N' => FieldType::Numeric,
            other => FieldType::Other(char::from(other)),
        }
    }

    pub fn tag(&self) -> char {
        match self {
            FieldType::Character => 'C',
            FieldType::Numeric => 'N',
            FieldType::Other(c) => *c,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Numeric)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Character => write!(f, "Character"),
            FieldType::Numeric => write!(f, "Numeric"),
            FieldType::Other(c) => write!(f, "Other({c})"),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.tag())
    }
}

/// One column as described on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Name used for output, after reserved word renaming
    pub name: String,
    /// Name exactly as stored in the file
    pub original_name: String,
    pub field_type: FieldType,
    /// Offset of the field inside a record
    pub displacement: u32,
    pub length: u8,
    pub decimal_count: u8,
}

impl FieldDescriptor {
    pub fn new(name: &str, field_type: FieldType, displacement: u32, length: u8) -> Self {
        Self {
            name: name.to_string(),
            original_name: name.to_string(),
            field_type,
            displacement,
            length,
            decimal_count: 0,
        }
    }

    /// Byte range of this field relative to the start of a record
    pub fn span(&self) -> std::ops::Range<usize> {
        let start = self.displacement as usize;
        start..start + usize::from(self.length)
    }

    pub fn was_renamed(&self) -> bool {
        self.name != self.original_name
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[FIELD] name: {}, type: {}, displacement: {}, length: {}",
            self.name,
            self.field_type.tag(),
            self.displacement,
            self.length
        )
    }
}

/// Decoded descriptor array plus where it ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBlock {
    pub fields: Vec<FieldDescriptor>,
    /// Absolute offset of the terminator byte
    pub terminator_offset: usize,
}

fn decode_name(bytes: &[u8], offset: usize) -> Result<String, FormatError> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let name = &bytes[..end];
    if name.is_empty() || !name.is_ascii() {
        return Err(FormatError::InvalidFieldName { offset });
    }
    let name = std::str::from_utf8(name).map_err(|_| FormatError::InvalidFieldName { offset })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(FormatError::InvalidFieldName { offset });
    }
    Ok(name.to_string())
}

fn decode_descriptor(bytes: &[u8], offset: usize, reserved: &ReservedWords) -> Result<FieldDescriptor, FormatError> {
    let original_name = decode_name(&bytes[..FIELD_NAME_LEN], offset)?;
    let name = reserved.rename(&original_name).into_owned();
    if name != original_name {
        log::debug!("Renamed reserved field {} to {}", original_name, name);
    }

    Ok(FieldDescriptor {
        name,
        original_name,
        field_type: FieldType::from_tag(bytes[11]),
        displacement: le_uint(&bytes[12..16]) as u32,
        length: bytes[16],
        decimal_count: bytes[17],
    })
}

/// Lay fields out back to back after the deletion flag when the file leaves
/// every displacement at zero (dBase III does).
fn resolve_displacements(fields: &mut [FieldDescriptor], record_length: usize) {
    if fields.is_empty() || fields.iter().any(|f| f.displacement != 0) {
        return;
    }
    let packed: usize = 1 + fields.iter().map(|f| usize::from(f.length)).sum::<usize>();
    if packed != record_length {
        return;
    }

    let mut next = 1u32;
    for field in fields.iter_mut() {
        field.displacement = next;
        next += u32::from(field.length);
    }
    log::debug!("Displacements absent, laid out {} fields sequentially", fields.len());
}

fn check_unique(fields: &[FieldDescriptor]) -> Result<(), FormatError> {
    let mut seen = HashSet::new();
    for (i, field) in fields.iter().enumerate() {
        if !seen.insert(field.name.to_ascii_uppercase()) {
            return Err(FormatError::DuplicateField {
                name: field.name.clone(),
                offset: DESCRIPTOR_START + i * DESCRIPTOR_SIZE,
            });
        }
    }
    Ok(())
}

fn check_within_record(fields: &[FieldDescriptor], header: &Header) -> Result<(), FormatError> {
    if header.record_count == 0 {
        return Ok(());
    }
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
    Ok(())
}

/// Walk the descriptor array of `raw`.
///
/// Names that collide with a word in `reserved` are renamed before they are
/// checked for uniqueness.
pub fn decode_fields(raw: &RawBytes, header: &Header, reserved: &ReservedWords) -> Result<FieldBlock, FormatError> {
    let mut fields = Vec::new();
    let mut cursor = DESCRIPTOR_START;

    loop {
        let missing = || FormatError::MissingTerminator {
            offset: raw.len(),
            terminator: FIELD_TERMINATOR,
        };
        match raw.u8_at(cursor) {
            None => return Err(missing()),
            Some(FIELD_TERMINATOR) => break,
            Some(_) => {}
        }
        let bytes = raw.get(cursor..cursor + DESCRIPTOR_SIZE).ok_or_else(missing)?;
        let field = decode_descriptor(bytes, cursor, reserved)?;
        log::trace!("{}", field);
        fields.push(field);
        cursor += DESCRIPTOR_SIZE;
    }

    if fields.is_empty() {
        log::warn!("DBF file declares no fields");
    }

    resolve_displacements(&mut fields, usize::from(header.record_length));
    check_unique(&fields)?;
    check_within_record(&fields, header)?;

    Ok(FieldBlock {
        fields,
        terminator_offset: cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(record_count: u32, record_length: u16) -> Header {
        Header {
            version: 0x03,
            last_update: None,
            record_count,
            first_record_offset: 0,
            record_length,
        }
    }

    fn descriptor(name: &str, tag: u8, displacement: u32, length: u8) -> Vec<u8> {
        let mut bytes = vec![0u8; DESCRIPTOR_SIZE];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        bytes[11] = tag;
        bytes[12..16].copy_from_slice(&displacement.to_le_bytes());
        bytes[16] = length;
        bytes
    }

    fn buffer(descriptors: &[Vec<u8>], terminator: Option<u8>) -> RawBytes {
        let mut bytes = vec![0u8; HEADER_SIZE];
        for d in descriptors {
            bytes.extend_from_slice(d);
        }
        if let Some(t) = terminator {
            bytes.push(t);
        }
        RawBytes::from_vec(bytes)
    }

    #[test]
    fn test_decode_in_disk_order() {
        let raw = buffer(
            &[descriptor("ID", b'N', 0, 4), descriptor("NAME", b'C', 4, 10)],
            Some(FIELD_TERMINATOR),
        );
        let block = decode_fields(&raw, &header(2, 20), &ReservedWords::sqlite()).unwrap();

        assert_eq!(block.terminator_offset, 96);
        assert_eq!(block.fields.len(), 2);
        assert_eq!(block.fields[0], FieldDescriptor::new("ID", FieldType::Numeric, 0, 4));
        assert_eq!(block.fields[1], FieldDescriptor::new("NAME", FieldType::Character, 4, 10));
    }

    #[test]
    fn test_displacement_is_little_endian() {
        let mut d = descriptor("WIDE", b'C', 0, 1);
        d[12..16].copy_from_slice(&[0xFF, 0x00, 0x00, 0x00]);
        let raw = buffer(&[d], Some(FIELD_TERMINATOR));
        let block = decode_fields(&raw, &header(0, 0), &ReservedWords::none()).unwrap();
        assert_eq!(block.fields[0].displacement, 255);
    }

    #[test]
    fn test_name_stops_at_nul() {
        let mut d = descriptor("AB", b'C', 1, 3);
        d[3] = b'Z'; // garbage after the NUL
        let raw = buffer(&[d], Some(FIELD_TERMINATOR));
        let block = decode_fields(&raw, &header(0, 0), &ReservedWords::none()).unwrap();
        assert_eq!(block.fields[0].name, "AB");
    }

    #[test]
    fn test_missing_terminator() {
        let raw = buffer(&[descriptor("ID", b'N', 0, 4)], None);
        let err = decode_fields(&raw, &header(0, 0), &ReservedWords::none()).unwrap_err();
        assert_eq!(err, FormatError::MissingTerminator { offset: 64, terminator: 0x0D });
    }

    #[test]
    fn test_newline_is_not_a_terminator() {
        let raw = buffer(&[descriptor("ID", b'N', 0, 4)], Some(b'\n'));
        let err = decode_fields(&raw, &header(0, 0), &ReservedWords::none()).unwrap_err();
        assert!(matches!(err, FormatError::MissingTerminator { .. }));
    }

    #[test]
    fn test_empty_field_list() {
        let raw = buffer(&[], Some(FIELD_TERMINATOR));
        let block = decode_fields(&raw, &header(0, 1), &ReservedWords::none()).unwrap();
        assert!(block.fields.is_empty());
        assert_eq!(block.terminator_offset, DESCRIPTOR_START);
    }

    #[test]
    fn test_reserved_word_is_renamed() {
        let raw = buffer(
            &[descriptor("order", b'N', 0, 4), descriptor("NAME", b'C', 4, 10)],
            Some(FIELD_TERMINATOR),
        );
        let block = decode_fields(&raw, &header(1, 14), &ReservedWords::sqlite()).unwrap();
        assert_eq!(block.fields[0].name, "F_order");
        assert_eq!(block.fields[0].original_name, "order");
        assert!(block.fields[0].was_renamed());
        assert!(!block.fields[1].was_renamed());
    }

    #[test]
    fn test_duplicate_names_case_insensitive() {
        let raw = buffer(
            &[descriptor("NAME", b'C', 0, 4), descriptor("name", b'C', 4, 4)],
            Some(FIELD_TERMINATOR),
        );
        let err = decode_fields(&raw, &header(1, 8), &ReservedWords::none()).unwrap_err();
        assert_eq!(
            err,
            FormatError::DuplicateField {
                name: "name".to_string(),
                offset: 64
            }
        );
    }

    #[test]
    fn test_renamed_name_collision() {
        let raw = buffer(
            &[descriptor("F_KEY", b'C', 0, 4), descriptor("KEY", b'C', 4, 4)],
            Some(FIELD_TERMINATOR),
        );
        let err = decode_fields(&raw, &header(1, 8), &ReservedWords::sqlite()).unwrap_err();
        assert!(matches!(err, FormatError::DuplicateField { ref name, .. } if name == "F_KEY"));
    }

    #[test]
    fn test_blank_name_rejected() {
        let raw = buffer(&[descriptor("", b'C', 0, 4)], Some(FIELD_TERMINATOR));
        let err = decode_fields(&raw, &header(0, 0), &ReservedWords::none()).unwrap_err();
        assert_eq!(err, FormatError::InvalidFieldName { offset: 32 });
    }

    #[test]
    fn test_field_outside_record() {
        let raw = buffer(&[descriptor("NAME", b'C', 4, 20)], Some(FIELD_TERMINATOR));
        let err = decode_fields(&raw, &header(1, 10), &ReservedWords::none()).unwrap_err();
        assert!(matches!(err, FormatError::FieldOutsideRecord { start: 4, end: 24, .. }));
    }

    #[test]
    fn test_zero_displacements_are_laid_out() {
        let raw = buffer(
            &[descriptor("ID", b'N', 0, 4), descriptor("NAME", b'C', 0, 10)],
            Some(FIELD_TERMINATOR),
        );
        let block = decode_fields(&raw, &header(3, 15), &ReservedWords::none()).unwrap();
        assert_eq!(block.fields[0].span(), 1..5);
        assert_eq!(block.fields[1].span(), 5..15);
    }

    #[test]
    fn test_single_zero_displacement_field_follows_flag() {
        // One field at 0 filling all but one byte reads as a dBase III file
        let raw = buffer(&[descriptor("CITY", b'C', 0, 10)], Some(FIELD_TERMINATOR));
        let block = decode_fields(&raw, &header(1, 11), &ReservedWords::none()).unwrap();
        assert_eq!(block.fields[0].span(), 1..11);

        // Filling the whole record it keeps its stored displacement
        let block = decode_fields(&raw, &header(1, 10), &ReservedWords::none()).unwrap();
        assert_eq!(block.fields[0].span(), 0..10);
    }

    #[test]
    fn test_unknown_tag_kept() {
        let raw = buffer(&[descriptor("BORN", b'D', 0, 8)], Some(FIELD_TERMINATOR));
        let block = decode_fields(&raw, &header(0, 0), &ReservedWords::none()).unwrap();
        assert_eq!(block.fields[0].field_type, FieldType::Other('D'));
        assert_eq!(block.fields[0].field_type.tag(), 'D');
    }
}
