use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::FormatError;
use crate::models::bytes::RawBytes;

/// Size of the fixed file header that precedes the field descriptors
pub const HEADER_SIZE: usize = 32;

/// Minimum number of bytes needed to read the record count, first record
/// offset and record length
pub const HEADER_MIN_LEN: usize = 12;

/// dBase stores the year of last update as an offset from 1900
pub const DBASE_DATE_BASE_YEAR: i32 = 1900;

/// File-level values from the first bytes of a DBF file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Version / file type byte
    pub version: u8,
    /// Date of last update, when bytes 1-3 hold a valid date
    pub last_update: Option<NaiveDate>,
    /// Number of records (bytes 4-7)
    pub record_count: u32,
    /// Offset of the record region as stored on disk (bytes 8-9)
    pub first_record_offset: u16,
    /// Width of one record in bytes (bytes 10-11)
    pub record_length: u16,
}

impl Header {
    /// Byte offset of the first record given where the descriptor
    /// terminator was found.
    ///
    /// Records never start before the byte after the terminator, even if the
    /// stored offset says otherwise.
    pub fn record_region_start(&self, terminator_offset: usize) -> usize {
        let after_terminator = terminator_offset + 1;
        let declared = usize::from(self.first_record_offset);
        if declared < after_terminator {
            log::debug!(
                "Declared first record offset {} precedes descriptor end {}; using {}",
                declared,
                after_terminator,
                after_terminator
            );
        }
        declared.max(after_terminator)
    }

    /// Byte size of the record region the header declares
    pub fn record_region_len(&self) -> u64 {
        u64::from(self.record_count) * u64::from(self.record_length)
    }
}

fn decode_last_update(raw: &RawBytes) -> Option<NaiveDate> {
    let year = DBASE_DATE_BASE_YEAR + i32::from(raw.u8_at(1)?);
    NaiveDate::from_ymd_opt(year, u32::from(raw.u8_at(2)?), u32::from(raw.u8_at(3)?))
}

/// Decode the header fields from the start of `raw`
pub fn decode_header(raw: &RawBytes) -> Result<Header, FormatError> {
    let too_short = || FormatError::HeaderTooShort {
        len: raw.len(),
        required: HEADER_MIN_LEN,
    };
    if raw.len() < HEADER_MIN_LEN {
        return Err(too_short());
    }

    let header = Header {
        version: raw.u8_at(0).ok_or_else(too_short)?,
        last_update: decode_last_update(raw),
        record_count: raw.u32_le_at(4).ok_or_else(too_short)?,
        first_record_offset: raw.u16_le_at(8).ok_or_else(too_short)?,
        record_length: raw.u16_le_at(10).ok_or_else(too_short)?,
    };
    log::debug!(
        "DBF header: version 0x{:02X}, {} records of {} bytes from offset {}",
        header.version,
        header.record_count,
        header.record_length,
        header.first_record_offset
    );
    Ok(header)
}
