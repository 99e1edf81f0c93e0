//! Whole-file byte access for DBF decoding

use std::ops::Range;
use std::path::Path;

use crate::errors::{DbfError, DbfResult};

/// Reassemble a little-endian unsigned integer: each byte is shifted by
/// `8 * index` and OR-ed into the result.
pub fn le_uint(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, b)| acc | (u64::from(*b) << (8 * i)))
}

/// The complete, immutable contents of a DBF file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBytes {
    data: Vec<u8>,
}

impl RawBytes {
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Load a whole file into memory
    pub fn from_path<P: AsRef<Path>>(path: P) -> DbfResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| DbfError::io_error(e, path.display().to_string()))?;
        log::debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(Self { data })
    }

    /// Asynchronously load a whole file into memory
    pub async fn from_path_async<P: AsRef<Path>>(path: P) -> DbfResult<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| DbfError::io_error(e, path.display().to_string()))?;
        log::debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Bytes in `range`, or `None` when the range leaves the buffer
    pub fn get(&self, range: Range<usize>) -> Option<&[u8]> {
        self.data.get(range)
    }

    pub fn u8_at(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }

    pub fn u16_le_at(&self, offset: usize) -> Option<u16> {
        self.get(offset..offset.checked_add(2)?).map(|b| le_uint(b) as u16)
    }

    pub fn u32_le_at(&self, offset: usize) -> Option<u32> {
        self.get(offset..offset.checked_add(4)?).map(|b| le_uint(b) as u32)
    }
}

impl From<Vec<u8>> for RawBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

impl AsRef<[u8]> for RawBytes {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
