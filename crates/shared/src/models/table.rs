//! The decoded table handed to SQL emission

use std::path::Path;

use serde::Serialize;

use crate::errors::{DbfError, DbfResult};
use crate::models::bytes::RawBytes;
use crate::models::field::{FieldDescriptor, decode_fields};
use crate::models::header::{Header, decode_header};
use crate::models::record::{DecodeConfig, RecordLayout, Row, Value, decode_records};

/// Kind of an output column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Integer,
}

/// One column of the schema view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl From<&FieldDescriptor> for Column {
    fn from(field: &FieldDescriptor) -> Self {
        let kind = if field.field_type.is_numeric() {
            ColumnKind::Integer
        } else {
            ColumnKind::Text
        };
        Column {
            name: field.name.clone(),
            kind,
        }
    }
}

/// Decoded header, fields and rows of one DBF file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    header: Header,
    fields: Vec<FieldDescriptor>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(header: Header, fields: Vec<FieldDescriptor>, rows: Vec<Row>) -> Self {
        Self { header, fields, rows }
    }

    /// Decode a complete DBF buffer
    pub fn decode(raw: &RawBytes, config: &DecodeConfig) -> DbfResult<Self> {
        let header = decode_header(raw)?;
        let block = decode_fields(raw, &header, &config.reserved_words)?;
        let layout = RecordLayout {
            header: &header,
            fields: &block.fields,
            region_start: header.record_region_start(block.terminator_offset),
        };
        let rows = decode_records(raw, &layout, config)?;

        log::info!("Decoded {} fields and {} rows", block.fields.len(), rows.len());
        Ok(Self {
            header,
            fields: block.fields,
            rows,
        })
    }

    /// Read and decode a DBF file
    pub fn from_path<P: AsRef<Path>>(path: P, config: &DecodeConfig) -> DbfResult<Self> {
        let raw = RawBytes::from_path(path)?;
        Self::decode(&raw, config)
    }

    /// Read a DBF file asynchronously and decode it on the blocking pool
    pub async fn from_path_async<P: AsRef<Path>>(path: P, config: DecodeConfig) -> DbfResult<Self> {
        let raw = RawBytes::from_path_async(path.as_ref()).await?;
        let display = path.as_ref().display().to_string();
        tokio::task::spawn_blocking(move || Self::decode(&raw, &config))
            .await
            .map_err(|e| DbfError::io_error(std::io::Error::other(format!("Task join error: {e}")), display))?
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Ordered (name, kind) pairs
    pub fn schema(&self) -> Vec<Column> {
        self.fields.iter().map(Column::from).collect()
    }

    /// Values of each row in schema order
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.rows.iter().map(|r| r.values.as_slice())
    }

    pub fn records(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Value of column `name` in row `row`
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let column = self.column_index(name)?;
        self.rows.get(row)?.values.get(column)
    }

    /// (name, value) pairs of row `row` in column order
    pub fn row_entries(&self, row: usize) -> Option<impl Iterator<Item = (&str, &Value)> + '_> {
        let row = self.rows.get(row)?;
        Some(self.fields.iter().map(|f| f.name.as_str()).zip(row.values.iter()))
    }
}
