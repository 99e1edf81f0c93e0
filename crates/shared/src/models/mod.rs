pub mod bytes;
pub mod header;
pub mod reserved;
pub mod text;
pub mod field;
pub mod record;
pub mod table;
pub mod encode;
pub mod describe;

pub use bytes::{RawBytes, le_uint};
pub use header::{Header, decode_header};
pub use reserved::ReservedWords;
pub use text::TextEncoding;
pub use field::{FieldBlock, FieldDescriptor, FieldType, FIELD_TERMINATOR, decode_fields};
pub use record::{DecodeConfig, DeletedRecordPolicy, NumericErrorPolicy, RecordLayout, Row, Value, decode_records};
pub use table::{Column, ColumnKind, Table};
pub use encode::encode_table;
pub use describe::{DbfFieldInfo, DbfSummary};
