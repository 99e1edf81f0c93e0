//! Decoding of dBase (DBF) files into typed, ordered tables.
//!
//! ```no_run
//! use shared::{DecodeConfig, Table};
//!
//! let table = Table::from_path("sys.dbf", &DecodeConfig::default())?;
//! for column in table.schema() {
//!     println!("{} {:?}", column.name, column.kind);
//! }
//! # Ok::<(), shared::DbfError>(())
//! ```

pub mod errors;
pub mod models;

pub use errors::*;
pub use models::*;
