//! Loading decoded DBF tables into SQLite
//!
//! The decoding itself lives in the `shared` crate; this crate turns a
//! [`shared::Table`] into SQL text and runs it against a [`loader::SqlSink`].
//!
//! ```no_run
//! use dbf2sql::config::AppConfig;
//! use dbf2sql::loader::{LoadOptions, SqliteSink, load_table};
//! use shared::Table;
//!
//! # fn main() -> dbf2sql::error::EtlResult<()> {
//! let config = AppConfig::default();
//! let table = Table::from_path("CLIENTES.DBF", &config.decode_config())?;
//! let mut sink = SqliteSink::open(&config.database.path)?;
//! let options = LoadOptions {
//!     table_name: "clientes".to_string(),
//!     batch_size: config.batch_size,
//!     drop_existing: config.drop_existing,
//!     progress: false,
//! };
//! let report = load_table(&mut sink, &table, &options)?;
//! println!("{} rows written", report.rows_written);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod prompt;
pub mod sql;

pub use config::AppConfig;
pub use error::{EtlError, EtlResult};
pub use loader::{LoadOptions, LoadReport, ScriptSink, SqlSink, SqliteSink, load_table};
