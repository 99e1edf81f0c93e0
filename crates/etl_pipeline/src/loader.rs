//! Executing generated SQL against a target

use std::io::Write;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use serde::Serialize;
use shared::Table;

use crate::error::{EtlError, EtlResult};
use crate::sql::{create_table_sql, drop_table_sql, insert_statements};

/// Somewhere SQL statements go. Statements between creation and
/// [`SqlSink::commit`] form one transaction.
pub trait SqlSink {
    fn execute(&mut self, sql: &str) -> EtlResult<()>;
    fn commit(&mut self) -> EtlResult<()>;
}

/// A SQLite database, written inside a single transaction
pub struct SqliteSink {
    conn: Connection,
    open_transaction: bool,
}

impl SqliteSink {
    pub fn open<P: AsRef<Path>>(path: P) -> EtlResult<Self> {
        log::debug!("Opening SQLite database {}", path.as_ref().display());
        Self::begin(Connection::open(path)?)
    }

    pub fn in_memory() -> EtlResult<Self> {
        Self::begin(Connection::open_in_memory()?)
    }

    fn begin(conn: Connection) -> EtlResult<Self> {
        conn.execute_batch("BEGIN TRANSACTION;")?;
        Ok(Self {
            conn,
            open_transaction: true,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SqlSink for SqliteSink {
    fn execute(&mut self, sql: &str) -> EtlResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn commit(&mut self) -> EtlResult<()> {
        if self.open_transaction {
            self.conn.execute_batch("COMMIT;")?;
            self.open_transaction = false;
        }
        Ok(())
    }
}

impl Drop for SqliteSink {
    fn drop(&mut self) {
        if self.open_transaction {
            log::warn!("Rolling back uncommitted SQLite transaction");
            if let Err(e) = self.conn.execute_batch("ROLLBACK;") {
                log::warn!("Failed to roll back SQLite transaction: {}", e);
            }
        }
    }
}

/// Writes statements as a SQL script
pub struct ScriptSink<W: Write> {
    writer: W,
    committed: bool,
}

impl<W: Write> ScriptSink<W> {
    pub fn new(mut writer: W) -> EtlResult<Self> {
        writeln!(writer, "BEGIN TRANSACTION;")?;
        Ok(Self {
            writer,
            committed: false,
        })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SqlSink for ScriptSink<W> {
    fn execute(&mut self, sql: &str) -> EtlResult<()> {
        writeln!(self.writer, "{sql}")?;
        Ok(())
    }

    fn commit(&mut self) -> EtlResult<()> {
        if !self.committed {
            writeln!(self.writer, "COMMIT;")?;
            self.committed = true;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// How a table is written
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub table_name: String,
    pub batch_size: usize,
    pub drop_existing: bool,
    pub progress: bool,
}

/// Outcome of loading one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub table: String,
    pub rows_written: usize,
    pub statements: usize,
}

fn progress_bar(rows: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(rows as u64);
    let style = ProgressStyle::with_template("{msg} [{elapsed_precise}] [{wide_bar}] {pos}/{len} rows")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Create the target table, insert every row and commit
pub fn load_table<S: SqlSink>(sink: &mut S, table: &Table, options: &LoadOptions) -> EtlResult<LoadReport> {
    let name = options.table_name.as_str();
    let schema = table.schema();
    if schema.is_empty() {
        return Err(EtlError::EmptySchema {
            table: name.to_string(),
        });
    }
    let batch_size = options.batch_size.max(1);
    let mut statements = 0;

    if options.drop_existing {
        sink.execute(&drop_table_sql(name))?;
        statements += 1;
    }
    sink.execute(&create_table_sql(name, &schema))?;
    statements += 1;

    let pb = progress_bar(table.len(), options.progress);
    pb.set_message(format!("Loading {name}"));
    let mut rows_written = 0;
    for insert in insert_statements(name, table, batch_size) {
        sink.execute(&insert)?;
        statements += 1;
        let written = batch_size.min(table.len() - rows_written);
        rows_written += written;
        pb.inc(written as u64);
    }
    sink.commit()?;
    pb.finish_and_clear();

    log::info!("Loaded {} rows into {} ({} statements)", rows_written, name, statements);
    Ok(LoadReport {
        table: name.to_string(),
        rows_written,
        statements,
    })
}
