//! SQLite statement text for a decoded table

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use shared::{Column, ColumnKind, Row, Table, Value};

/// Characters not allowed in a generated table name
static NON_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("Invalid regex pattern for identifiers"));

/// Table name used when nothing usable is left after sanitizing
pub const FALLBACK_TABLE_NAME: &str = "dbf_table";

pub fn sql_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Integer => "INTEGER",
        ColumnKind::Text => "TEXT",
    }
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

pub fn sql_value(value: &Value) -> String {
    match value {
        Value::Integer(n) => n.to_string(),
        Value::Text(s) => quote_literal(s),
    }
}

pub fn drop_table_sql(table_name: &str) -> String {
    format!("DROP TABLE IF EXISTS {};", quote_identifier(table_name))
}

pub fn create_table_sql(table_name: &str, schema: &[Column]) -> String {
    let columns = schema
        .iter()
        .map(|c| format!("{} {}", quote_identifier(&c.name), sql_type(c.kind)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({});", quote_identifier(table_name), columns)
}

fn column_list(schema: &[Column]) -> String {
    schema
        .iter()
        .map(|c| quote_identifier(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn insert_for(table_name: &str, columns: &str, rows: &[Row]) -> String {
    let values = rows
        .iter()
        .map(|row| {
            let cells = row.values.iter().map(sql_value).collect::<Vec<_>>().join(", ");
            format!("({cells})")
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} ({}) VALUES {};", quote_identifier(table_name), columns, values)
}

/// Multi-row INSERT statements for every row of `table`, `batch_size` rows
/// per statement. Nothing is produced for a table without columns.
pub fn insert_statements<'a>(
    table_name: &'a str,
    table: &'a Table,
    batch_size: usize,
) -> impl Iterator<Item = String> + 'a {
    let schema = table.schema();
    let columns = column_list(&schema);
    let rows = if schema.is_empty() { &[][..] } else { table.records() };
    rows.chunks(batch_size.max(1))
        .map(move |chunk| insert_for(table_name, &columns, chunk))
}

/// Turn an arbitrary string into a lowercase SQL identifier
pub fn sanitize_table_name(raw: &str) -> String {
    let cleaned = NON_IDENTIFIER.replace_all(raw.trim(), "_");
    let cleaned = cleaned.trim_matches('_').to_ascii_lowercase();
    if cleaned.is_empty() {
        return FALLBACK_TABLE_NAME.to_string();
    }
    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("t_{cleaned}");
    }
    cleaned
}

/// Table name derived from a file's stem
pub fn default_table_name<P: AsRef<Path>>(path: P) -> String {
    let stem = path
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    sanitize_table_name(&stem)
}
