//! Interactive table-name prompt

use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;

use crate::error::EtlResult;
use crate::sql::{default_table_name, sanitize_table_name};

/// Ask for a table name, offering `default`. An empty answer or end of
/// input keeps the default; anything else is sanitized.
pub fn prompt_table_name<R: BufRead, W: Write>(mut input: R, mut output: W, default: &str) -> EtlResult<String> {
    write!(output, "Table name [{default}]: ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(default.to_string());
    }
    Ok(sanitize_table_name(answer))
}

/// Table name for `path`: the configured name if any, else a prompt when
/// running interactively, else the name derived from the file stem.
pub fn resolve_table_name<P: AsRef<Path>>(configured: Option<&str>, path: P, interactive: bool) -> EtlResult<String> {
    if let Some(name) = configured {
        return Ok(name.to_string());
    }
    let default = default_table_name(path);
    if !interactive {
        log::debug!("Using table name {}", default);
        return Ok(default);
    }
    let stdin = std::io::stdin();
    prompt_table_name(stdin.lock(), std::io::stderr(), &default)
}

/// Whether stdin is attached to a terminal
pub fn stdin_is_interactive() -> bool {
    std::io::stdin().is_terminal()
}
