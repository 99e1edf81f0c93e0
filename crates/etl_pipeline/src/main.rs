use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dbf2sql::config::AppConfig;
use dbf2sql::loader::{LoadOptions, LoadReport, ScriptSink, SqlSink, SqliteSink, load_table};
use dbf2sql::prompt::{resolve_table_name, stdin_is_interactive};
use shared::{DbfSummary, DeletedRecordPolicy, NumericErrorPolicy, Table, TextEncoding};

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert a DBF file into a SQLite table")]
struct Args {
    /// DBF file to convert
    file: PathBuf,

    /// Config file (defaults to $DBF2SQL_CONFIG, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database to load into
    #[arg(long, conflicts_with_all = ["output", "stdout"])]
    database: Option<PathBuf>,

    /// Write a SQL script to this file instead of loading
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write a SQL script to stdout instead of loading
    #[arg(long)]
    stdout: bool,

    /// Target table name
    #[arg(short, long)]
    table: Option<String>,

    /// Rows per INSERT statement
    #[arg(long)]
    batch_size: Option<usize>,

    /// Keep an existing table instead of dropping it
    #[arg(long)]
    no_drop: bool,

    /// Text encoding of character fields (utf8 or latin1)
    #[arg(long)]
    encoding: Option<TextEncoding>,

    /// Leave out records marked as deleted
    #[arg(long)]
    skip_deleted: bool,

    /// Skip records with unparseable numeric fields instead of failing
    #[arg(long)]
    skip_bad_numeric: bool,

    /// Decode records on a single thread
    #[arg(long)]
    sequential: bool,

    /// Print a summary of the file and exit
    #[arg(long)]
    describe: bool,

    /// Print the summary as JSON
    #[arg(long, requires = "describe")]
    json: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.database {
            config.database.path = path.clone();
        }
        if let Some(table) = &self.table {
            config.table = Some(table.clone());
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        if self.no_drop {
            config.drop_existing = false;
        }
        if self.skip_deleted {
            config.deleted_records = DeletedRecordPolicy::Skip;
        }
        if self.skip_bad_numeric {
            config.numeric_errors = NumericErrorPolicy::SkipRecord;
        }
        if self.sequential {
            config.parallel = false;
        }
        if self.no_progress || self.stdout {
            config.progress = false;
        }
    }
}

fn run_load<S: SqlSink>(mut sink: S, table: &Table, options: &LoadOptions) -> Result<LoadReport> {
    load_table(&mut sink, table, options).with_context(|| format!("Failed to load table {}", options.table_name))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    let table = Table::from_path_async(&args.file, config.decode_config())
        .await
        .with_context(|| format!("Failed to decode {}", args.file.display()))?;

    if args.describe {
        let summary = DbfSummary::from_table(&table);
        if args.json {
            println!("{}", summary.to_json().context("Failed to serialize summary")?);
        } else {
            print!("{}", summary.to_text());
        }
        return Ok(());
    }

    let table_name = resolve_table_name(config.table.as_deref(), &args.file, stdin_is_interactive())?;
    let options = LoadOptions {
        table_name,
        batch_size: config.batch_size,
        drop_existing: config.drop_existing,
        progress: config.progress,
    };

    let report = if args.stdout {
        let stdout = std::io::stdout();
        run_load(ScriptSink::new(stdout.lock())?, &table, &options)?
    } else if let Some(path) = &args.output {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        run_load(ScriptSink::new(BufWriter::new(file))?, &table, &options)?
    } else {
        let sink = SqliteSink::open(&config.database.path)
            .with_context(|| format!("Failed to open database {}", config.database.path.display()))?;
        run_load(sink, &table, &options)?
    };

    if !args.stdout {
        let mut stderr = std::io::stderr();
        writeln!(
            stderr,
            "Wrote {} rows to table {} ({} statements)",
            report.rows_written, report.table, report.statements
        )?;
    }
    Ok(())
}
