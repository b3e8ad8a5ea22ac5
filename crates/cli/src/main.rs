use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

mod writer;

use catalog::Catalog;
use executor::SelectExecutor;
use storage::load_schema_file;

#[derive(Parser, Debug)]
#[command(name = "csvql")]
#[command(version)]
#[command(about = "Run a SQL SELECT query over a CSV-backed database directory")]
#[command(long_about = "csvql - embedded SELECT engine over integer CSV tables

The database directory must contain a schema.txt file listing, per line,
a table name followed by its column names, and a data/ subdirectory with
one <table>.csv file per table.

EXAMPLES:
  # Query text on the command line
  csvql ./db \"SELECT A, D FROM Student WHERE D > 30\" --output results.txt

  # Query text from a file
  csvql ./db --file query.sql --output results.txt")]
struct Args {
    /// Database directory (schema.txt + data/*.csv)
    #[arg(value_name = "DB_DIR")]
    db_dir: PathBuf,

    /// SQL SELECT statement to execute
    #[arg(value_name = "QUERY", conflicts_with = "file")]
    query: Option<String>,

    /// Read the SQL statement from a file instead
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// File to write result rows to (one line per row)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let sql = match (&args.query, &args.file) {
        (Some(query), None) => query.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read query file '{}'", path.display()))?,
        (None, None) => bail!("no query given: pass SQL text or --file"),
        (Some(_), Some(_)) => unreachable!("clap rejects query together with --file"),
    };

    let mut catalog = Catalog::new();
    for table in load_schema_file(&args.db_dir)
        .with_context(|| format!("failed to load schema from '{}'", args.db_dir.display()))?
    {
        catalog
            .register_base(&table.name, table.columns, table.location)
            .with_context(|| format!("invalid schema entry for table '{}'", table.name))?;
    }

    let stmt = parser::parse_select(&sql).context("failed to parse query")?;
    let rows = SelectExecutor::new(&mut catalog)
        .execute(&stmt)
        .context("query execution failed")?;

    let count = writer::write_rows(&args.output, &rows)?;
    println!("Wrote {} rows to '{}'", count, args.output.display());
    Ok(())
}
