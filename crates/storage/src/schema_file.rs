//! Schema definition file loading
//!
//! A database directory holds a schema definition file listing, per line,
//! `table_name col1 col2 ...` (whitespace-separated), and a data
//! subdirectory containing one `<table_name>.csv` file per table.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::StorageError;

/// Schema definition file name within a database directory.
pub const SCHEMA_FILE: &str = "schema.txt";
/// Data subdirectory name within a database directory.
pub const DATA_DIR: &str = "data";

/// One table entry from the schema definition file.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<String>,
    /// Location of the table's CSV data file
    pub location: PathBuf,
}

/// Load all table definitions from `<db_dir>/schema.txt`.
///
/// Blank lines are skipped. Each remaining line must name a table followed
/// by at least one column.
pub fn load_schema_file(db_dir: &Path) -> Result<Vec<TableDef>, StorageError> {
    let schema_path = db_dir.join(SCHEMA_FILE);
    let file = File::open(&schema_path).map_err(|e| StorageError::io(&schema_path, &e))?;
    let reader = BufReader::new(file);

    let mut tables = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| StorageError::io(&schema_path, &e))?;
        let mut parts = line.split_whitespace();

        let name = match parts.next() {
            Some(name) => name.to_string(),
            None => continue, // blank line
        };
        let columns: Vec<String> = parts.map(|col| col.to_string()).collect();
        if columns.is_empty() {
            return Err(StorageError::SchemaParse {
                line: idx + 1,
                message: format!("table '{}' lists no columns", name),
            });
        }

        let location = db_dir.join(DATA_DIR).join(format!("{}.csv", name));
        tables.push(TableDef { name, columns, location });
    }

    Ok(tables)
}
