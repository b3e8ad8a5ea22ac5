//! Storage - Tuples and CSV-backed table files
//!
//! This crate covers the on-disk side of the engine:
//! - the `Tuple` value type flowing through operators,
//! - the schema definition file (`table col1 col2 ...` per line),
//! - a line-streaming reader for `data/<table>.csv` integer files.

mod csv;
mod error;
mod schema_file;
mod tuple;

pub use csv::TupleReader;
pub use error::StorageError;
pub use schema_file::{load_schema_file, TableDef, DATA_DIR, SCHEMA_FILE};
pub use tuple::Tuple;
