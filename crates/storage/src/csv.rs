//! Line-streaming CSV reader for integer data files
//!
//! One row per line, comma-separated integers, optional whitespace around
//! values. The reader owns its file handle: opened at construction, closed
//! at EOF, reopened from the start on `reset()`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::{StorageError, Tuple};

/// Streaming reader producing one `Tuple` per data file line.
pub struct TupleReader {
    path: PathBuf,
    arity: usize,
    reader: Option<BufReader<File>>,
    line: usize,
}

impl TupleReader {
    /// Open the data file at `path`, expecting `arity` values per row.
    pub fn open(path: &Path, arity: usize) -> Result<Self, StorageError> {
        let file = File::open(path).map_err(|e| StorageError::io(path, &e))?;
        Ok(TupleReader {
            path: path.to_path_buf(),
            arity,
            reader: Some(BufReader::new(file)),
            line: 0,
        })
    }

    /// Read the next row, or `None` at end of file.
    ///
    /// EOF closes the underlying reader; blank lines are skipped.
    pub fn next_tuple(&mut self) -> Result<Option<Tuple>, StorageError> {
        loop {
            let reader = match self.reader.as_mut() {
                Some(reader) => reader,
                None => return Ok(None), // already exhausted
            };

            let mut buf = String::new();
            let read = reader
                .read_line(&mut buf)
                .map_err(|e| StorageError::io(&self.path, &e))?;
            if read == 0 {
                self.reader = None;
                return Ok(None);
            }

            self.line += 1;
            let trimmed = buf.trim();
            if trimmed.is_empty() {
                continue;
            }
            return self.parse_row(trimmed).map(Some);
        }
    }

    /// Reopen the file and restart iteration from the first row.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        let file = File::open(&self.path).map_err(|e| StorageError::io(&self.path, &e))?;
        self.reader = Some(BufReader::new(file));
        self.line = 0;
        Ok(())
    }

    fn parse_row(&self, row: &str) -> Result<Tuple, StorageError> {
        let mut values = Vec::with_capacity(self.arity);
        for field in row.split(',') {
            let value = field.trim().parse::<i64>().map_err(|_| StorageError::MalformedRow {
                path: self.path.display().to_string(),
                line: self.line,
                message: format!("'{}' is not an integer", field.trim()),
            })?;
            values.push(value);
        }

        if values.len() != self.arity {
            return Err(StorageError::MalformedRow {
                path: self.path.display().to_string(),
                line: self.line,
                message: format!("expected {} values, found {}", self.arity, values.len()),
            });
        }
        Ok(Tuple::new(values))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn data_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_rows_in_file_order() {
        let (_dir, path) = data_file("1,25, 85,30\n2, 30,22,40\n");
        let mut reader = TupleReader::open(&path, 4).unwrap();

        assert_eq!(reader.next_tuple().unwrap(), Some(Tuple::new(vec![1, 25, 85, 30])));
        assert_eq!(reader.next_tuple().unwrap(), Some(Tuple::new(vec![2, 30, 22, 40])));
        assert_eq!(reader.next_tuple().unwrap(), None);
        // stays exhausted
        assert_eq!(reader.next_tuple().unwrap(), None);
    }

    #[test]
    fn empty_file_yields_none_immediately() {
        let (_dir, path) = data_file("");
        let mut reader = TupleReader::open(&path, 3).unwrap();
        assert_eq!(reader.next_tuple().unwrap(), None);
    }

    #[test]
    fn reset_restarts_from_first_row() {
        let (_dir, path) = data_file("7,8\n9,10\n");
        let mut reader = TupleReader::open(&path, 2).unwrap();
        while reader.next_tuple().unwrap().is_some() {}

        reader.reset().unwrap();
        assert_eq!(reader.next_tuple().unwrap(), Some(Tuple::new(vec![7, 8])));
        assert_eq!(reader.next_tuple().unwrap(), Some(Tuple::new(vec![9, 10])));
    }

    #[test]
    fn malformed_integer_is_fatal() {
        let (_dir, path) = data_file("1,x,3\n");
        let mut reader = TupleReader::open(&path, 3).unwrap();
        assert!(matches!(
            reader.next_tuple(),
            Err(StorageError::MalformedRow { line: 1, .. })
        ));
    }

    #[test]
    fn arity_mismatch_is_fatal() {
        let (_dir, path) = data_file("1,2\n");
        let mut reader = TupleReader::open(&path, 3).unwrap();
        assert!(matches!(reader.next_tuple(), Err(StorageError::MalformedRow { .. })));
    }

    #[test]
    fn missing_file_fails_at_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(matches!(TupleReader::open(&path, 2), Err(StorageError::Io { .. })));
    }

    #[test]
    fn negative_values_are_supported() {
        let (_dir, path) = data_file("-3,4\n");
        let mut reader = TupleReader::open(&path, 2).unwrap();
        assert_eq!(reader.next_tuple().unwrap(), Some(Tuple::new(vec![-3, 4])));
    }
}
