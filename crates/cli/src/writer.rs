//! Result file writing

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use storage::Tuple;

/// Write result rows to `path`, one `", "`-joined line per tuple.
///
/// Missing parent directories are created; an existing file is truncated.
/// Returns the number of rows written.
pub fn write_rows(path: &Path, rows: &[Tuple]) -> anyhow::Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("failed to create output file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        writeln!(writer, "{}", row)
            .with_context(|| format!("failed to write to '{}'", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write to '{}'", path.display()))?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_line_per_tuple() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let rows = vec![Tuple::new(vec![2, 40]), Tuple::new(vec![4, 40])];

        assert_eq!(write_rows(&path, &rows).unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "2, 40\n4, 40\n");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("out.txt");

        assert_eq!(write_rows(&path, &[Tuple::new(vec![1])]).unwrap(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "1\n");
    }

    #[test]
    fn empty_result_produces_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        assert_eq!(write_rows(&path, &[]).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
