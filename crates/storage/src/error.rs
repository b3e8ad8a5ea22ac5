use std::fmt;

/// Errors raised while reading schema or data files.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// File could not be opened or read
    Io { path: String, message: String },
    /// Data row is not a comma-separated list of integers of the right arity
    MalformedRow { path: String, line: usize, message: String },
    /// Schema definition line could not be parsed
    SchemaParse { line: usize, message: String },
}

impl StorageError {
    pub fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        StorageError::Io { path: path.display().to_string(), message: err.to_string() }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io { path, message } => {
                write!(f, "IO error on '{}': {}", path, message)
            }
            StorageError::MalformedRow { path, line, message } => {
                write!(f, "Malformed row in '{}' at line {}: {}", path, line, message)
            }
            StorageError::SchemaParse { line, message } => {
                write!(f, "Schema definition error at line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}
