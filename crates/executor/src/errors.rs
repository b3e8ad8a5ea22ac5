use catalog::CatalogError;
use storage::StorageError;

/// Errors that can occur while planning or executing a query.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorError {
    /// Unknown table or column (schema resolution failure)
    Catalog(CatalogError),
    /// Missing/unreadable data file or malformed integer row
    Storage(StorageError),
    /// Predicate or aggregate argument outside the supported grammar
    UnsupportedExpression(String),
    /// Query structure outside the supported dialect
    Plan(String),
    /// Tuple narrower than a resolved column index; indicates a binding bug
    ColumnIndexOutOfBounds { index: usize },
}

impl std::fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorError::Catalog(err) => write!(f, "{}", err),
            ExecutorError::Storage(err) => write!(f, "{}", err),
            ExecutorError::UnsupportedExpression(msg) => {
                write!(f, "Unsupported expression: {}", msg)
            }
            ExecutorError::Plan(msg) => write!(f, "Plan error: {}", msg),
            ExecutorError::ColumnIndexOutOfBounds { index } => {
                write!(f, "Column index {} out of bounds", index)
            }
        }
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecutorError::Catalog(err) => Some(err),
            ExecutorError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CatalogError> for ExecutorError {
    fn from(err: CatalogError) -> Self {
        ExecutorError::Catalog(err)
    }
}

impl From<StorageError> for ExecutorError {
    fn from(err: StorageError) -> Self {
        ExecutorError::Storage(err)
    }
}
