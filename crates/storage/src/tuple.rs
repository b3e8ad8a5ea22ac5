use std::fmt;

/// A single result row - a fixed-arity vector of integers.
///
/// Immutable once constructed; equality and hashing are structural, so
/// tuples can key duplicate-elimination sets and aggregation groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tuple {
    values: Vec<i64>,
}

impl Tuple {
    /// Create a new tuple from values
    pub fn new(values: Vec<i64>) -> Self {
        Tuple { values }
    }

    /// Get value at column index
    pub fn get(&self, index: usize) -> Option<i64> {
        self.values.get(index).copied()
    }

    /// Get number of attributes in this tuple
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the tuple has no attributes
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All attribute values, in order
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Concatenation of this tuple's attributes followed by `other`'s.
    pub fn concat(&self, other: &Tuple) -> Tuple {
        let mut values = self.values.clone();
        values.extend_from_slice(&other.values);
        Tuple { values }
    }
}

impl From<Vec<i64>> for Tuple {
    fn from(values: Vec<i64>) -> Self {
        Tuple::new(values)
    }
}

/// Output format: attributes joined by `", "`.
impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}
