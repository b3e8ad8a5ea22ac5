//! Catalog - Schema Metadata Registry
//!
//! This crate tracks column identity across the operator tree. It holds two
//! kinds of schemas:
//!
//! - **Base schemas**: one per table, loaded from the schema definition file
//!   (ordered column names plus the CSV file location).
//! - **Derived schemas**: registered by schema-transforming operators
//!   (projection, join, aggregation) during binding. Each records a
//!   qualified-key → index map, the transformation kind, and its parent
//!   schema lineage.
//!
//! A `Catalog` is an owned, per-query context object threaded by reference
//! through the planner and binder; there is no process-wide registry, so
//! independent queries never share or reset catalog state.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

mod errors;
#[cfg(test)]
mod tests;

pub use errors::CatalogError;

// ============================================================================
// Schema Identifiers
// ============================================================================

/// Identifier for a registered schema (base table or derived).
///
/// Ids are issued by a single `Catalog` and are never reused within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(u32);

/// The operator kind that produced a derived schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Projection,
    Join,
    Aggregation,
    Other,
}

// ============================================================================
// Base Schemas
// ============================================================================

/// Base table schema: ordered column names plus the data file location.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<String>,
    pub location: PathBuf,
}

impl TableSchema {
    pub fn new(name: String, columns: Vec<String>, location: PathBuf) -> Self {
        TableSchema { name, columns, location }
    }

    /// Get column index by name (case-insensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.eq_ignore_ascii_case(name))
    }

    /// Get number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

// ============================================================================
// Derived Schemas
// ============================================================================

/// Schema produced by a schema-transforming operator.
///
/// `columns` maps lowercase qualified keys (`table.column`, or a bare output
/// name) to tuple indices. `parents` carries the lineage: each entry is a
/// parent schema id plus the column offset of that parent's columns within
/// this schema (non-zero only for the inner side of a join).
#[derive(Debug, Clone)]
struct DerivedSchema {
    columns: BTreeMap<String, usize>,
    width: usize,
    kind: TransformKind,
    parents: Vec<(SchemaId, usize)>,
}

#[derive(Debug, Clone)]
enum SchemaEntry {
    Base(TableSchema),
    Derived(DerivedSchema),
}

// ============================================================================
// Catalog
// ============================================================================

/// Per-query schema registry.
#[derive(Debug, Default)]
pub struct Catalog {
    schemas: Vec<SchemaEntry>,
    base_ids: HashMap<String, SchemaId>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Register a base table schema. Fails if the table name (compared
    /// case-insensitively) or any column within it is duplicated.
    pub fn register_base(
        &mut self,
        name: &str,
        columns: Vec<String>,
        location: PathBuf,
    ) -> Result<SchemaId, CatalogError> {
        let key = name.to_lowercase();
        if self.base_ids.contains_key(&key) {
            return Err(CatalogError::TableAlreadyExists(name.to_string()));
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.eq_ignore_ascii_case(col)) {
                return Err(CatalogError::ColumnAlreadyExists(format!("{}.{}", name, col)));
            }
        }

        let id = self.next_id();
        self.schemas.push(SchemaEntry::Base(TableSchema::new(
            name.to_string(),
            columns,
            location,
        )));
        self.base_ids.insert(key, id);
        Ok(id)
    }

    /// Look up a base table schema by name (case-insensitive).
    pub fn base_schema(&self, table: &str) -> Result<&TableSchema, CatalogError> {
        let id = self.base_id(table)?;
        match &self.schemas[id.0 as usize] {
            SchemaEntry::Base(schema) => Ok(schema),
            SchemaEntry::Derived(_) => unreachable!("base_ids only maps to base entries"),
        }
    }

    /// Look up the schema id of a base table (case-insensitive).
    pub fn base_id(&self, table: &str) -> Result<SchemaId, CatalogError> {
        self.base_ids
            .get(&table.to_lowercase())
            .copied()
            .ok_or_else(|| CatalogError::TableNotFound(table.to_string()))
    }

    /// Register a derived schema and return its fresh id.
    ///
    /// `columns` keys are lowercased on insertion. `parents` lists lineage
    /// entries as (parent id, column offset); resolution falls back through
    /// them in order when a key is absent from `columns`.
    pub fn register_derived(
        &mut self,
        columns: BTreeMap<String, usize>,
        parents: Vec<(SchemaId, usize)>,
        kind: TransformKind,
        width: usize,
    ) -> SchemaId {
        let columns = columns
            .into_iter()
            .map(|(key, index)| (key.to_lowercase(), index))
            .collect();
        let id = self.next_id();
        self.schemas.push(SchemaEntry::Derived(DerivedSchema { columns, width, kind, parents }));
        id
    }

    /// Number of columns in the tuples described by `id`.
    pub fn width(&self, id: SchemaId) -> usize {
        match &self.schemas[id.0 as usize] {
            SchemaEntry::Base(schema) => schema.column_count(),
            SchemaEntry::Derived(derived) => derived.width,
        }
    }

    /// The transformation kind that produced `id` (None for base schemas).
    pub fn transform_kind(&self, id: SchemaId) -> Option<TransformKind> {
        match &self.schemas[id.0 as usize] {
            SchemaEntry::Base(_) => None,
            SchemaEntry::Derived(derived) => Some(derived.kind),
        }
    }

    /// Resolve a column reference against a schema to a tuple index.
    ///
    /// Resolution order: exact qualified key, then unqualified fallback,
    /// then the parent chain (with each parent's column offset applied).
    /// The result is deterministic: derived keys live in an ordered map and
    /// parents are tried in registration order.
    pub fn resolve(
        &self,
        id: SchemaId,
        table: Option<&str>,
        column: &str,
    ) -> Result<usize, CatalogError> {
        self.try_resolve(id, table, column).ok_or_else(|| {
            let name = match table {
                Some(table) => format!("{}.{}", table, column),
                None => column.to_string(),
            };
            CatalogError::ColumnNotFound(name)
        })
    }

    fn try_resolve(&self, id: SchemaId, table: Option<&str>, column: &str) -> Option<usize> {
        match &self.schemas[id.0 as usize] {
            SchemaEntry::Base(schema) => {
                if let Some(table) = table {
                    if !table.eq_ignore_ascii_case(&schema.name) {
                        return None;
                    }
                }
                schema.column_index(column)
            }
            SchemaEntry::Derived(derived) => {
                let column_lower = column.to_lowercase();

                // Exact qualified key
                if let Some(table) = table {
                    let key = format!("{}.{}", table.to_lowercase(), column_lower);
                    if let Some(&index) = derived.columns.get(&key) {
                        return Some(index);
                    }
                }

                // Unqualified fallback: a bare key, or (for unqualified
                // references) the column part of any qualified key
                if let Some(&index) = derived.columns.get(&column_lower) {
                    return Some(index);
                }
                if table.is_none() {
                    for (key, &index) in &derived.columns {
                        if key.rsplit('.').next() == Some(column_lower.as_str()) {
                            return Some(index);
                        }
                    }
                }

                // Parent chain
                for &(parent, offset) in &derived.parents {
                    if let Some(index) = self.try_resolve(parent, table, column) {
                        return Some(index + offset);
                    }
                }
                None
            }
        }
    }

    fn next_id(&self) -> SchemaId {
        SchemaId(self.schemas.len() as u32)
    }
}
