//! Core data model types for the escalation pipeline.
//!
//! This crate ingests a tabular report into an in-memory [`Table`] with no declared schema:
//! column names come from the source's header row and cell types are inferred per value.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single scalar value in a [`Table`].
///
/// Serialized untagged so that values cross the presentation boundary as plain
/// JSON scalars (dates as their ISO string form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Calendar date without time-of-day.
    Date(NaiveDate),
    /// Calendar date and time, no timezone.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    /// Human-readable cell form. Nulls render empty; temporal values render ISO-style.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Value::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Where a column came from.
///
/// The enrichment step tags the grouping columns it appends as [`Derived`] so a
/// second detection pass never re-derives from already-derived columns.
///
/// [`Derived`]: ColumnProvenance::Derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnProvenance {
    /// Present in the uploaded report.
    Source,
    /// Appended by the derived-column generator.
    Derived,
}

/// Classification assigned to a column by the temporal detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// No (or not enough) values parsed as date/time.
    Raw,
    /// Enough values parsed as date/time to enable temporal grouping.
    Temporal,
}

/// A single named column and its values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its [`Table`].
    pub name: String,
    /// Source vs. derived provenance.
    pub provenance: ColumnProvenance,
    /// Cell values, aligned by row index across the table.
    pub values: Vec<Value>,
}

impl Column {
    /// Create a source column.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            provenance: ColumnProvenance::Source,
            values,
        }
    }

    /// Create a derived column.
    pub fn derived(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            provenance: ColumnProvenance::Derived,
            values,
        }
    }
}

/// In-memory tabular report.
///
/// Columnar storage: an ordered list of named [`Column`]s whose value vectors are
/// aligned by row index. Invariants: all columns have the same length and column
/// names are unique (duplicate headers are rejected at ingest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Create a table from columns.
    ///
    /// # Panics
    ///
    /// Panics if the columns have differing lengths. Name uniqueness is the
    /// caller's responsibility (ingest validates it against the source header).
    pub fn new(columns: Vec<Column>) -> Self {
        if let Some(first) = columns.first() {
            let len = first.values.len();
            for col in &columns {
                assert!(
                    col.values.len() == len,
                    "column '{}' has {} values, expected {}",
                    col.name,
                    col.values.len(),
                    len
                );
            }
        }
        Self { columns }
    }

    /// An empty table with no columns and no rows.
    pub fn empty() -> Self {
        Self { columns: Vec::new() }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Columns in table order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Mutable access to columns, for in-place enrichment.
    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Append a column.
    ///
    /// Replaces an existing column of the same name in place (keeping table
    /// order), so regeneration of derived columns is idempotent.
    ///
    /// # Panics
    ///
    /// Panics if the column's length differs from the table's row count.
    pub fn upsert_column(&mut self, column: Column) {
        if !self.columns.is_empty() {
            assert!(
                column.values.len() == self.row_count(),
                "column '{}' has {} values, expected {}",
                column.name,
                column.values.len(),
                self.row_count()
            );
        }
        match self.index_of(&column.name) {
            Some(idx) => self.columns[idx] = column,
            None => self.columns.push(column),
        }
    }

    /// Iterate rows as slices of per-column values.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> {
        (0..self.row_count()).map(move |r| self.columns.iter().map(|c| &c.values[r]).collect())
    }
}

/// Names of derived columns, used to suppress them from default display.
///
/// Purely a display concern: registered columns stay in the [`Table`]. Insertion
/// order follows generation order (source columns left to right, then
/// year/month/day per source column).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenColumnRegistry {
    names: Vec<String>,
}

impl HiddenColumnRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a column name. Duplicates are ignored.
    pub fn insert(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.names.iter().any(|n| *n == name) {
            self.names.push(name);
        }
    }

    /// Whether `name` is registered as hidden.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Registered names in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.as_str())
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_in_place() {
        let mut table = Table::new(vec![
            Column::new("a", vec![Value::Int64(1)]),
            Column::new("b", vec![Value::Int64(2)]),
        ]);
        table.upsert_column(Column::derived("a", vec![Value::Int64(9)]));
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.index_of("a"), Some(0));
        assert_eq!(table.column("a").unwrap().values, vec![Value::Int64(9)]);
        assert_eq!(
            table.column("a").unwrap().provenance,
            ColumnProvenance::Derived
        );
    }

    #[test]
    fn registry_preserves_insertion_order_and_dedupes() {
        let mut reg = HiddenColumnRegistry::new();
        reg.insert("x_Year");
        reg.insert("x_Month");
        reg.insert("x_Year");
        assert_eq!(reg.iter().collect::<Vec<_>>(), vec!["x_Year", "x_Month"]);
        assert!(reg.contains("x_Month"));
        assert!(!reg.contains("x_Day"));
    }

    #[test]
    fn display_renders_nulls_empty_and_dates_iso() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Date(d).to_string(), "2023-01-05");
        assert_eq!(
            Value::DateTime(d.and_hms_opt(8, 30, 0).unwrap()).to_string(),
            "2023-01-05 08:30:00"
        );
    }
}
