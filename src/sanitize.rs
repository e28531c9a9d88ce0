//! Selection sanitization.
//!
//! Selected rows come back from the presentation layer carrying bookkeeping
//! fields that must never appear in exported content. Sanitization strips
//! them, validates what remains against the table the selection came from, and
//! rebuilds the rows as a clean row-subset [`Table`] preserving source column
//! order.

use crate::bridge::{RowSelection, BOOKKEEPING_PREFIX};
use crate::error::{SanitizationError, SanitizeResult};
use crate::types::{Column, HiddenColumnRegistry, Table, Value};

/// Whether derived grouping columns are carried into the notification payload.
///
/// The hidden-column registry only suppresses derived columns from the grid's
/// default display; whether they belong in the email is a separate, named
/// decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DerivedColumnPolicy {
    /// Export includes derived columns (default: the payload carries the same
    /// data columns the interactive view holds, hidden or not).
    #[default]
    Include,
    /// Derived columns are dropped from the payload along with bookkeeping
    /// fields.
    Exclude,
}

/// Options controlling sanitization.
#[derive(Debug, Clone, Copy, Default)]
pub struct SanitizeOptions {
    /// Derived-column export policy.
    pub derived_columns: DerivedColumnPolicy,
}

/// Strip bookkeeping fields from `selection` and rebuild it as a row-subset
/// table.
///
/// - Fields in the `_` bookkeeping namespace are dropped.
/// - Any other field absent from `table`'s columns fails with
///   [`SanitizationError::UnknownColumn`]; no email is sent for such a
///   selection.
/// - Output columns preserve `table`'s order; fields a row omits become null
///   (grids drop empty cells when posting selections).
/// - An empty selection yields an empty table ("nothing to notify").
pub fn sanitize_selection(
    table: &Table,
    hidden: &HiddenColumnRegistry,
    selection: &RowSelection,
    options: &SanitizeOptions,
) -> SanitizeResult<Table> {
    for (row_idx, row) in selection.rows.iter().enumerate() {
        for (name, _) in &row.fields {
            if name.starts_with(BOOKKEEPING_PREFIX) {
                continue;
            }
            if table.index_of(name).is_none() {
                return Err(SanitizationError::UnknownColumn {
                    row: row_idx,
                    column: name.clone(),
                });
            }
        }
    }

    let columns: Vec<Column> = table
        .columns()
        .iter()
        .filter(|c| match options.derived_columns {
            DerivedColumnPolicy::Include => true,
            DerivedColumnPolicy::Exclude => !hidden.contains(&c.name),
        })
        .map(|c| {
            let values = selection
                .rows
                .iter()
                .map(|row| row.get(&c.name).cloned().unwrap_or(Value::Null))
                .collect();
            Column {
                name: c.name.clone(),
                provenance: c.provenance,
                values,
            }
        })
        .collect();

    Ok(Table::new(columns))
}
