//! Derived grouping columns for temporal source columns.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::types::{Column, ColumnRole, HiddenColumnRegistry, Table, Value};

use super::detect::{classify, parse_temporal, DetectionOptions};

/// Suffix of the calendar-year grouping column.
pub const YEAR_SUFFIX: &str = "_Year";
/// Suffix of the first-of-month grouping column.
pub const MONTH_SUFFIX: &str = "_Month";
/// Suffix of the calendar-date grouping column.
pub const DAY_SUFFIX: &str = "_Day";

/// Enrich `table` in place and return the registry of derived column names.
///
/// For each column the detector classifies as temporal, left to right:
///
/// - the column's values are overwritten with their parsed date/time form
///   (unparsed entries become null);
/// - `{name}_Year` (integer), `{name}_Month` (first-of-month date) and
///   `{name}_Day` (calendar date) are appended, all null-propagating;
/// - the three names are registered as hidden.
///
/// The derived columns are pure functions of their source column. They are
/// tagged [`ColumnProvenance::Derived`] and skipped by the detector, and
/// regeneration replaces them by name, so running this twice yields an
/// identical table.
///
/// [`ColumnProvenance::Derived`]: crate::types::ColumnProvenance::Derived
pub fn enrich(table: &mut Table, options: &DetectionOptions) -> HiddenColumnRegistry {
    let mut registry = HiddenColumnRegistry::new();

    // Candidate columns are snapshotted up front; columns appended below must
    // not join this pass.
    for idx in 0..table.column_count() {
        let column = &table.columns()[idx];
        if classify(column, options) != ColumnRole::Temporal {
            continue;
        }
        let name = column.name.clone();
        let parsed: Vec<Option<NaiveDateTime>> =
            column.values.iter().map(parse_temporal).collect();

        table.columns_mut()[idx].values = parsed
            .iter()
            .map(|p| p.map_or(Value::Null, Value::DateTime))
            .collect();

        let years: Vec<Value> = parsed
            .iter()
            .map(|p| p.map_or(Value::Null, |dt| Value::Int64(i64::from(dt.year()))))
            .collect();
        let months: Vec<Value> = parsed
            .iter()
            .map(|p| p.map_or(Value::Null, |dt| Value::Date(first_of_month(&dt))))
            .collect();
        let days: Vec<Value> = parsed
            .iter()
            .map(|p| p.map_or(Value::Null, |dt| Value::Date(dt.date())))
            .collect();

        for (suffix, values) in [(YEAR_SUFFIX, years), (MONTH_SUFFIX, months), (DAY_SUFFIX, days)] {
            let derived_name = format!("{name}{suffix}");
            table.upsert_column(Column::derived(derived_name.clone(), values));
            registry.insert(derived_name);
        }
    }

    registry
}

fn first_of_month(dt: &NaiveDateTime) -> NaiveDate {
    dt.date().with_day(1).expect("day 1 exists in every month")
}
