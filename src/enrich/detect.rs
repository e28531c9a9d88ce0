//! Temporal column detection.

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::{Column, ColumnProvenance, ColumnRole, Value};

/// Options controlling temporal detection.
#[derive(Debug, Clone, Copy)]
pub struct DetectionOptions {
    /// Minimum fraction of a column's non-null values that must parse as
    /// date/time for the column to classify as temporal.
    ///
    /// The default of `0.0` means one successful parse is enough. That is
    /// aggressive (a free-text column containing a single date-like entry
    /// classifies as temporal) and is the documented default behavior; raise
    /// the fraction to tighten it.
    pub min_parse_fraction: f64,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            min_parse_fraction: 0.0,
        }
    }
}

/// Date/time string formats attempted in order; first match wins.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only formats attempted after [`DATETIME_FORMATS`].
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%d %b %Y",
    "%b %d, %Y",
    "%d-%b-%Y",
];

/// Best-effort parse of a single value as a date/time.
///
/// Temporal values parse trivially; strings go through the permissive format
/// lists; date-only matches land at midnight. Numbers never parse: an epoch
/// interpretation would tag every numeric column temporal.
pub fn parse_temporal(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => Some(*dt),
        Value::Date(d) => d.and_hms_opt(0, 0, 0),
        Value::Utf8(s) => parse_temporal_str(s),
        _ => None,
    }
}

fn parse_temporal_str(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Classify a column as raw or temporal.
///
/// Depends only on the column's own contents. Derived columns never classify:
/// they are date-typed by construction and re-submitting them would recursively
/// derive from derived columns.
pub fn classify(column: &Column, options: &DetectionOptions) -> ColumnRole {
    if column.provenance == ColumnProvenance::Derived {
        return ColumnRole::Raw;
    }

    let mut non_null = 0usize;
    let mut parsed = 0usize;
    for value in &column.values {
        if value.is_null() {
            continue;
        }
        non_null += 1;
        if parse_temporal(value).is_some() {
            parsed += 1;
        }
    }

    if parsed == 0 {
        return ColumnRole::Raw;
    }
    if parsed as f64 / non_null as f64 >= options.min_parse_fraction {
        ColumnRole::Temporal
    } else {
        ColumnRole::Raw
    }
}
