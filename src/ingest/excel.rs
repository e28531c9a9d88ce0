//! Spreadsheet ingestion implementation.

use std::io::{Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{ParseError, ParseResult};
use crate::types::{Column, Table, Value};

use super::ensure_unique_headers;

/// Read a spreadsheet report (`.xlsx`, `.xls`, `.ods`, ...) into an in-memory
/// [`Table`].
///
/// Behavior:
/// - Reads the first sheet in the workbook.
/// - The first non-empty row is the header row.
/// - Cells map from the workbook's native types; date-formatted cells arrive as
///   [`Value::DateTime`] directly, error cells (`#DIV/0!`, ...) as null.
pub fn read_workbook_from_path(path: impl AsRef<Path>) -> ParseResult<Table> {
    let workbook = open_workbook_auto(path)?;
    read_first_sheet(workbook)
}

/// Read a spreadsheet report from any seekable byte source.
pub fn read_workbook<RS: Read + Seek + Clone>(source: RS) -> ParseResult<Table> {
    let workbook = open_workbook_auto_from_rs(source)?;
    read_first_sheet(workbook)
}

fn read_first_sheet<RS: Read + Seek>(mut workbook: calamine::Sheets<RS>) -> ParseResult<Table> {
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ParseError::Malformed {
            message: "workbook has no sheets".to_string(),
        })?;
    let range = workbook.worksheet_range(&sheet)?;
    table_from_range(&range)
}

fn table_from_range(range: &calamine::Range<Data>) -> ParseResult<Table> {
    let mut rows = range.rows();

    let header_cells = rows
        .find(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .ok_or_else(|| ParseError::Malformed {
            message: "sheet has no non-empty rows (no header row found)".to_string(),
        })?;
    let headers: Vec<String> = header_cells.iter().map(cell_to_header).collect();
    ensure_unique_headers(&headers)?;

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (idx, values) in columns.iter_mut().enumerate() {
            let cell = row.get(idx).unwrap_or(&Data::Empty);
            values.push(convert_cell(cell));
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Ok(Table::new(columns))
}

fn cell_to_header(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_owned(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::Utf8(trimmed.to_owned())
            }
        }
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => dt.as_datetime().map_or(Value::Null, Value::DateTime),
        Data::DateTimeIso(s) => parse_iso_datetime(s).map_or_else(|| Value::Utf8(s.clone()), Value::DateTime),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
        // With no declared schema there is no type to fail against; a poisoned
        // cell must not discard the upload.
        Data::Error(_) => Value::Null,
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    if s.contains('T') {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()
    } else {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}
