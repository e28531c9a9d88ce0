//! Delimited-text ingestion implementation.

use std::io::Read;
use std::path::Path;

use crate::error::{ParseError, ParseResult};
use crate::types::{Column, Table, Value};

use super::ensure_unique_headers;

/// Read a delimited-text report into an in-memory [`Table`].
///
/// Rules:
///
/// - The first record is the header; column names are taken from it (trimmed).
/// - Duplicate column names are malformed input.
/// - Cell bytes are decoded as UTF-8 with undecodable sequences replaced, so a
///   report in a stray legacy encoding degrades instead of aborting the upload.
/// - Scalars are inferred per cell: empty → null, then integer → float → string.
/// - Short records are padded with nulls.
pub fn read_delimited_from_path(path: impl AsRef<Path>) -> ParseResult<Table> {
    let file = std::fs::File::open(path)?;
    read_delimited(file)
}

/// Read delimited-text data from any byte source.
pub fn read_delimited<R: Read>(reader: R) -> ParseResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|raw| String::from_utf8_lossy(raw).trim().to_owned())
        .collect();
    if headers.is_empty() {
        return Err(ParseError::Malformed {
            message: "input has no header row".to_string(),
        });
    }
    ensure_unique_headers(&headers)?;

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for result in rdr.byte_records() {
        let record = result?;
        for (idx, values) in columns.iter_mut().enumerate() {
            let value = match record.get(idx) {
                Some(raw) => scan_scalar(&String::from_utf8_lossy(raw)),
                None => Value::Null,
            };
            values.push(value);
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Ok(Table::new(columns))
}

/// Infer a scalar from raw cell text.
fn scan_scalar(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Value::Int64(v);
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        return Value::Float64(v);
    }
    Value::Utf8(trimmed.to_owned())
}
