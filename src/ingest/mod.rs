//! Report ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_from_path`] or [`ingest_from_bytes`]
//! (the upload boundary), which:
//!
//! - auto-detect the format from the file extension (or you can override via
//!   [`IngestOptions`])
//! - parse the source into an in-memory [`crate::types::Table`] with no
//!   declared schema (headers come from the first row of the source)
//! - optionally report success/failure/alerts to a
//!   [`crate::observe::PipelineObserver`]
//!
//! Format-specific functions are also available under [`csv`] and [`excel`].

pub mod csv;
pub mod excel;

use std::error::Error as StdError;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ParseError, ParseResult};
use crate::observe::{EventContext, PipelineObserver, Severity, StageStats};
use crate::types::Table;

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Delimited text (`.csv`-style).
    Delimited,
    /// Spreadsheet/workbook formats (`.xlsx`-style).
    Spreadsheet,
}

impl ReportFormat {
    /// Parse a report format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Delimited),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// Options controlling ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestOptions {
    /// If `None`, auto-detect format from the file extension.
    pub format: Option<ReportFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl fmt::Debug for IngestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

/// Unified ingestion entry point for path-based sources.
///
/// - If `options.format` is `None`, format is inferred from the file extension.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row count stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >=
///   `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use report_escalation::ingest::{ingest_from_path, IngestOptions};
///
/// # fn main() -> Result<(), report_escalation::ParseError> {
/// // Uses `.csv` to select delimited-text ingestion.
/// let table = ingest_from_path("issues.csv", &IngestOptions::default())?;
/// println!("rows={}", table.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestOptions) -> ParseResult<Table> {
    let path = path.as_ref();
    let ctx = EventContext::ingest(path);

    let result = match options.format {
        Some(f) => Ok(f),
        None => infer_format_from_path(path),
    }
    .and_then(|fmt| match fmt {
        ReportFormat::Delimited => csv::read_delimited_from_path(path),
        ReportFormat::Spreadsheet => excel::read_workbook_from_path(path),
    });

    report(options, &ctx, &result);
    result
}

/// Ingest an uploaded byte stream.
///
/// `name_hint` is the uploaded filename (or anything carrying the extension);
/// it selects the format unless `options.format` overrides it.
///
/// # Examples
///
/// ```
/// use report_escalation::ingest::{ingest_from_bytes, IngestOptions};
///
/// # fn main() -> Result<(), report_escalation::ParseError> {
/// let upload = b"Key,Created\nOPS-1,2023-01-05\n";
/// let table = ingest_from_bytes(upload, "report.csv", &IngestOptions::default())?;
/// assert_eq!(table.row_count(), 1);
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_bytes(
    bytes: &[u8],
    name_hint: &str,
    options: &IngestOptions,
) -> ParseResult<Table> {
    let ctx = EventContext::ingest(Path::new(name_hint));

    let result = match options.format {
        Some(f) => Ok(f),
        None => infer_format_from_path(Path::new(name_hint)),
    }
    .and_then(|fmt| match fmt {
        ReportFormat::Delimited => csv::read_delimited(Cursor::new(bytes)),
        ReportFormat::Spreadsheet => excel::read_workbook(Cursor::new(bytes)),
    });

    report(options, &ctx, &result);
    result
}

fn report(options: &IngestOptions, ctx: &EventContext, result: &ParseResult<Table>) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(table) => obs.on_success(
            ctx,
            StageStats {
                rows: table.row_count(),
            },
        ),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

fn severity_for_error(e: &ParseError) -> Severity {
    match e {
        ParseError::Io(_) => Severity::Critical,
        ParseError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => Severity::Critical,
            _ => Severity::Error,
        },
        ParseError::Spreadsheet(err) => {
            if error_chain_contains_io(err) {
                Severity::Critical
            } else {
                Severity::Error
            }
        }
        ParseError::Malformed { .. } => Severity::Error,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

fn infer_format_from_path(path: &Path) -> ParseResult<ReportFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ParseError::Malformed {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    ReportFormat::from_extension(ext).ok_or_else(|| ParseError::Malformed {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

/// Validates the table invariant that column names are unique.
pub(crate) fn ensure_unique_headers(headers: &[String]) -> ParseResult<()> {
    for (idx, name) in headers.iter().enumerate() {
        if headers[..idx].iter().any(|h| h == name) {
            return Err(ParseError::Malformed {
                message: format!("duplicate column name '{name}' in header"),
            });
        }
    }
    Ok(())
}
