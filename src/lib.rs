//! `report-escalation` ingests a tabular report (delimited text or
//! spreadsheet) into an in-memory [`types::Table`] **without a declared
//! schema**, infers which columns are temporal, derives stable grouping
//! columns from them, and packages an interactively selected row subset into
//! an HTML email sent over authenticated SMTP.
//!
//! ## Pipeline
//!
//! raw bytes → [`ingest`] → [`enrich`] → [`bridge`] (interactive,
//! human-in-the-loop) → [`sanitize`] → [`notify`] → delivery outcome.
//!
//! A [`session::ReportSession`] wires the stages together for one upload:
//!
//! ```no_run
//! use report_escalation::notify::{NotificationRequest, SmtpDispatcher};
//! use report_escalation::session::{ReportSession, SessionOptions};
//! use report_escalation::bridge::RowSelection;
//!
//! # fn main() -> Result<(), report_escalation::EscalationError> {
//! let session = ReportSession::from_path("weekly_report.xlsx", SessionOptions::default())?;
//!
//! // Hand session.table() + session.hidden_columns() to the grid widget;
//! // it posts the checked rows back as JSON.
//! let selection = RowSelection::from_json(r#"[{"Key": "OPS-1", "_rowOrigin": "n3"}]"#)?;
//!
//! let outcome = session.notify(
//!     &selection,
//!     &SmtpDispatcher::default(),
//!     &NotificationRequest {
//!         sender: "oncall@example.com".into(),
//!         secret: "app-password".into(),
//!         recipient: "manager@example.com".into(),
//!         subject: "Escalation: Selected Issues".into(),
//!     },
//! )?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Temporal enrichment
//!
//! Columns are classified by a permissive per-value parse; by default one
//! successful parse tags the whole column temporal. Each temporal column `C`
//! is rewritten to its parsed form and gains `C_Year`, `C_Month`
//! (first-of-month date) and `C_Day`, all null-propagating and registered in a
//! [`types::HiddenColumnRegistry`] so the grid hides them by default:
//!
//! ```
//! use report_escalation::ingest::{ingest_from_bytes, IngestOptions};
//! use report_escalation::enrich::{enrich, DetectionOptions};
//! use report_escalation::types::Value;
//!
//! # fn main() -> Result<(), report_escalation::ParseError> {
//! let upload = b"Key,Created\nOPS-1,2023-01-05\nOPS-2,not a date\n";
//! let mut table = ingest_from_bytes(upload, "report.csv", &IngestOptions::default())?;
//!
//! let hidden = enrich(&mut table, &DetectionOptions::default());
//!
//! assert_eq!(
//!     hidden.iter().collect::<Vec<_>>(),
//!     vec!["Created_Year", "Created_Month", "Created_Day"],
//! );
//! assert_eq!(table.column("Created_Year").unwrap().values[0], Value::Int64(2023));
//! assert_eq!(table.column("Created_Year").unwrap().values[1], Value::Null);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingest`]: schema-less CSV/spreadsheet readers and the upload boundary
//! - [`enrich`]: temporal detection + derived grouping columns
//! - [`bridge`]: the interactive-grid seam and selection types
//! - [`sanitize`]: bookkeeping stripping and the derived-column export policy
//! - [`notify`]: HTML rendering and SMTP dispatch
//! - [`session`]: the per-upload context tying the stages together
//! - [`observe`]: success/failure/alert observers for ingest and dispatch
//! - [`error`]: typed results for each stage
//!
//! Everything is synchronous and single-threaded: each call blocks until its
//! I/O completes, and the table is exclusively owned by its session.

pub mod bridge;
pub mod enrich;
pub mod error;
pub mod ingest;
pub mod notify;
pub mod observe;
pub mod sanitize;
pub mod session;
pub mod types;

pub use error::{
    DeliveryError, DeliveryResult, DeliveryStage, EscalationError, ParseError, ParseResult,
    SanitizationError, SanitizeResult,
};
pub use session::{DispatchOutcome, ReportSession, SessionOptions};
