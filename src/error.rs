use thiserror::Error;

/// Convenience result type for report ingestion.
pub type ParseResult<T> = Result<T, ParseError>;

/// Convenience result type for selection sanitization.
pub type SanitizeResult<T> = Result<T, SanitizationError>;

/// Convenience result type for notification dispatch.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Error type returned when an uploaded report cannot be read.
///
/// On any `ParseError` the input is discarded; no partial table is produced.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet ingestion error.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// The input is readable but not a usable report (no header, duplicate
    /// column names, unsupported extension, ...).
    #[error("malformed input: {message}")]
    Malformed { message: String },
}

/// Error type returned when a row selection is structurally inconsistent with
/// the table it was selected from.
///
/// Bookkeeping fields attached by the presentation layer are stripped, never
/// reported as errors; this fires only when a selected row carries a field
/// that is neither bookkeeping nor a column of the source table. No email is
/// sent for a selection that fails sanitization.
#[derive(Debug, Error)]
pub enum SanitizationError {
    /// A selected row references a column absent from the source table.
    #[error("selected row {row} references unknown column '{column}'")]
    UnknownColumn { row: usize, column: String },

    /// The selection payload could not be decoded.
    #[error("selection payload is not decodable: {0}")]
    Payload(#[from] serde_json::Error),
}

/// The stage of a dispatch attempt that failed.
///
/// Mirrors the send state machine: `Idle → Rendering → Authenticating →
/// Transmitting → {Delivered | Failed(stage)}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStage {
    /// Building the MIME message (address parsing, body assembly).
    Rendering,
    /// Establishing the relay connection or negotiating transport encryption.
    Connection,
    /// Authenticating the sender identity against the relay.
    Authentication,
    /// Submitting the message after a successful login.
    Transmission,
}

impl std::fmt::Display for DeliveryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeliveryStage::Rendering => "rendering",
            DeliveryStage::Connection => "connection",
            DeliveryStage::Authentication => "authentication",
            DeliveryStage::Transmission => "transmission",
        };
        f.write_str(s)
    }
}

/// Error type returned when a notification could not be delivered.
///
/// A single attempt is made per call; there is no retry. The message text never
/// contains credentials.
#[derive(Debug, Error)]
#[error("delivery failed during {stage}: {message}")]
pub struct DeliveryError {
    /// Which stage of the send failed.
    pub stage: DeliveryStage,
    /// Human-readable cause.
    pub message: String,
}

impl DeliveryError {
    /// Create a delivery error for `stage`.
    pub fn new(stage: DeliveryStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Umbrella error for session-level pipeline calls that cross stage boundaries.
#[derive(Debug, Error)]
pub enum EscalationError {
    /// Report ingestion failed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Selection sanitization failed.
    #[error(transparent)]
    Sanitize(#[from] SanitizationError),

    /// Notification dispatch failed.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
