//! Pipeline observability.
//!
//! Ingest and dispatch outcomes are reported to an optional [`PipelineObserver`].
//! Event contexts carry the input path or the recipient address, never sender
//! credentials and never message bodies.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// The pipeline stage an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Reading an uploaded report into a table.
    Ingest,
    /// Rendering and transmitting a notification.
    Dispatch,
}

/// Context about a pipeline event.
#[derive(Debug, Clone)]
pub struct EventContext {
    /// Stage the event occurred in.
    pub stage: PipelineStage,
    /// What the stage was operating on: the input path for ingest, the
    /// recipient address for dispatch.
    pub subject: String,
}

impl EventContext {
    /// Context for an ingest event.
    pub fn ingest(path: &Path) -> Self {
        Self {
            stage: PipelineStage::Ingest,
            subject: path.display().to_string(),
        }
    }

    /// Context for a dispatch event.
    pub fn dispatch(recipient: &str) -> Self {
        Self {
            stage: PipelineStage::Dispatch,
            subject: recipient.to_string(),
        }
    }
}

/// Minimal stats reported on stage success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStats {
    /// Rows ingested, or rows included in a dispatched notification.
    pub rows: usize,
}

/// Observer interface for pipeline outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait PipelineObserver: Send + Sync {
    /// Called when a stage succeeds.
    fn on_success(&self, _ctx: &EventContext, _stats: StageStats) {}

    /// Called when a stage fails.
    fn on_failure(&self, _ctx: &EventContext, _severity: Severity, _error: &dyn std::error::Error) {
    }

    /// Called when a failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &EventContext, severity: Severity, error: &dyn std::error::Error) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_success(&self, ctx: &EventContext, stats: StageStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &EventContext, severity: Severity, error: &dyn std::error::Error) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &EventContext, severity: Severity, error: &dyn std::error::Error) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs pipeline events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl PipelineObserver for StdErrObserver {
    fn on_success(&self, ctx: &EventContext, stats: StageStats) {
        eprintln!(
            "[{:?}][ok] subject={} rows={}",
            ctx.stage, ctx.subject, stats.rows
        );
    }

    fn on_failure(&self, ctx: &EventContext, severity: Severity, error: &dyn std::error::Error) {
        eprintln!(
            "[{:?}][{:?}] subject={} err={}",
            ctx.stage, severity, ctx.subject, error
        );
    }

    fn on_alert(&self, ctx: &EventContext, severity: Severity, error: &dyn std::error::Error) {
        eprintln!(
            "[ALERT][{:?}][{:?}] subject={} err={}",
            ctx.stage, severity, ctx.subject, error
        );
    }
}

/// Appends pipeline events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_success(&self, ctx: &EventContext, stats: StageStats) {
        self.append_line(&format!(
            "{} ok stage={:?} subject={} rows={}",
            unix_ts(),
            ctx.stage,
            ctx.subject,
            stats.rows
        ));
    }

    fn on_failure(&self, ctx: &EventContext, severity: Severity, error: &dyn std::error::Error) {
        self.append_line(&format!(
            "{} fail severity={:?} stage={:?} subject={} err={}",
            unix_ts(),
            severity,
            ctx.stage,
            ctx.subject,
            error
        ));
    }

    fn on_alert(&self, ctx: &EventContext, severity: Severity, error: &dyn std::error::Error) {
        self.append_line(&format!(
            "{} ALERT severity={:?} stage={:?} subject={} err={}",
            unix_ts(),
            severity,
            ctx.stage,
            ctx.subject,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
