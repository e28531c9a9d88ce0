//! Per-upload session context.
//!
//! A [`ReportSession`] is the explicit replacement for ambient interactive
//! state: one upload creates one session owning the enriched table and the
//! hidden-column registry. Selections and notifications are transient: they
//! are recreated per interaction and never outlive the session. Uploading a
//! new report means creating a new session.

use std::path::Path;
use std::sync::Arc;

use crate::bridge::{PresentationBridge, RowSelection};
use crate::enrich::enrich;
use crate::error::{EscalationError, ParseResult, SanitizeResult};
use crate::ingest::{ingest_from_bytes, ingest_from_path, IngestOptions};
use crate::notify::{NotificationDispatcher, NotificationRequest};
use crate::observe::{EventContext, PipelineObserver, Severity, StageStats};
use crate::sanitize::{sanitize_selection, SanitizeOptions};
use crate::types::{HiddenColumnRegistry, Table};

/// Options shared by a session's pipeline stages.
///
/// The observer configured on `ingest` also receives dispatch outcome events.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Temporal detection tuning.
    pub detection: crate::enrich::DetectionOptions,
    /// Ingest behavior: format override, observer, alert threshold.
    pub ingest: IngestOptions,
    /// Sanitization behavior: derived-column export policy.
    pub sanitize: SanitizeOptions,
}

/// Result of a [`ReportSession::notify`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The notification was delivered.
    Sent {
        /// Rows included in the rendered document.
        rows: usize,
    },
    /// The selection was empty; the dispatcher was not invoked.
    Empty,
}

/// One uploaded report and its enrichment products.
pub struct ReportSession {
    table: Table,
    hidden: HiddenColumnRegistry,
    options: SessionOptions,
}

impl ReportSession {
    /// Ingest a report from disk and enrich it.
    pub fn from_path(path: impl AsRef<Path>, options: SessionOptions) -> ParseResult<Self> {
        let table = ingest_from_path(path, &options.ingest)?;
        Ok(Self::from_table(table, options))
    }

    /// Ingest an uploaded byte stream (with its filename hint) and enrich it.
    pub fn from_bytes(bytes: &[u8], name_hint: &str, options: SessionOptions) -> ParseResult<Self> {
        let table = ingest_from_bytes(bytes, name_hint, &options.ingest)?;
        Ok(Self::from_table(table, options))
    }

    /// Enrich an already-parsed table.
    pub fn from_table(mut table: Table, options: SessionOptions) -> Self {
        let hidden = enrich(&mut table, &options.detection);
        Self {
            table,
            hidden,
            options,
        }
    }

    /// The enriched table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Derived column names, for default display suppression.
    pub fn hidden_columns(&self) -> &HiddenColumnRegistry {
        &self.hidden
    }

    /// Run the interactive boundary: show the table, collect the selection.
    pub fn present<B: PresentationBridge>(&self, bridge: &mut B) -> RowSelection {
        bridge.present(&self.table, &self.hidden)
    }

    /// Sanitize a selection into a row-subset table ready for rendering.
    pub fn sanitize(&self, selection: &RowSelection) -> SanitizeResult<Table> {
        sanitize_selection(&self.table, &self.hidden, selection, &self.options.sanitize)
    }

    /// Sanitize `selection` and dispatch it as an email notification.
    ///
    /// An empty selection means "nothing to notify": the dispatcher is not
    /// invoked and [`DispatchOutcome::Empty`] is returned. Otherwise a single
    /// delivery attempt is made; its outcome is reported to the session's
    /// observer (recipient and row count only, never credentials or body).
    pub fn notify<D: NotificationDispatcher>(
        &self,
        selection: &RowSelection,
        dispatcher: &D,
        request: &NotificationRequest,
    ) -> Result<DispatchOutcome, EscalationError> {
        let subset = self.sanitize(selection)?;
        if subset.row_count() == 0 {
            return Ok(DispatchOutcome::Empty);
        }

        let ctx = EventContext::dispatch(&request.recipient);
        match dispatcher.dispatch(&subset, request) {
            Ok(()) => {
                if let Some(obs) = self.observer() {
                    obs.on_success(
                        &ctx,
                        StageStats {
                            rows: subset.row_count(),
                        },
                    );
                }
                Ok(DispatchOutcome::Sent {
                    rows: subset.row_count(),
                })
            }
            Err(e) => {
                if let Some(obs) = self.observer() {
                    obs.on_failure(&ctx, Severity::Error, &e);
                    if Severity::Error >= self.options.ingest.alert_at_or_above {
                        obs.on_alert(&ctx, Severity::Error, &e);
                    }
                }
                Err(e.into())
            }
        }
    }

    fn observer(&self) -> Option<&Arc<dyn PipelineObserver>> {
        self.options.ingest.observer.as_ref()
    }
}
