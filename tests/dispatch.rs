use std::sync::{Arc, Mutex};

use report_escalation::bridge::{PresentationBridge, RowSelection, SelectedRow};
use report_escalation::error::{DeliveryError, DeliveryResult, DeliveryStage};
use report_escalation::notify::{NotificationDispatcher, NotificationRequest};
use report_escalation::observe::{EventContext, PipelineObserver, Severity, StageStats};
use report_escalation::session::{DispatchOutcome, ReportSession, SessionOptions};
use report_escalation::types::{HiddenColumnRegistry, Table, Value};
use report_escalation::EscalationError;

/// Captures every table the session hands to the mail boundary.
#[derive(Default)]
struct RecordingDispatcher {
    dispatched: Mutex<Vec<Table>>,
    fail_with: Option<DeliveryStage>,
}

impl NotificationDispatcher for RecordingDispatcher {
    fn dispatch(&self, table: &Table, _request: &NotificationRequest) -> DeliveryResult<()> {
        self.dispatched.lock().unwrap().push(table.clone());
        match self.fail_with {
            Some(stage) => Err(DeliveryError::new(stage, "injected failure")),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(String, usize)>>,
    failures: Mutex<Vec<Severity>>,
    alerts: Mutex<Vec<Severity>>,
}

impl PipelineObserver for RecordingObserver {
    fn on_success(&self, ctx: &EventContext, stats: StageStats) {
        self.successes
            .lock()
            .unwrap()
            .push((ctx.subject.clone(), stats.rows));
    }

    fn on_failure(&self, _ctx: &EventContext, severity: Severity, _error: &dyn std::error::Error) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &EventContext, severity: Severity, _error: &dyn std::error::Error) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn request() -> NotificationRequest {
    NotificationRequest {
        sender: "oncall@example.com".to_string(),
        secret: "app-password".to_string(),
        recipient: "manager@example.com".to_string(),
        subject: "Escalation: Selected Issues".to_string(),
    }
}

fn session() -> ReportSession {
    let csv = b"Key,Priority,Created\nOPS-101,High,2023-01-05\nOPS-102,Critical,2023-02-19\n";
    ReportSession::from_bytes(csv, "report.csv", SessionOptions::default()).unwrap()
}

fn selection_of_both_rows() -> RowSelection {
    let mut first = SelectedRow::with_origin("n0");
    first.push("Key", Value::Utf8("OPS-101".to_string()));
    first.push("Priority", Value::Utf8("High".to_string()));
    let mut second = SelectedRow::with_origin("n1");
    second.push("Key", Value::Utf8("OPS-102".to_string()));
    second.push("Priority", Value::Utf8("Critical".to_string()));
    RowSelection::new(vec![first, second])
}

#[test]
fn empty_selection_never_reaches_the_dispatcher() {
    let dispatcher = RecordingDispatcher::default();
    let outcome = session()
        .notify(&RowSelection::default(), &dispatcher, &request())
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Empty);
    assert!(dispatcher.dispatched.lock().unwrap().is_empty());
}

#[test]
fn dispatched_tables_carry_no_bookkeeping_fields() {
    let dispatcher = RecordingDispatcher::default();
    let outcome = session()
        .notify(&selection_of_both_rows(), &dispatcher, &request())
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Sent { rows: 2 });

    let dispatched = dispatcher.dispatched.lock().unwrap();
    assert_eq!(dispatched.len(), 1);
    let table = &dispatched[0];
    assert_eq!(table.row_count(), 2);
    assert!(table.column_names().all(|n| !n.starts_with('_')));
    // Source column order is preserved, derived columns ride along by default.
    assert_eq!(table.column_names().next(), Some("Key"));
    assert!(table.column("Created_Month").is_some());
}

#[test]
fn delivery_failures_propagate_with_their_stage() {
    let dispatcher = RecordingDispatcher {
        fail_with: Some(DeliveryStage::Authentication),
        ..Default::default()
    };
    let err = session()
        .notify(&selection_of_both_rows(), &dispatcher, &request())
        .unwrap_err();

    match err {
        EscalationError::Delivery(e) => assert_eq!(e.stage, DeliveryStage::Authentication),
        other => panic!("unexpected error: {other}"),
    }
    // Exactly one attempt; no retry.
    assert_eq!(dispatcher.dispatched.lock().unwrap().len(), 1);
}

#[test]
fn observer_sees_dispatch_outcomes_but_never_credentials() {
    let observer = Arc::new(RecordingObserver::default());
    let csv = b"Key,Priority\nOPS-101,High\n";
    let mut options = SessionOptions::default();
    options.ingest.observer = Some(observer.clone());
    options.ingest.alert_at_or_above = Severity::Error;
    let session = ReportSession::from_bytes(csv, "report.csv", options).unwrap();

    let mut row = SelectedRow::with_origin("n0");
    row.push("Key", Value::Utf8("OPS-101".to_string()));
    let selection = RowSelection::new(vec![row]);

    // Success path: ingest + dispatch both report.
    let dispatcher = RecordingDispatcher::default();
    session.notify(&selection, &dispatcher, &request()).unwrap();
    let successes = observer.successes.lock().unwrap().clone();
    assert_eq!(successes.len(), 2);
    assert_eq!(successes[0], ("report.csv".to_string(), 1));
    assert_eq!(successes[1], ("manager@example.com".to_string(), 1));
    assert!(successes.iter().all(|(subject, _)| !subject.contains("app-password")));

    // Failure path: failure and alert both fire at the Error threshold.
    let failing = RecordingDispatcher {
        fail_with: Some(DeliveryStage::Connection),
        ..Default::default()
    };
    let _ = session.notify(&selection, &failing, &request()).unwrap_err();
    assert_eq!(*observer.failures.lock().unwrap(), vec![Severity::Error]);
    assert_eq!(*observer.alerts.lock().unwrap(), vec![Severity::Error]);
}

/// A scripted stand-in for the interactive grid.
struct CheckFirstRow;

impl PresentationBridge for CheckFirstRow {
    fn present(&mut self, table: &Table, hidden: &HiddenColumnRegistry) -> RowSelection {
        // A real widget hides registered columns; this one just selects row 0
        // of the visible columns and attaches its bookkeeping field.
        let mut row = SelectedRow::with_origin("row-0");
        for column in table.columns() {
            if hidden.contains(&column.name) {
                continue;
            }
            row.push(column.name.clone(), column.values[0].clone());
        }
        RowSelection::new(vec![row])
    }
}

#[test]
fn bridge_selection_round_trips_through_the_pipeline() {
    let session = session();
    let selection = session.present(&mut CheckFirstRow);
    assert_eq!(selection.len(), 1);

    let dispatcher = RecordingDispatcher::default();
    let outcome = session.notify(&selection, &dispatcher, &request()).unwrap();
    assert_eq!(outcome, DispatchOutcome::Sent { rows: 1 });

    let dispatched = dispatcher.dispatched.lock().unwrap();
    assert_eq!(
        dispatched[0].column("Key").unwrap().values[0],
        Value::Utf8("OPS-101".to_string())
    );
}
