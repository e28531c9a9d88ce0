//! SMTP notification dispatch.

use std::fmt;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::Category;
use lettre::{Message, SmtpTransport, Transport};

use crate::error::{DeliveryError, DeliveryResult, DeliveryStage};
use crate::types::Table;

use super::render::render_html;

/// Default outbound relay host.
pub const DEFAULT_RELAY_HOST: &str = "smtp.office365.com";

/// Mail submission port; STARTTLS is negotiated after connect.
pub const SUBMISSION_PORT: u16 = 587;

/// Outbound relay endpoint configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Relay hostname.
    pub host: String,
    /// Submission port.
    pub port: u16,
    /// Socket timeout bounding connect/read/write. `None` blocks until the
    /// transport layer gives up on its own.
    pub timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RELAY_HOST.to_string(),
            port: SUBMISSION_PORT,
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Per-send inputs.
///
/// Credentials are opaque: accepted as-is, used for one authentication, never
/// logged, and dropped with this value. Each send supplies them afresh.
#[derive(Clone)]
pub struct NotificationRequest {
    /// Sender address, also the authentication identity.
    pub sender: String,
    /// Sender secret.
    pub secret: String,
    /// Recipient address.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
}

impl fmt::Debug for NotificationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationRequest")
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

/// Dispatcher seam between the session and the mail boundary.
pub trait NotificationDispatcher {
    /// Render `table` and transmit it to the request's recipient.
    ///
    /// A single attempt: failure is reported to the caller, never retried.
    fn dispatch(&self, table: &Table, request: &NotificationRequest) -> DeliveryResult<()>;
}

/// Dispatches over an authenticated, STARTTLS-encrypted SMTP session against a
/// fixed outbound relay.
#[derive(Debug, Clone, Default)]
pub struct SmtpDispatcher {
    relay: RelayConfig,
}

impl SmtpDispatcher {
    /// A dispatcher against the given relay.
    pub fn new(relay: RelayConfig) -> Self {
        Self { relay }
    }
}

impl NotificationDispatcher for SmtpDispatcher {
    fn dispatch(&self, table: &Table, request: &NotificationRequest) -> DeliveryResult<()> {
        let message = build_message(table, request)?;

        let transport = SmtpTransport::starttls_relay(&self.relay.host)
            .map_err(|e| DeliveryError::new(DeliveryStage::Connection, e.to_string()))?
            .port(self.relay.port)
            .timeout(self.relay.timeout)
            .credentials(Credentials::new(
                request.sender.clone(),
                request.secret.clone(),
            ))
            .build();

        transport
            .send(&message)
            .map(|_| ())
            .map_err(|e| DeliveryError::new(failure_stage(&e), e.to_string()))
    }
}

fn build_message(table: &Table, request: &NotificationRequest) -> DeliveryResult<Message> {
    let from: Mailbox = request.sender.parse().map_err(|e| {
        DeliveryError::new(DeliveryStage::Rendering, format!("sender address: {e}"))
    })?;
    let to: Mailbox = request.recipient.parse().map_err(|e| {
        DeliveryError::new(DeliveryStage::Rendering, format!("recipient address: {e}"))
    })?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(request.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(render_html(table))
        .map_err(|e| DeliveryError::new(DeliveryStage::Rendering, e.to_string()))
}

/// Map a transport error to the stage of the send state machine it belongs to.
///
/// Errors carrying an SMTP reply code split on the x3x category (530/534/535/
/// 538, the authentication family); errors without a reply are
/// connection-level (resolution, TCP, TLS negotiation, timeout).
fn failure_stage(error: &lettre::transport::smtp::Error) -> DeliveryStage {
    if error.is_timeout() {
        return DeliveryStage::Connection;
    }
    match error.status() {
        Some(code) if code.category == Category::Unspecified3 => DeliveryStage::Authentication,
        Some(_) => DeliveryStage::Transmission,
        None => DeliveryStage::Connection,
    }
}
