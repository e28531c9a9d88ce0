//! Notification rendering and dispatch.
//!
//! A sanitized row subset is rendered as one self-contained HTML document
//! ([`render`]) and transmitted as a MIME-HTML message over an authenticated,
//! STARTTLS-encrypted SMTP session ([`smtp`]). One attempt per call; failures
//! name the stage that failed.

pub mod render;
pub mod smtp;

pub use render::render_html;
pub use smtp::{
    NotificationDispatcher, NotificationRequest, RelayConfig, SmtpDispatcher, DEFAULT_RELAY_HOST,
    SUBMISSION_PORT,
};
