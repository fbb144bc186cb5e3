//! Fire-and-forget email notifications
//!
//! Services enqueue emails through [`Notifier`]; nothing they do waits on
//! delivery. [`QueueNotifier`] hands messages to a background worker started by
//! [`spawn_email_worker`], which delivers them by logging.

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Contents of one outgoing email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailPayload {
    pub subject: String,
    pub body: String,
}

impl EmailPayload {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// An email waiting for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub recipient: String,
    pub payload: EmailPayload,
}

/// Accepts emails for asynchronous delivery
pub trait Notifier: Send + Sync {
    /// Never fails from the caller's point of view
    fn enqueue_email(&self, recipient: &str, payload: EmailPayload);
}

/// Receiving half handed to the email worker
pub type EmailReceiver = mpsc::UnboundedReceiver<OutgoingEmail>;

/// [`Notifier`] backed by an unbounded channel
#[derive(Debug, Clone)]
pub struct QueueNotifier {
    sender: mpsc::UnboundedSender<OutgoingEmail>,
}

impl QueueNotifier {
    pub fn new() -> (Self, EmailReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for QueueNotifier {
    fn enqueue_email(&self, recipient: &str, payload: EmailPayload) {
        let email = OutgoingEmail {
            recipient: recipient.to_string(),
            payload,
        };
        if let Err(e) = self.sender.send(email) {
            warn!(recipient = %e.0.recipient, "Email worker is gone, dropping email");
        }
    }
}

/// [`Notifier`] that logs immediately, for setups without a worker
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn enqueue_email(&self, recipient: &str, payload: EmailPayload) {
        info!(recipient, subject = %payload.subject, "Email sent");
    }
}

/// Drain `receiver` until every sender is dropped; resolves to the number of
/// emails delivered
pub fn spawn_email_worker(mut receiver: EmailReceiver) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut delivered = 0;
        while let Some(email) = receiver.recv().await {
            info!(
                recipient = %email.recipient,
                subject = %email.payload.subject,
                "Email sent"
            );
            delivered += 1;
        }
        delivered
    })
}
