//! Email dispatch seam.
//!
//! The core only decides whether to send and with which payload; delivery
//! belongs to the `EmailDispatcher` implementation supplied by the host.

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outbound email payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Delivery failure reported by a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DispatchError(pub String);

/// Sends one email. Implementations own transport and retries.
pub trait EmailDispatcher {
    fn send(&self, message: &EmailMessage) -> Result<(), DispatchError>;
}

/// Dispatcher that only records the send decision in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmailDispatcher;

impl EmailDispatcher for LogEmailDispatcher {
    fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        info!(
            "event=email_dispatch module=directory status=ok transport=log recipient={} subject_chars={}",
            message.recipient,
            message.subject.chars().count()
        );
        Ok(())
    }
}

impl<T: EmailDispatcher + ?Sized> EmailDispatcher for &T {
    fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        (**self).send(message)
    }
}
