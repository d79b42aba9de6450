use std::time::Duration;

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::errors::MailError;

pub mod smtp;

pub use smtp::SmtpMailer;

/// A fully rendered message, addresses still in textual mailbox form
/// (`"Name" <user@host>` or `user@host`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Fixed sender and recipient of relayed messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailEnvelope {
    pub from: String,
    pub to: String,
}

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Zeroizing<String>,
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub send_timeout: Duration,
}

/// Delivers one message and reports the outcome. Implementations make a
/// single attempt; retrying is up to nobody.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}
