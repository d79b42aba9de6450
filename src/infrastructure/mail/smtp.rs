use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::{authentication::Credentials, PoolConfig},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::{
    errors::MailError,
    mail::{Mailer, OutgoingEmail, SmtpSettings},
};

const IMPLICIT_TLS_PORT: u16 = 465;
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Pooled SMTP client.
///
/// At most `max_connections` deliveries run at once; further callers wait for
/// a free slot. Each delivery is bounded by `send_timeout` once it owns a slot.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    permits: Arc<Semaphore>,
    send_timeout: Duration,
}

impl SmtpMailer {
    /// Authenticated, encrypted relay: implicit TLS on port 465, STARTTLS on
    /// any other port.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let builder = if settings.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
        };

        let credentials = Credentials::new(
            settings.username.clone(),
            settings.password.as_str().to_owned(),
        );

        let transport = builder
            .port(settings.port)
            .credentials(credentials)
            .timeout(Some(settings.connect_timeout))
            .pool_config(pool_config(settings.max_connections))
            .build();

        Ok(Self::with_transport(transport, settings.max_connections, settings.send_timeout))
    }

    /// Plain connection without TLS or authentication, for a relay on a
    /// trusted network.
    pub fn unencrypted(
        host: &str,
        port: u16,
        max_connections: u32,
        connect_timeout: Duration,
        send_timeout: Duration,
    ) -> Self {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .timeout(Some(connect_timeout))
            .pool_config(pool_config(max_connections))
            .build();

        Self::with_transport(transport, max_connections, send_timeout)
    }

    fn with_transport(
        transport: AsyncSmtpTransport<Tokio1Executor>,
        max_connections: u32,
        send_timeout: Duration,
    ) -> Self {
        SmtpMailer {
            transport,
            permits: Arc::new(Semaphore::new(max_connections.max(1) as usize)),
            send_timeout,
        }
    }

    /// Opens a connection and says hello. Used at startup to surface bad
    /// credentials early.
    pub async fn verify(&self) -> Result<bool, MailError> {
        Ok(self.transport.test_connection().await?)
    }

    /// Deliveries that could start right now without waiting.
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = build_message(email)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| MailError::PoolClosed)?;

        let response = tokio::time::timeout(self.send_timeout, self.transport.send(message))
            .await
            .map_err(|_| MailError::Timeout(self.send_timeout))??;

        debug!("SMTP accepted message: {}", response.code());
        Ok(())
    }
}

fn pool_config(max_connections: u32) -> PoolConfig {
    PoolConfig::new()
        .max_size(max_connections.max(1))
        .idle_timeout(POOL_IDLE_TIMEOUT)
}

fn build_message(email: OutgoingEmail) -> Result<Message, MailError> {
    Ok(Message::builder()
        .from(parse_mailbox(&email.from)?)
        .to(parse_mailbox(&email.to)?)
        .reply_to(parse_mailbox(&email.reply_to)?)
        .subject(email.subject)
        .multipart(MultiPart::alternative_plain_html(email.text, email.html))?)
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| {
            MailError::InvalidAddress(address.to_string(), e.to_string())
        })
}
