use std::sync::Arc;

use crate::{
    compose::compose,
    email_address::validate_email,
    entities::contact::{ContactOutcome, ContactRequest, SanitizedSubmission},
    errors::ContactError,
    mail::{MailEnvelope, Mailer},
};

pub struct ContactHandler {
    pub mailer: Arc<dyn Mailer>,
    pub envelope: MailEnvelope,
}

impl ContactHandler {
    pub fn new(mailer: Arc<dyn Mailer>, envelope: MailEnvelope) -> Self {
        ContactHandler { mailer, envelope }
    }

    /// Runs a submission through honeypot, validation, sanitizing and
    /// delivery, stopping at the first step that rejects it.
    pub async fn submit(&self, request: ContactRequest) -> Result<ContactOutcome, ContactError> {
        // Answer bots exactly like a success so they learn nothing
        if request.is_honeypotted() {
            tracing::warn!("Honeypot field filled, discarding submission");
            return Ok(ContactOutcome::Discarded);
        }

        let fields = request
            .required_fields()
            .ok_or(ContactError::MissingFields)?;

        validate_email(fields.email)?;

        let submission = SanitizedSubmission::new(
            fields,
            request.phone.as_deref(),
            request.subject.as_deref(),
        );
        let email = compose(&submission, &self.envelope);

        match self.mailer.send(email).await {
            Ok(()) => {
                tracing::info!("Contact message relayed");
                Ok(ContactOutcome::Delivered)
            }
            Err(e) => {
                tracing::error!("Failed to relay contact message: {}", e);
                Err(ContactError::Dispatch(e))
            }
        }
    }
}
