use std::time::Duration;

use actix_web::{
    error::ResponseError,
    http::{header::{self, ContentType}, StatusCode},
    HttpResponse,
};
use derive_more::Display;

use crate::entities::contact::ContactResponse;

/// Every way a contact submission can fail, as seen by the HTTP caller.
///
/// The `Display` text is what ends up in the response body, so variants that
/// wrap internal errors must never print them.
#[derive(Debug, Display)]
pub enum ContactError {
    #[display("Required fields missing.")]
    MissingFields,

    #[display("Invalid e-mail.")]
    InvalidEmail,

    #[display("{_0}")]
    BadRequest(String),

    #[display("Payload too large.")]
    PayloadTooLarge,

    #[display("Too many requests, please try again later.")]
    RateLimited { retry_after: u64 },

    #[display("Failed to send email")]
    Dispatch(MailError),
}

impl ResponseError for ContactError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut builder = HttpResponse::build(status);
        builder.insert_header(ContentType::json());

        if let ContactError::RateLimited { retry_after } = self {
            builder.insert_header((header::RETRY_AFTER, retry_after.to_string()));
        }

        builder.json(ContactResponse::new(status, self.to_string()))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::MissingFields => StatusCode::BAD_REQUEST,
            ContactError::InvalidEmail => StatusCode::BAD_REQUEST,
            ContactError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ContactError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ContactError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ContactError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MailError> for ContactError {
    fn from(err: MailError) -> Self {
        ContactError::Dispatch(err)
    }
}

impl ContactError {
    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }
}

#[derive(Debug, Display)]
pub enum MailError {
    #[display("Invalid mailbox {_0}: {_1}")]
    InvalidAddress(String, String),

    #[display("Failed to build message: {_0}")]
    Build(String),

    #[display("SMTP transport error: {_0}")]
    Transport(String),

    #[display("SMTP delivery timed out after {}", humantime::format_duration(*_0))]
    Timeout(Duration),

    #[display("SMTP connection pool is closed")]
    PoolClosed,
}

impl std::error::Error for MailError {}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        MailError::Transport(err.to_string())
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        MailError::Build(err.to_string())
    }
}
