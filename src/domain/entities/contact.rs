use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    constants::{
        MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH, MAX_PHONE_LENGTH, MAX_SUBJECT_LENGTH,
        MESSAGE_DELIVERED, MESSAGE_DISCARDED,
    },
    sanitize::{sanitize, sanitize_multiline},
};

/// Body of `POST /contact` as sent by the portfolio form.
///
/// Every field is optional on the wire; presence is checked by the
/// submission pipeline so that the caller gets the ordered error messages.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    /// Honeypot. Hidden from humans, filled by bots with whatever type they
    /// like, so it is taken as raw JSON.
    pub hp: Option<Value>,
}

impl ContactRequest {
    /// Any truthy honeypot value: a non-empty string, `true`, a non-zero
    /// number, an array or an object.
    pub fn is_honeypotted(&self) -> bool {
        match &self.hp {
            None | Some(Value::Null) => false,
            Some(Value::Bool(filled)) => *filled,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }

    /// Required fields, trimmed. `None` when any of them is missing or blank.
    pub fn required_fields(&self) -> Option<RequiredFields<'_>> {
        Some(RequiredFields {
            first_name: non_blank(&self.first_name)?,
            last_name: non_blank(&self.last_name)?,
            email: non_blank(&self.email)?,
            message: non_blank(&self.message)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RequiredFields<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// A submission whose text fields are safe to interpolate into HTML.
///
/// `email` is only trimmed; it must be escaped wherever it is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl SanitizedSubmission {
    pub fn new(fields: RequiredFields<'_>, phone: Option<&str>, subject: Option<&str>) -> Self {
        SanitizedSubmission {
            first_name: sanitize(fields.first_name, MAX_NAME_LENGTH),
            last_name: sanitize(fields.last_name, MAX_NAME_LENGTH),
            email: fields.email.trim().to_string(),
            phone: sanitize(phone.unwrap_or_default(), MAX_PHONE_LENGTH),
            subject: sanitize(subject.map(str::trim).unwrap_or_default(), MAX_SUBJECT_LENGTH),
            message: sanitize_multiline(fields.message, MAX_MESSAGE_LENGTH),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// JSON body of every `/contact` response, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactResponse {
    pub code: u16,
    pub message: String,
}

impl ContactResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ContactResponse {
            code: status.as_u16(),
            message: message.into(),
        }
    }
}

/// How an accepted submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// The email was handed to the mail server.
    Delivered,
    /// The honeypot was filled; nothing was sent.
    Discarded,
}

impl ContactOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            ContactOutcome::Delivered => MESSAGE_DELIVERED,
            ContactOutcome::Discarded => MESSAGE_DISCARDED,
        }
    }
}

impl From<ContactOutcome> for ContactResponse {
    fn from(outcome: ContactOutcome) -> Self {
        ContactResponse::new(StatusCode::OK, outcome.message())
    }
}
