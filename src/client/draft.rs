use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use validator::Validate;

use crate::constants::{
    MAX_EMAIL_LENGTH, MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH, MAX_PHONE_LENGTH, MAX_SUBJECT_LENGTH,
};

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-zÀ-ÿ' -]{1,60}$").expect("name pattern is valid")
});

/// Form inputs addressable by [`super::ContactForm::update_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    FirstName,
    LastName,
    Email,
    Phone,
    Subject,
    Message,
    Honeypot,
}

/// What the user has typed so far. The honeypot is never shown to humans.
#[derive(Debug, Default, Clone, PartialEq, Eq, Validate)]
pub struct SubmissionDraft {
    #[validate(
        length(min = 1, max = 60, message = "First name is required (max 60 characters)"),
        regex(path = *NAME_PATTERN, message = "Letters, spaces, apostrophes and hyphens only")
    )]
    pub first_name: String,

    #[validate(
        length(min = 1, max = 60, message = "Last name is required (max 60 characters)"),
        regex(path = *NAME_PATTERN, message = "Letters, spaces, apostrophes and hyphens only")
    )]
    pub last_name: String,

    #[validate(
        email(message = "Enter a valid e-mail address"),
        length(max = 254, message = "E-mail is too long")
    )]
    pub email: String,

    #[validate(length(max = 40, message = "Phone is too long"))]
    pub phone: String,

    #[validate(length(max = 140, message = "Subject is too long"))]
    pub subject: String,

    #[validate(length(min = 1, max = 4000, message = "Message is required (max 4000 characters)"))]
    pub message: String,

    pub honeypot: String,
}

impl SubmissionDraft {
    pub fn set(&mut self, key: FieldKey, value: String) {
        let slot = match key {
            FieldKey::FirstName => &mut self.first_name,
            FieldKey::LastName => &mut self.last_name,
            FieldKey::Email => &mut self.email,
            FieldKey::Phone => &mut self.phone,
            FieldKey::Subject => &mut self.subject,
            FieldKey::Message => &mut self.message,
            FieldKey::Honeypot => &mut self.honeypot,
        };
        *slot = value;
    }

    pub fn get(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::FirstName => &self.first_name,
            FieldKey::LastName => &self.last_name,
            FieldKey::Email => &self.email,
            FieldKey::Phone => &self.phone,
            FieldKey::Subject => &self.subject,
            FieldKey::Message => &self.message,
            FieldKey::Honeypot => &self.honeypot,
        }
    }

    /// Input limits the form controls enforce as the user types.
    pub fn max_length(key: FieldKey) -> Option<usize> {
        match key {
            FieldKey::FirstName | FieldKey::LastName => Some(MAX_NAME_LENGTH),
            FieldKey::Email => Some(MAX_EMAIL_LENGTH),
            FieldKey::Phone => Some(MAX_PHONE_LENGTH),
            FieldKey::Subject => Some(MAX_SUBJECT_LENGTH),
            FieldKey::Message => Some(MAX_MESSAGE_LENGTH),
            FieldKey::Honeypot => None,
        }
    }
}

/// The JSON body posted to `/contact`: every field trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub hp: String,
}

impl From<&SubmissionDraft> for SubmissionRequest {
    fn from(draft: &SubmissionDraft) -> Self {
        SubmissionRequest {
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            subject: draft.subject.trim().to_string(),
            message: draft.message.trim().to_string(),
            hp: draft.honeypot.trim().to_string(),
        }
    }
}
