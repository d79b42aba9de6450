use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

// ───── Field caps (characters, after escaping) ──────────────────────────
pub const MAX_NAME_LENGTH: usize = 60;
pub const MAX_PHONE_LENGTH: usize = 40;
pub const MAX_SUBJECT_LENGTH: usize = 140;
pub const MAX_MESSAGE_LENGTH: usize = 4000;
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Largest accepted `/contact` body.
pub const JSON_BODY_LIMIT: usize = 32 * 1024;

// ───── Response messages ────────────────────────────────────────────────
pub const MESSAGE_DELIVERED: &str = "Message sent successfully";
pub const MESSAGE_DISCARDED: &str = "OK";
