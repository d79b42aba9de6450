use validator::ValidateEmail;

use crate::{constants::MAX_EMAIL_LENGTH, errors::ContactError};

/// Syntactic check, then the same check on the provider-normalized form.
pub fn validate_email(email: &str) -> Result<(), ContactError> {
    if email.len() > MAX_EMAIL_LENGTH || !email.validate_email() {
        return Err(ContactError::InvalidEmail);
    }

    match normalize_email(email) {
        Some(normalized) if normalized.validate_email() => Ok(()),
        _ => Err(ContactError::InvalidEmail),
    }
}

/// Canonical form of an address: lower-cased, provider aliases folded and
/// sub-addresses removed where the provider ignores them. Dots in Gmail local
/// parts are kept.
///
/// Returns `None` when nothing of the local part survives.
pub fn normalize_email(email: &str) -> Option<String> {
    let (local, domain) = email.trim().rsplit_once('@')?;
    let mut domain = domain.to_lowercase();

    let local = match domain.as_str() {
        "gmail.com" | "googlemail.com" => {
            domain = "gmail.com".to_string();
            strip_subaddress(local, '+')
        }
        "icloud.com" | "me.com" | "mac.com" => strip_subaddress(local, '+'),
        "outlook.com" | "hotmail.com" | "live.com" | "msn.com" => strip_subaddress(local, '+'),
        "yahoo.com" | "ymail.com" | "rocketmail.com" => strip_trailing_subaddress(local, '-'),
        "yandex.ru" | "yandex.com" | "ya.ru" | "yandex.ua" | "yandex.kz" | "yandex.by" => {
            domain = "yandex.ru".to_string();
            local
        }
        _ => local,
    };

    if local.is_empty() {
        return None;
    }

    Some(format!("{}@{}", local.to_lowercase(), domain))
}

/// `first+tag` → `first`
fn strip_subaddress(local: &str, separator: char) -> &str {
    local.split(separator).next().unwrap_or_default()
}

/// `first-part-tag` → `first-part`
fn strip_trailing_subaddress(local: &str, separator: char) -> &str {
    local
        .rsplit_once(separator)
        .map_or(local, |(head, _)| head)
}
