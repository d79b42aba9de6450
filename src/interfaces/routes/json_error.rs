use actix_web::{error::JsonPayloadError, web};

use crate::{constants::JSON_BODY_LIMIT, errors::ContactError};

/// Body limit and `{code, message}` errors for every JSON extractor.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(|err, _req| {
                tracing::debug!("Rejected JSON body: {}", err);
                ContactError::from(err).into()
            }),
    );
}

impl From<JsonPayloadError> for ContactError {
    fn from(err: JsonPayloadError) -> Self {
        match err {
            JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                ContactError::PayloadTooLarge
            }
            JsonPayloadError::ContentType => {
                ContactError::BadRequest("Content-Type must be application/json.".to_string())
            }
            JsonPayloadError::Deserialize(e) => {
                ContactError::BadRequest(format!("Malformed JSON body: {}", e))
            }
            _ => ContactError::BadRequest("Unreadable request body.".to_string()),
        }
    }
}
