use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod client;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;
pub mod telemetry;

pub use domain::{compose, email_address, entities, sanitize, use_cases};
pub use interfaces::{handlers, middlewares, routes};
pub use infrastructure::{limiter, mail, utils};

use limiter::rate_limiter::RateLimiterStore;
use mail::Mailer;
use use_cases::contact::ContactHandler;

pub struct AppState {
    pub contact_handler: ContactHandler,
    pub limiter: RateLimiterStore,
    pub trust_x_forwarded_for: bool,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        let contact_handler = ContactHandler::new(mailer, config.envelope());
        let limiter = RateLimiterStore::new(config.rate_limit());

        AppState {
            contact_handler,
            limiter,
            trust_x_forwarded_for: config.trust_x_forwarded_for,
        }
    }
}
