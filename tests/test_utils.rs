#![allow(dead_code)]

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use async_trait::async_trait;
use parking_lot::Mutex;
use portfolio_relay::{
    errors::MailError,
    limiter::{
        clock::ManualClock,
        rate_limiter::{RateLimitConfig, RateLimiterStore},
    },
    mail::{MailEnvelope, Mailer, OutgoingEmail},
    middlewares::cors::{relay_cors, security_headers},
    routes::configure_routes,
    use_cases::contact::ContactHandler,
    AppState,
};
use reqwest::Client;
use serde_json::{json, Value};
use std::{net::TcpListener, sync::Arc, time::Duration};

pub const ALLOWED_ORIGIN: &str = "https://portfolio.example";

/// Mailer that keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        RecordingMailer {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().push(email);
        if self.fail {
            return Err(MailError::Transport("535 5.7.8 Username and Password not accepted".into()));
        }
        Ok(())
    }
}

pub fn test_envelope() -> MailEnvelope {
    MailEnvelope {
        from: "\"Portfolio\" <relay@example.com>".to_string(),
        to: "owner@example.com".to_string(),
    }
}

/// Window as deployed, with delays short enough for tests.
pub fn test_rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        window: Duration::from_secs(60),
        max_requests: 10,
        delay_after: 3,
        delay_step: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(RecordingMailer::default())).await
    }

    pub async fn spawn_with(mailer: Arc<RecordingMailer>) -> Self {
        let clock = Arc::new(ManualClock::new());

        let state = web::Data::new(AppState {
            contact_handler: ContactHandler::new(mailer.clone(), test_envelope()),
            limiter: RateLimiterStore::with_clock(test_rate_limit(), clock.clone()),
            trust_x_forwarded_for: true,
        });

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let origins = vec![ALLOWED_ORIGIN.to_string()];
        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(security_headers())
                .wrap(relay_cors(&origins))
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(1)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(format!("{}/ping", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            address,
            client,
            mailer,
            clock,
        }
    }

    /// Posts `body` to `/contact` as client `client_ip`.
    pub async fn post_contact(&self, client_ip: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/contact", self.address))
            .header("X-Forwarded-For", client_ip)
            .json(body)
            .send()
            .await
            .expect("Failed to post contact form")
    }
}

pub fn valid_submission() -> Value {
    json!({
        "firstName": "Ana",
        "lastName": "Lima",
        "email": "ana@example.com",
        "message": "Hello"
    })
}
