use std::time::Duration;

use derive_more::Display;
use parking_lot::Mutex;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tokio::sync::watch;
use url::Url;
use validator::{Validate, ValidationErrors};

use super::draft::{FieldKey, SubmissionDraft, SubmissionRequest};
use crate::constants::MESSAGE_DELIVERED;

/// How long a submission may take before the form gives up on it.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

const FALLBACK_REJECTED: &str = "Failed to send message.";
const FALLBACK_NETWORK: &str = "Something went wrong.";
const TIMED_OUT: &str = "Request timed out. Please try again.";

/// Why a submission failed. `Display` is the text shown under the form.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SubmitFailure {
    /// The relay answered with an error.
    #[display("{message}")]
    Rejected { status: u16, message: String },

    /// No usable answer: connection refused, reset, unreadable body.
    #[display("{}", FALLBACK_NETWORK)]
    Network(String),

    /// No answer within the submit timeout.
    #[display("{}", TIMED_OUT)]
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Sending,
    Succeeded(String),
    Failed(SubmitFailure),
}

impl FormPhase {
    pub fn is_sending(&self) -> bool {
        matches!(self, FormPhase::Sending)
    }

    /// Status line under the form, if any.
    pub fn status_message(&self) -> Option<String> {
        match self {
            FormPhase::Succeeded(message) => Some(message.clone()),
            FormPhase::Failed(failure) => Some(failure.to_string()),
            FormPhase::Idle | FormPhase::Sending => None,
        }
    }
}

#[derive(Debug, Display)]
pub enum FormError {
    #[display("Invalid relay address: {_0}")]
    InvalidEndpoint(String),

    #[display("HTTP client error: {_0}")]
    Client(String),

    #[display("A submission is already in flight")]
    AlreadySending,
}

impl std::error::Error for FormError {}

#[derive(Debug, Default, Deserialize)]
struct RelayReply {
    code: Option<u16>,
    message: Option<String>,
    error: Option<serde_json::Value>,
}

impl RelayReply {
    fn signals_error(&self) -> bool {
        self.error.is_some() || self.code.is_some_and(|code| code >= 400)
    }
}

/// Controller behind the portfolio contact form.
///
/// Holds the draft and the submission phase. While a submission is in flight
/// the controls are disabled: edits are ignored and a second `submit` is
/// refused, so there is never more than one request per form.
pub struct ContactForm {
    endpoint: Url,
    http: Client,
    timeout: Duration,
    draft: Mutex<SubmissionDraft>,
    phase: watch::Sender<FormPhase>,
}

impl ContactForm {
    /// `api_base` is where the relay is mounted, e.g. `https://relay.example.com`
    /// or `https://example.com/api`; submissions go to `{api_base}/contact`.
    pub fn new(api_base: &str) -> Result<Self, FormError> {
        let mut endpoint =
            Url::parse(api_base).map_err(|e| FormError::InvalidEndpoint(e.to_string()))?;
        endpoint
            .path_segments_mut()
            .map_err(|_| FormError::InvalidEndpoint(format!("{api_base} cannot be a base URL")))?
            .pop_if_empty()
            .push("contact");

        let http = Client::builder()
            .build()
            .map_err(|e| FormError::Client(e.to_string()))?;

        let (phase, _) = watch::channel(FormPhase::Idle);

        Ok(ContactForm {
            endpoint,
            http,
            timeout: SUBMIT_TIMEOUT,
            draft: Mutex::new(SubmissionDraft::default()),
            phase,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Stores a keystroke. Returns `false` when the controls are disabled.
    pub fn update_field(&self, key: FieldKey, value: impl Into<String>) -> bool {
        if self.phase.borrow().is_sending() {
            return false;
        }
        self.draft.lock().set(key, value.into());
        true
    }

    pub fn draft(&self) -> SubmissionDraft {
        self.draft.lock().clone()
    }

    /// Advisory checks mirroring the input constraints. Never blocks
    /// [`ContactForm::submit`].
    pub fn validation_hints(&self) -> Result<(), ValidationErrors> {
        self.draft.lock().validate()
    }

    pub fn phase(&self) -> FormPhase {
        self.phase.borrow().clone()
    }

    /// Notified on every phase change.
    pub fn subscribe(&self) -> watch::Receiver<FormPhase> {
        self.phase.subscribe()
    }

    pub fn controls_enabled(&self) -> bool {
        !self.phase.borrow().is_sending()
    }

    pub fn button_label(&self) -> &'static str {
        if self.phase.borrow().is_sending() {
            "Sending..."
        } else {
            "Send"
        }
    }

    /// Posts the trimmed draft to the relay and settles in `Succeeded` or
    /// `Failed`. The draft is cleared only on success.
    pub async fn submit(&self) -> Result<FormPhase, FormError> {
        let started = self.phase.send_if_modified(|phase| {
            if phase.is_sending() {
                false
            } else {
                *phase = FormPhase::Sending;
                true
            }
        });
        if !started {
            return Err(FormError::AlreadySending);
        }
        let guard = SendingGuard {
            phase: &self.phase,
            settled: false,
        };

        let payload = SubmissionRequest::from(&*self.draft.lock());

        let terminal = match tokio::time::timeout(self.timeout, self.post(&payload)).await {
            Ok(Ok(())) => {
                *self.draft.lock() = SubmissionDraft::default();
                FormPhase::Succeeded(MESSAGE_DELIVERED.to_string())
            }
            Ok(Err(failure)) => FormPhase::Failed(failure),
            Err(_) => FormPhase::Failed(SubmitFailure::TimedOut),
        };

        guard.settle(terminal.clone());
        Ok(terminal)
    }

    async fn post(&self, payload: &SubmissionRequest) -> Result<(), SubmitFailure> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| SubmitFailure::Network(e.to_string()))?;

        let status = response.status();
        let reply = response.json::<RelayReply>().await.unwrap_or_default();

        if status.is_success() && !reply.signals_error() {
            return Ok(());
        }

        Err(SubmitFailure::Rejected {
            status: rejected_status(status, &reply),
            message: reply
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_REJECTED.to_string()),
        })
    }
}

/// Returns the form to `Idle` if a submission is dropped before it settles.
struct SendingGuard<'a> {
    phase: &'a watch::Sender<FormPhase>,
    settled: bool,
}

impl SendingGuard<'_> {
    fn settle(mut self, terminal: FormPhase) {
        self.phase.send_replace(terminal);
        self.settled = true;
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.phase.send_replace(FormPhase::Idle);
        }
    }
}

fn rejected_status(status: StatusCode, reply: &RelayReply) -> u16 {
    if status.is_success() {
        reply.code.unwrap_or(status.as_u16())
    } else {
        status.as_u16()
    }
}
