//! Client side of the contact form: the draft the visitor edits and the
//! controller that submits it to the relay.

pub mod draft;
pub mod form;

pub use draft::{FieldKey, SubmissionDraft, SubmissionRequest};
pub use form::{ContactForm, FormError, FormPhase, SubmitFailure, SUBMIT_TIMEOUT};
