use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use portfolio_relay::{
    entities::contact::{ContactOutcome, ContactRequest},
    errors::{ContactError, MailError},
    mail::{MailEnvelope, Mailer, OutgoingEmail},
    use_cases::contact::ContactHandler,
};
use serde_json::json;

mock! {
    pub Relay {}

    #[async_trait]
    impl Mailer for Relay {
        async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
    }
}

fn envelope() -> MailEnvelope {
    MailEnvelope {
        from: "relay@example.com".to_string(),
        to: "owner@example.com".to_string(),
    }
}

fn handler(mailer: MockRelay) -> ContactHandler {
    ContactHandler::new(Arc::new(mailer), envelope())
}

fn request() -> ContactRequest {
    ContactRequest {
        first_name: Some("Ana".into()),
        last_name: Some("Lima".into()),
        email: Some("ana@example.com".into()),
        message: Some("Hello".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn delivers_once_with_reply_to_submitter() {
    let mut mailer = MockRelay::new();
    mailer
        .expect_send()
        .times(1)
        .withf(|email| {
            email.reply_to == "ana@example.com"
                && email.from == "relay@example.com"
                && email.to == "owner@example.com"
        })
        .returning(|_| Ok(()));

    let outcome = handler(mailer).submit(request()).await.unwrap();

    assert_eq!(outcome, ContactOutcome::Delivered);
}

#[tokio::test]
async fn honeypot_short_circuits_before_validation() {
    let mut mailer = MockRelay::new();
    mailer.expect_send().never();

    let outcome = handler(mailer)
        .submit(ContactRequest {
            hp: Some("spam".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(outcome, ContactOutcome::Discarded);
}

#[tokio::test]
async fn whitespace_honeypot_still_counts_as_filled() {
    let mut mailer = MockRelay::new();
    mailer.expect_send().never();

    let outcome = handler(mailer)
        .submit(ContactRequest {
            hp: Some(" ".into()),
            ..request()
        })
        .await
        .unwrap();

    assert_eq!(outcome, ContactOutcome::Discarded);
}

#[tokio::test]
async fn empty_honeypot_is_ignored() {
    let mut mailer = MockRelay::new();
    mailer.expect_send().times(1).returning(|_| Ok(()));

    let outcome = handler(mailer)
        .submit(ContactRequest {
            hp: Some("".into()),
            ..request()
        })
        .await
        .unwrap();

    assert_eq!(outcome, ContactOutcome::Delivered);
}

#[tokio::test]
async fn non_string_honeypot_values_count_when_truthy() {
    for hp in [json!(1), json!(true), json!(["x"]), json!({ "a": 1 })] {
        let mut mailer = MockRelay::new();
        mailer.expect_send().never();

        let outcome = handler(mailer)
            .submit(ContactRequest {
                hp: Some(hp.clone()),
                ..request()
            })
            .await
            .unwrap();

        assert_eq!(outcome, ContactOutcome::Discarded, "hp: {hp}");
    }
}

#[tokio::test]
async fn falsy_honeypot_values_are_ignored() {
    for hp in [json!(null), json!(false), json!(0)] {
        let mut mailer = MockRelay::new();
        mailer.expect_send().times(1).returning(|_| Ok(()));

        let outcome = handler(mailer)
            .submit(ContactRequest {
                hp: Some(hp.clone()),
                ..request()
            })
            .await
            .unwrap();

        assert_eq!(outcome, ContactOutcome::Delivered, "hp: {hp}");
    }
}

#[tokio::test]
async fn missing_fields_are_checked_before_email() {
    let mut mailer = MockRelay::new();
    mailer.expect_send().never();

    let err = handler(mailer)
        .submit(ContactRequest {
            message: None,
            email: Some("definitely not an email".into()),
            ..request()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ContactError::MissingFields));
}

#[tokio::test]
async fn invalid_email_never_reaches_the_mailer() {
    let mut mailer = MockRelay::new();
    mailer.expect_send().never();

    let err = handler(mailer)
        .submit(ContactRequest {
            email: Some("ana.example.com".into()),
            ..request()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ContactError::InvalidEmail));
    assert_eq!(err.to_string(), "Invalid e-mail.");
}

#[tokio::test]
async fn mailer_failure_becomes_dispatch_error_with_generic_text() {
    let mut mailer = MockRelay::new();
    mailer
        .expect_send()
        .times(1)
        .returning(|_| Err(MailError::Transport("454 4.7.0 Too many login attempts".into())));

    let err = handler(mailer).submit(request()).await.unwrap_err();

    assert!(matches!(err, ContactError::Dispatch(MailError::Transport(_))));
    assert_eq!(err.to_string(), "Failed to send email");
}

#[tokio::test]
async fn optional_fields_flow_into_the_email() {
    let mut mailer = MockRelay::new();
    mailer
        .expect_send()
        .times(1)
        .withf(|email| {
            email.subject == "Project enquiry"
                && email.text.contains("Phone: +55 11 5555-0100")
                && email.text.ends_with("Hello")
        })
        .returning(|_| Ok(()));

    let outcome = handler(mailer)
        .submit(ContactRequest {
            phone: Some("+55 11 5555-0100".into()),
            subject: Some("  Project enquiry ".into()),
            ..request()
        })
        .await
        .unwrap();

    assert_eq!(outcome, ContactOutcome::Delivered);
}
