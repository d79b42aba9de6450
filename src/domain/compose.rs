//! Renders a sanitized submission into the email the inbox receives.

use crate::{
    entities::contact::SanitizedSubmission,
    mail::{MailEnvelope, OutgoingEmail},
    sanitize::escape_html,
};

pub fn subject_line(submission: &SanitizedSubmission) -> String {
    if submission.subject.is_empty() {
        format!("Contact from Portfolio — {}", submission.full_name())
    } else {
        submission.subject.clone()
    }
}

pub fn text_body(submission: &SanitizedSubmission, subject: &str) -> String {
    format!(
        "Name: {}\nE-mail: {}\nPhone: {}\nSubject: {}\n\n{}",
        submission.full_name(),
        submission.email,
        phone_or_dash(submission),
        subject,
        submission.message,
    )
}

pub fn html_body(submission: &SanitizedSubmission, subject: &str) -> String {
    format!(
        r#"<div style="font-family: system-ui, -apple-system, Segoe UI, Roboto, sans-serif; line-height:1.45">
  <h2 style="margin:0 0 12px">New portfolio message</h2>
  <p><strong>Name:</strong> {name}</p>
  <p><strong>E-mail:</strong> {email}</p>
  <p><strong>Phone:</strong> {phone}</p>
  <p><strong>Subject:</strong> {subject}</p>
  <hr style="border:none;border-top:1px solid #eee;margin:16px 0" />
  <div>{message}</div>
</div>"#,
        name = submission.full_name(),
        email = escape_html(&submission.email),
        phone = phone_or_dash(submission),
        subject = subject,
        message = submission.message.replace('\n', "<br/>"),
    )
}

/// Full email for `submission`, replying to the submitter.
pub fn compose(submission: &SanitizedSubmission, envelope: &MailEnvelope) -> OutgoingEmail {
    let subject = subject_line(submission);

    OutgoingEmail {
        from: envelope.from.clone(),
        to: envelope.to.clone(),
        reply_to: submission.email.clone(),
        text: text_body(submission, &subject),
        html: html_body(submission, &subject),
        subject,
    }
}

fn phone_or_dash(submission: &SanitizedSubmission) -> &str {
    if submission.phone.is_empty() {
        "-"
    } else {
        &submission.phone
    }
}
