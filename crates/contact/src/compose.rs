use askama::Template;
use serde::Serialize;

use crate::Submission;

pub const SUBJECT_PREFIX: &str = "[Contact Form] ";

/// Site-owned addresses. Fixed per deployment, never taken from the request.
#[derive(Debug, Clone)]
pub struct Addresses {
    pub from: String,
    pub to: String,
    pub site: String,
}

impl Default for Addresses {
    fn default() -> Self {
        Self {
            from: "Contact Form <noreply@muunoobstudios.com>".to_owned(),
            to: "business@muunoobstudios.com".to_owned(),
            site: "muunoobstudios.com".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Template)]
#[template(path = "emails/contact.html")]
struct ContactHtmlTemplate<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
    site: &'a str,
}

#[derive(Template)]
#[template(path = "emails/contact.txt")]
struct ContactTextTemplate<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
    site: &'a str,
}

/// Build the notification sent to the business inbox. Fields are escaped in
/// the HTML part; the subject header stays verbatim.
pub fn compose(
    submission: &Submission,
    addresses: &Addresses,
) -> Result<OutboundEmail, askama::Error> {
    let html = ContactHtmlTemplate {
        name: &submission.name,
        email: &submission.email,
        subject: &submission.subject,
        message: &submission.message,
        site: &addresses.site,
    }
    .render()?;

    let text = ContactTextTemplate {
        name: &submission.name,
        email: &submission.email,
        subject: &submission.subject,
        message: &submission.message,
        site: &addresses.site,
    }
    .render()?;

    Ok(OutboundEmail {
        from: addresses.from.to_owned(),
        to: addresses.to.to_owned(),
        reply_to: submission.email.to_owned(),
        subject: format!("{SUBJECT_PREFIX}{}", submission.subject),
        html,
        text,
    })
}
