use serde::{Deserialize, Deserializer};
use validator::Validate;

/// A contact form submission as typed by the visitor.
///
/// Missing fields deserialize to empty strings so that they are reported by the
/// presence check instead of failing the whole body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct Submission {
    #[validate(length(max = 100, message = "Name must be less than 100 characters"))]
    pub name: String,
    #[validate(length(max = 254, message = "Email must be less than 254 characters"))]
    pub email: String,
    #[validate(length(max = 200, message = "Subject must be less than 200 characters"))]
    pub subject: String,
    #[validate(
        length(min = 10, message = "Message must be at least 10 characters"),
        custom(function = "message_within_limit")
    )]
    pub message: String,
}

fn message_within_limit(message: &str) -> Result<(), validator::ValidationError> {
    if message.chars().count() > 5000 {
        return Err(validator::ValidationError::new("message_too_long")
            .with_message("Message must be less than 5000 characters".into()));
    }

    Ok(())
}

impl Submission {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Trim every field, drop control characters and lowercase the email.
    pub fn sanitized(self) -> Self {
        Self {
            name: sanitize(&self.name),
            email: sanitize(&self.email).to_lowercase(),
            subject: sanitize(&self.subject),
            message: sanitize(&self.message),
        }
    }

    pub fn has_all_fields(&self) -> bool {
        !(self.name.is_empty()
            || self.email.is_empty()
            || self.subject.is_empty()
            || self.message.is_empty())
    }
}

/// JSON body accepted by the contact endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    #[serde(flatten)]
    pub submission: Submission,
    /// Anything but a string counts as no token.
    #[serde(rename = "csrfToken", deserialize_with = "string_or_none")]
    pub csrf_token: Option<String>,
    /// Hidden field, only bots fill it.
    pub website: Option<String>,
}

impl ContactRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn is_bot(&self) -> bool {
        self.website
            .as_deref()
            .is_some_and(|website| !website.trim().is_empty())
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(value)) => Ok(Some(value)),
        _ => Ok(None),
    }
}

fn is_stripped(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{7f}')
}

pub fn sanitize(input: &str) -> String {
    input.trim().chars().filter(|c| !is_stripped(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_trims_and_strips_control_chars() {
        assert_eq!(sanitize("  Jane\u{0}\u{7} Doe \t"), "Jane Doe");
        assert_eq!(sanitize("line one\nline two\r\n\tend"), "line one\nline two\r\n\tend");
        assert_eq!(sanitize("\u{1b}[31mred"), "[31mred");
    }

    #[test]
    fn test_sanitized_lowercases_email_only() {
        let submission = Submission::new(" Jane ", " Jane@Example.COM ", " Hi ", " Hello there ")
            .sanitized();

        assert_eq!(submission.name, "Jane");
        assert_eq!(submission.email, "jane@example.com");
        assert_eq!(submission.subject, "Hi");
        assert_eq!(submission.message, "Hello there");
    }

    #[test]
    fn test_whitespace_only_field_is_missing() {
        let submission =
            Submission::new("Jane", "jane@example.com", "   \t", "What are your rates?")
                .sanitized();

        assert!(!submission.has_all_fields());
    }

    #[test]
    fn test_request_missing_fields_default_to_empty() {
        let request = ContactRequest::from_slice(br#"{"name":"Jane"}"#).unwrap();

        assert_eq!(request.submission.name, "Jane");
        assert!(request.submission.email.is_empty());
        assert!(request.csrf_token.is_none());
        assert!(!request.is_bot());
    }

    #[test]
    fn test_request_reads_token_and_honeypot() {
        let request = ContactRequest::from_slice(
            br#"{"name":"Jane","email":"jane@example.com","subject":"Hi","message":"Hello there","csrfToken":"abc","website":"http://spam.example"}"#,
        )
        .unwrap();

        assert_eq!(request.csrf_token.as_deref(), Some("abc"));
        assert!(request.is_bot());
    }

    #[test]
    fn test_blank_honeypot_is_not_a_bot() {
        let request = ContactRequest::from_slice(br#"{"website":"  "}"#).unwrap();
        assert!(!request.is_bot());
    }

    #[test]
    fn test_non_string_token_is_treated_as_missing() {
        for body in [
            r#"{"csrfToken":12345}"#,
            r#"{"csrfToken":{"value":"abc"}}"#,
            r#"{"csrfToken":null}"#,
            r#"{"csrfToken":["abc"]}"#,
        ] {
            let request = ContactRequest::from_slice(body.as_bytes()).unwrap();
            assert!(request.csrf_token.is_none());
        }
    }

    #[test]
    fn test_request_rejects_non_string_fields() {
        assert!(ContactRequest::from_slice(br#"{"name":42}"#).is_err());
        assert!(ContactRequest::from_slice(b"not json").is_err());
    }
}
