use crate::MailerError;
use serde::{Deserialize, Serialize};

/// MIME type accepted by [`Email::attach_alternative`]
pub const TEXT_HTML: &str = "text/html";

/// An outbound message with a required plain-text body and an optional HTML alternative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Email {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub from: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
}

impl Email {
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }

    /// Attach an alternative representation of the body.
    ///
    /// Only `text/html` alternatives are supported by the transports.
    pub fn attach_alternative<S: Into<String>>(
        &mut self,
        content: S,
        content_type: &str,
    ) -> Result<(), MailerError> {
        if !content_type.eq_ignore_ascii_case(TEXT_HTML) {
            return Err(MailerError::Builder(format!(
                "Unsupported alternative content type: {content_type}"
            )));
        }

        self.html_body = Some(content.into());
        Ok(())
    }

    /// Whether an HTML alternative is attached
    pub fn is_multipart(&self) -> bool {
        self.html_body.is_some()
    }

    pub fn validate(&self) -> Result<(), MailerError> {
        if self.to.is_empty() {
            return Err(MailerError::Builder(
                "At least one recipient is required".to_string(),
            ));
        }

        if self.from.is_empty() {
            return Err(MailerError::Builder("From address is required".to_string()));
        }

        // Header injection guard: a subject is a single header line.
        if self.subject.chars().any(is_line_break) {
            return Err(MailerError::Builder(
                "Subject must not contain line breaks".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct EmailBuilder {
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    from: Option<String>,
    reply_to: Option<String>,
    subject: Option<String>,
    text_body: Option<String>,
    html_body: Option<String>,
}

impl EmailBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to<S: Into<String>>(mut self, email: S) -> Self {
        self.to.push(email.into());
        self
    }

    pub fn cc<S: Into<String>>(mut self, email: S) -> Self {
        self.cc.push(email.into());
        self
    }

    pub fn bcc<S: Into<String>>(mut self, email: S) -> Self {
        self.bcc.push(email.into());
        self
    }

    pub fn from<S: Into<String>>(mut self, email: S) -> Self {
        self.from = Some(email.into());
        self
    }

    pub fn reply_to<S: Into<String>>(mut self, email: S) -> Self {
        self.reply_to = Some(email.into());
        self
    }

    pub fn subject<S: Into<String>>(mut self, subject: S) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn text_body<S: Into<String>>(mut self, text: S) -> Self {
        self.text_body = Some(text.into());
        self
    }

    pub fn html_body<S: Into<String>>(mut self, html: S) -> Self {
        self.html_body = Some(html.into());
        self
    }

    pub fn build(self) -> Result<Email, MailerError> {
        let email = Email {
            to: self.to,
            cc: self.cc,
            bcc: self.bcc,
            from: self
                .from
                .ok_or_else(|| MailerError::Builder("From address is required".to_string()))?,
            reply_to: self.reply_to,
            subject: self.subject.unwrap_or_default(),
            text_body: self
                .text_body
                .ok_or_else(|| MailerError::Builder("Text body is required".to_string()))?,
            html_body: self.html_body,
        };

        email.validate()?;
        Ok(email)
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}'
            | '\u{2029}'
    )
}

/// Remove every line break from `value`, joining the lines without a separator.
pub fn strip_line_breaks(value: &str) -> String {
    value.chars().filter(|c| !is_line_break(*c)).collect()
}
