mod file;
mod memory;
mod sendmail;
pub mod smtp;

pub use file::FileTransport;
pub use memory::MemoryTransport;
pub use sendmail::SendmailTransport;
pub use smtp::{SmtpTransport, TlsConfig};

use crate::{Email, MailerError};
use lettre::Message;
use lettre::message::{MultiPart, SinglePart};

/// Convert an [`Email`] into a lettre message.
///
/// The plain-text body is always present; an HTML alternative turns the message
/// into `multipart/alternative` with the text part first.
pub(crate) fn build_message(email: Email) -> Result<Message, MailerError> {
    email.validate()?;

    let mut message_builder = Message::builder()
        .from(email.from.parse()?)
        .subject(email.subject);

    for to in email.to {
        message_builder = message_builder.to(to.parse()?);
    }

    for cc in email.cc {
        message_builder = message_builder.cc(cc.parse()?);
    }

    for bcc in email.bcc {
        message_builder = message_builder.bcc(bcc.parse()?);
    }

    if let Some(reply_to) = email.reply_to {
        message_builder = message_builder.reply_to(reply_to.parse()?);
    }

    let message = match email.html_body {
        Some(html) => message_builder.multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(email.text_body))
                .singlepart(SinglePart::html(html)),
        )?,
        None => message_builder.singlepart(SinglePart::plain(email.text_body))?,
    };

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(html: Option<&str>) -> Email {
        Email {
            to: vec!["recipient@example.com".to_string()],
            cc: vec![],
            bcc: vec![],
            from: "sender@example.com".to_string(),
            reply_to: None,
            subject: "Test Subject".to_string(),
            text_body: "Hello".to_string(),
            html_body: html.map(str::to_string),
        }
    }

    #[test]
    fn test_build_multipart_message() {
        let message = build_message(email(Some("<h1>Hello</h1>"))).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("multipart/alternative"));
        assert!(formatted.contains("text/plain"));
        assert!(formatted.contains("text/html"));
    }

    #[test]
    fn test_build_plain_text_message() {
        let message = build_message(email(None)).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(!formatted.contains("multipart/alternative"));
        assert!(formatted.contains("text/plain"));
        assert!(!formatted.contains("text/html"));
    }

    #[test]
    fn test_build_message_invalid_address() {
        let mut invalid = email(None);
        invalid.to = vec!["not an address".to_string()];

        assert!(matches!(
            build_message(invalid),
            Err(MailerError::Address(_))
        ));
    }
}
