//! Email support for the enroll registration ecosystem
//!
//! This crate owns the outbound side of registration: the [`Email`] message model,
//! the [`TemplateEngine`] seam used to render activation emails, the built-in
//! askama activation templates, and the [`Mailer`] transports built on lettre.
pub mod config;
pub mod email;
pub mod error;
pub mod mailer;
pub mod templates;
pub mod transports;

pub use config::{MailerConfig, TransportConfig};
pub use email::{Email, EmailBuilder, strip_line_breaks};
pub use error::MailerError;
pub use mailer::Mailer;
pub use templates::{
    ACTIVATION_EMAIL_HTML, ACTIVATION_EMAIL_SUBJECT, ACTIVATION_EMAIL_TEXT, AskamaTemplateEngine,
    TemplateData, TemplateEngine,
};
pub use transports::{FileTransport, MemoryTransport, SendmailTransport, SmtpTransport};

pub mod prelude {
    pub use crate::{
        AskamaTemplateEngine, Email, EmailBuilder, FileTransport, Mailer, MailerConfig,
        MailerError, MemoryTransport, SendmailTransport, SmtpTransport, TemplateData,
        TemplateEngine, TransportConfig,
    };
}
