use crate::{
    MailerError,
    templates::{
        ACTIVATION_EMAIL_HTML, ACTIVATION_EMAIL_SUBJECT, ACTIVATION_EMAIL_TEXT,
        ActivationEmailData, ActivationHtmlTemplate, ActivationSubjectTemplate,
        ActivationTextTemplate, TemplateData,
    },
};
use askama::Template;
use async_trait::async_trait;

/// Renders templates by logical name.
///
/// An engine that does not know `template_name` must return
/// [`MailerError::TemplateNotFound`].
#[async_trait]
pub trait TemplateEngine: Send + Sync {
    async fn render(&self, template_name: &str, data: &TemplateData) -> Result<String, MailerError>;
}

/// Template engine backed by the compiled askama activation templates
#[derive(Debug, Clone)]
pub struct AskamaTemplateEngine {
    html: bool,
}

impl AskamaTemplateEngine {
    pub fn new() -> Self {
        Self { html: true }
    }

    /// An engine without the HTML activation template, so activation mail goes out as plain text
    pub fn plain_text_only() -> Self {
        Self { html: false }
    }

    pub fn has_template(&self, template_name: &str) -> bool {
        match template_name {
            ACTIVATION_EMAIL_SUBJECT | ACTIVATION_EMAIL_TEXT => true,
            ACTIVATION_EMAIL_HTML => self.html,
            _ => false,
        }
    }
}

impl Default for AskamaTemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateEngine for AskamaTemplateEngine {
    async fn render(&self, template_name: &str, data: &TemplateData) -> Result<String, MailerError> {
        if !self.has_template(template_name) {
            return Err(MailerError::TemplateNotFound(template_name.to_string()));
        }

        let context = ActivationEmailData::from_data(data)?;
        let rendered = match template_name {
            ACTIVATION_EMAIL_SUBJECT => ActivationSubjectTemplate::from(context).render()?,
            ACTIVATION_EMAIL_TEXT => ActivationTextTemplate::from(context).render()?,
            ACTIVATION_EMAIL_HTML => ActivationHtmlTemplate::from(context).render()?,
            _ => return Err(MailerError::TemplateNotFound(template_name.to_string())),
        };

        Ok(rendered)
    }
}
