mod activation;
mod engine;

pub use activation::{
    ActivationEmailData, ActivationHtmlTemplate, ActivationSubjectTemplate, ActivationTextTemplate,
    SiteData,
};
pub use engine::{AskamaTemplateEngine, TemplateEngine};

use crate::MailerError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Logical name of the activation email subject template
pub const ACTIVATION_EMAIL_SUBJECT: &str = "activation_email_subject";
/// Logical name of the plain-text activation email body template
pub const ACTIVATION_EMAIL_TEXT: &str = "activation_email_text";
/// Logical name of the HTML activation email body template
pub const ACTIVATION_EMAIL_HTML: &str = "activation_email_html";

/// The rendering context handed to a [`TemplateEngine`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TemplateData {
    pub data: HashMap<String, serde_json::Value>,
}

impl TemplateData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Build template data from any value that serializes to a map
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, MailerError> {
        match serde_json::to_value(value)? {
            serde_json::Value::Object(map) => Ok(Self {
                data: map.into_iter().collect(),
            }),
            other => Err(MailerError::Context(format!(
                "Template context must be a map, got {other}"
            ))),
        }
    }

    pub fn insert<T: Serialize>(mut self, key: &str, value: T) -> Result<Self, MailerError> {
        self.data
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Deserialize the whole context into a typed value
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, MailerError> {
        let map: serde_json::Map<String, serde_json::Value> = self
            .data
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| MailerError::Context(e.to_string()))
    }
}
