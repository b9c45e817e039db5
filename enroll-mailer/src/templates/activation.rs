use crate::{MailerError, templates::TemplateData};
use askama::Template;
use serde::{Deserialize, Serialize};

/// Site fields exposed to the activation templates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteData {
    pub domain: String,
    pub name: String,
}

/// The variables every activation template receives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivationEmailData {
    pub activation_key: String,
    pub expiration_days: i64,
    pub site: SiteData,
    pub email: String,
}

impl ActivationEmailData {
    pub fn from_data(data: &TemplateData) -> Result<Self, MailerError> {
        data.deserialize()
    }

    pub fn activation_url(&self) -> String {
        format!(
            "https://{}/accounts/activate/{}/",
            self.site.domain, self.activation_key
        )
    }
}

#[derive(Template)]
#[template(
    source = "Activate your account at {{ site.name }}\n",
    ext = "txt"
)]
pub struct ActivationSubjectTemplate {
    pub site: SiteData,
}

impl From<ActivationEmailData> for ActivationSubjectTemplate {
    fn from(data: ActivationEmailData) -> Self {
        Self { site: data.site }
    }
}

#[derive(Template)]
#[template(
    source = r#"Hello,

Someone, hopefully you, registered an account at {{ site.name }} using {{ email }}.

To activate the account, open the following link within {{ expiration_days }} days:

{{ activation_url }}

If you did not register, you can safely ignore this email.

--
{{ site.name }}
"#,
    ext = "txt"
)]
pub struct ActivationTextTemplate {
    pub site: SiteData,
    pub email: String,
    pub expiration_days: i64,
    pub activation_url: String,
}

impl From<ActivationEmailData> for ActivationTextTemplate {
    fn from(data: ActivationEmailData) -> Self {
        let activation_url = data.activation_url();
        Self {
            site: data.site,
            email: data.email,
            expiration_days: data.expiration_days,
            activation_url,
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Activate your account - {{ site.name }}</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 20px; background-color: #f4f4f4; }
        .container { max-width: 600px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; }
        .button { display: inline-block; padding: 12px 24px; background-color: #28a745; color: white; text-decoration: none; border-radius: 4px; margin: 20px 0; }
        .footer { margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee; font-size: 12px; color: #666; }
    </style>
</head>
<body>
    <div class="container">
        <h1>{{ site.name }}</h1>

        <p>Someone, hopefully you, registered an account using <strong>{{ email }}</strong>.</p>

        <p>Activate the account within {{ expiration_days }} days:</p>

        <div style="text-align: center;">
            <a href="{{ activation_url|safe }}" class="button">Activate account</a>
        </div>

        <p>Or copy and paste this URL into your browser:</p>
        <p style="word-break: break-all; font-family: monospace;">{{ activation_url|safe }}</p>

        <div class="footer">
            <p>If you did not register, you can safely ignore this email.</p>
        </div>
    </div>
</body>
</html>
"#,
    ext = "html"
)]
pub struct ActivationHtmlTemplate {
    pub site: SiteData,
    pub email: String,
    pub expiration_days: i64,
    pub activation_url: String,
}

impl From<ActivationEmailData> for ActivationHtmlTemplate {
    fn from(data: ActivationEmailData) -> Self {
        let activation_url = data.activation_url();
        Self {
            site: data.site,
            email: data.email,
            expiration_days: data.expiration_days,
            activation_url,
        }
    }
}
