//! The registration backend
//!
//! [`ExtendedBackend`] runs one registration end to end:
//!
//! 1. normalize the submitted email with the configured normalizer
//! 2. resolve the site from the registry or the request
//! 3. create an inactive user and its registration profile
//! 4. send the activation email, plain text with an HTML alternative when the HTML
//!    template renders
//! 5. emit [`Event::UserRegistered`]
//!
//! Every step runs to completion before the next starts. A failing step returns its
//! error and skips the rest, so an event handler error surfaces after the account
//! exists and the email is gone.
use crate::{
    Error, RegistrationConfig, RequestContext, Site, User,
    error::{RegistrationError, StorageError},
    events::{Event, EventBus},
    form::{ExtendedRegistrationForm, RegistrationFormData, RegistrationRequest},
    profile::RegistrationProfile,
    repositories::{RepositoryProvider, UserRepository, UserRepositoryProvider},
    services::RegistrationProfileService,
};
use async_trait::async_trait;
use enroll_mailer::{
    ACTIVATION_EMAIL_HTML, ACTIVATION_EMAIL_SUBJECT, ACTIVATION_EMAIL_TEXT, Email, Mailer,
    TemplateData, TemplateEngine, email::TEXT_HTML, strip_line_breaks,
};
use serde::Serialize;
use std::sync::Arc;

/// Identifies [`ExtendedBackend`] as the sender of the events it emits
pub const SENDER: &str = "enroll::ExtendedBackend";

/// The registration workflow seen by callers
#[async_trait]
pub trait RegistrationBackend: Send + Sync {
    /// The form used to collect registration input
    type Form;

    /// Create an inactive account and send its activation email
    async fn register(
        &self,
        request: &RequestContext,
        data: RegistrationRequest,
    ) -> Result<User, Error>;

    /// Activate the account owning `activation_key`
    async fn activate(&self, request: &RequestContext, activation_key: &str)
    -> Result<User, Error>;

    fn registration_allowed(&self, request: &RequestContext) -> bool;

    fn form(&self, data: RegistrationFormData) -> Self::Form;
}

/// The variables every activation template receives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationContext {
    pub activation_key: String,
    pub expiration_days: i64,
    pub site: Site,
    pub email: String,
}

/// Registration backend with email normalization and multipart activation email
pub struct ExtendedBackend<R: RepositoryProvider> {
    repositories: Arc<R>,
    profiles: RegistrationProfileService<R>,
    mailer: Arc<dyn Mailer>,
    templates: Arc<dyn TemplateEngine>,
    events: EventBus,
    config: RegistrationConfig,
}

impl<R: RepositoryProvider> ExtendedBackend<R> {
    pub fn new(
        repositories: Arc<R>,
        mailer: Arc<dyn Mailer>,
        templates: Arc<dyn TemplateEngine>,
        config: RegistrationConfig,
    ) -> Self {
        Self {
            profiles: RegistrationProfileService::new(repositories.clone()),
            repositories,
            mailer,
            templates,
            events: EventBus::default(),
            config,
        }
    }

    /// Replace the event bus, e.g. to share one bus between several components
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// The configured registry site, or one derived from the request host
    pub fn current_site(&self, request: &RequestContext) -> Site {
        match &self.config.site {
            Some(site) => site.clone(),
            None => Site::from_request(request),
        }
    }

    /// Render and send the activation email for `profile`
    ///
    /// Subject and plain-text rendering errors propagate, as do transport errors.
    /// An HTML rendering error of any kind is logged and the email goes out as plain
    /// text only. An empty HTML render is not attached.
    pub async fn send_activation_email(
        &self,
        site: &Site,
        profile: &RegistrationProfile,
    ) -> Result<(), Error> {
        let user = self
            .repositories
            .user()
            .find_by_id(&profile.user_id)
            .await?
            .ok_or(Error::Storage(StorageError::NotFound))?;

        let context = ActivationContext {
            activation_key: profile.activation_key.clone(),
            expiration_days: self.config.account_activation_days,
            site: site.clone(),
            email: user.email.clone(),
        };
        let data = TemplateData::from_serializable(&context)?;

        let subject = self.templates.render(ACTIVATION_EMAIL_SUBJECT, &data).await?;
        let subject = strip_line_breaks(&subject);

        let text_body = self.templates.render(ACTIVATION_EMAIL_TEXT, &data).await?;

        let html_body = match self.templates.render(ACTIVATION_EMAIL_HTML, &data).await {
            Ok(html) if html.is_empty() => None,
            Ok(html) => Some(html),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    template = ACTIVATION_EMAIL_HTML,
                    "Could not render HTML activation template, email will be sent as plain text only"
                );
                None
            }
        };

        let mut email = Email::builder()
            .from(self.config.default_from_email.as_str())
            .to(user.email.as_str())
            .subject(subject)
            .text_body(text_body)
            .build()?;

        if let Some(html) = html_body {
            email.attach_alternative(html, TEXT_HTML)?;
        }

        tracing::debug!(
            user_id = %user.id,
            multipart = email.is_multipart(),
            "Sending activation email"
        );
        self.mailer.send_email(email).await?;

        Ok(())
    }

    async fn profile_for(&self, user: &User) -> Result<RegistrationProfile, Error> {
        let mut profiles = self.profiles.profiles_for_user(&user.id).await?;
        match profiles.len() {
            1 => Ok(profiles.remove(0)),
            0 => Err(RegistrationError::ProfileNotFound(user.id.to_string()).into()),
            count => Err(StorageError::Constraint(format!(
                "expected one registration profile for user {}, found {count}",
                user.id
            ))
            .into()),
        }
    }
}

#[async_trait]
impl<R: RepositoryProvider> RegistrationBackend for ExtendedBackend<R> {
    type Form = ExtendedRegistrationForm<R>;

    async fn register(
        &self,
        request: &RequestContext,
        data: RegistrationRequest,
    ) -> Result<User, Error> {
        if !self.registration_allowed(request) {
            return Err(RegistrationError::RegistrationClosed.into());
        }

        let normalize = self.config.normalizer();
        let email = normalize(&data.email);
        let site = self.current_site(request);

        let user = self
            .profiles
            .create_inactive_user(&data.username, &email, &data.password)
            .await?;

        let profile = self.profile_for(&user).await?;
        self.send_activation_email(&site, &profile).await?;

        self.events
            .emit(&Event::UserRegistered {
                user: user.clone(),
                request: request.clone(),
                sender: SENDER,
            })
            .await?;

        tracing::info!(user_id = %user.id, site = %site.domain, "User registered");
        Ok(user)
    }

    async fn activate(
        &self,
        request: &RequestContext,
        activation_key: &str,
    ) -> Result<User, Error> {
        let user = self
            .profiles
            .activate_user(activation_key, self.config.account_activation_days)
            .await?;

        self.events
            .emit(&Event::UserActivated {
                user: user.clone(),
                request: request.clone(),
                sender: SENDER,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User activated");
        Ok(user)
    }

    fn registration_allowed(&self, _request: &RequestContext) -> bool {
        self.config.registration_open
    }

    fn form(&self, data: RegistrationFormData) -> Self::Form {
        ExtendedRegistrationForm::new(self.repositories.clone(), data)
    }
}
