//! # Enroll
//!
//! Enroll is the registration half of an account system: it takes a sign-up form,
//! creates an inactive account, and mails the activation link.
//!
//! Two behaviors set it apart from a plain registration flow:
//! - Submitted email addresses are normalized (trimmed, lowercased) before the
//!   uniqueness check and before they are stored. The normalizer can be replaced.
//! - The activation email is sent as plain text with an HTML alternative. When the
//!   HTML template is missing or fails to render, the email still goes out as
//!   plain text and a warning is logged.
//!
//! ## Storage Support
//!
//! - SQLite (`sqlite` feature, on by default)
//! - In memory, via [`InMemoryRepositoryProvider`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use enroll::{EnrollBuilder, RegistrationFormData, RequestContext};
//! use enroll_mailer::MemoryTransport;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let enroll = EnrollBuilder::new()
//!         .with_sqlite("sqlite::memory:")
//!         .await?
//!         .with_mailer(Arc::new(MemoryTransport::new()))
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     let request = RequestContext::new("example.com");
//!     let user = enroll
//!         .register_form(
//!             &request,
//!             RegistrationFormData {
//!                 username: "alice".to_string(),
//!                 email: " Alice@Example.com ".to_string(),
//!                 password1: "correct horse".to_string(),
//!                 password2: "correct horse".to_string(),
//!             },
//!         )
//!         .await?;
//!     assert_eq!(user.email, "alice@example.com");
//!
//!     Ok(())
//! }
//! ```
mod builder;

use std::sync::Arc;

use enroll_core::{
    ExtendedBackend, RegistrationBackend, RepositoryProvider, error::ValidationError,
    repositories::{UserRepository, UserRepositoryProvider},
};
use enroll_mailer::{AskamaTemplateEngine, Mailer, TemplateEngine};

pub use builder::{EnrollBuilder, EnrollBuilderError, NoStorage, WithStorage};

/// Re-export core types from enroll_core
pub use enroll_core::{
    Event, EventBus, EventHandler, ExtendedRegistrationForm, InMemoryRepositoryProvider,
    RegistrationConfig, RegistrationFormData, RegistrationProfile, RegistrationRequest,
    RequestContext, Site, User, UserId, normalize_email,
};

/// Re-export storage backends
///
/// These storage implementations are available when the corresponding feature is enabled.
#[cfg(feature = "sqlite")]
pub use enroll_storage_sqlite::SqliteRepositoryProvider;

/// Errors that can occur when using Enroll.
#[derive(Debug, thiserror::Error)]
pub enum EnrollError {
    /// Error when interacting with storage outside of a registration
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Error raised while registering or activating an account
    #[error(transparent)]
    Registration(#[from] enroll_core::Error),
}

impl EnrollError {
    /// The field-level validation failure, if this is one
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            EnrollError::Registration(enroll_core::Error::Validation(error)) => Some(error),
            _ => None,
        }
    }
}

/// The registration coordinator that wires storage, templates and mail together.
///
/// # Example
///
/// ```rust,no_run
/// use enroll::{Enroll, InMemoryRepositoryProvider, RegistrationConfig};
/// use enroll_mailer::MemoryTransport;
/// use std::sync::Arc;
///
/// let enroll = Enroll::new(
///     Arc::new(InMemoryRepositoryProvider::new()),
///     Arc::new(MemoryTransport::new()),
/// )
/// .with_config(RegistrationConfig::default().with_account_activation_days(3));
/// ```
pub struct Enroll<R: RepositoryProvider> {
    repositories: Arc<R>,
    mailer: Arc<dyn Mailer>,
    templates: Arc<dyn TemplateEngine>,
    events: EventBus,
    backend: ExtendedBackend<R>,
}

impl<R: RepositoryProvider> Enroll<R> {
    /// Create an Enroll instance with the built-in templates and default configuration
    pub fn new(repositories: Arc<R>, mailer: Arc<dyn Mailer>) -> Self {
        let templates: Arc<dyn TemplateEngine> = Arc::new(AskamaTemplateEngine::new());
        let events = EventBus::default();
        let backend = ExtendedBackend::new(
            repositories.clone(),
            mailer.clone(),
            templates.clone(),
            RegistrationConfig::default(),
        )
        .with_event_bus(events.clone());

        Self {
            repositories,
            mailer,
            templates,
            events,
            backend,
        }
    }

    fn rebuild(self, templates: Arc<dyn TemplateEngine>, config: RegistrationConfig) -> Self {
        let backend = ExtendedBackend::new(
            self.repositories.clone(),
            self.mailer.clone(),
            templates.clone(),
            config,
        )
        .with_event_bus(self.events.clone());

        Self {
            templates,
            backend,
            ..self
        }
    }

    /// Set the registration configuration
    pub fn with_config(self, config: RegistrationConfig) -> Self {
        let templates = self.templates.clone();
        self.rebuild(templates, config)
    }

    /// Render activation emails with a different template engine
    pub fn with_template_engine(self, templates: Arc<dyn TemplateEngine>) -> Self {
        let config = self.backend.config().clone();
        self.rebuild(templates, config)
    }

    pub fn config(&self) -> &RegistrationConfig {
        self.backend.config()
    }

    /// The event bus receiving `UserRegistered` and `UserActivated`
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register an event handler
    pub async fn add_event_handler(&self, handler: Arc<dyn EventHandler>) {
        self.events.register(handler).await;
    }

    /// The storage provider shared by the form, the backend and activation
    pub fn repositories(&self) -> &R {
        &self.repositories
    }

    pub fn backend(&self) -> &ExtendedBackend<R> {
        &self.backend
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), EnrollError> {
        self.repositories
            .migrate()
            .await
            .map_err(|e| EnrollError::StorageError(e.to_string()))
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), EnrollError> {
        self.repositories
            .health_check()
            .await
            .map_err(|e| EnrollError::StorageError(e.to_string()))
    }

    /// Get a user by their ID
    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, EnrollError> {
        self.repositories
            .user()
            .find_by_id(user_id)
            .await
            .map_err(|e| EnrollError::StorageError(e.to_string()))
    }

    /// The registration form bound to this instance's user store
    pub fn form(&self, data: RegistrationFormData) -> ExtendedRegistrationForm<R> {
        self.backend.form(data)
    }

    /// Create an inactive account from already validated data and send its activation email
    pub async fn register(
        &self,
        request: &RequestContext,
        data: RegistrationRequest,
    ) -> Result<User, EnrollError> {
        Ok(self.backend.register(request, data).await?)
    }

    /// Validate submitted form data, then register
    ///
    /// Validation failures are returned before anything is created.
    pub async fn register_form(
        &self,
        request: &RequestContext,
        data: RegistrationFormData,
    ) -> Result<User, EnrollError> {
        let cleaned = self.form(data).validate().await?;
        self.register(request, cleaned.into()).await
    }

    /// Activate the account owning `activation_key`
    pub async fn activate(
        &self,
        request: &RequestContext,
        activation_key: &str,
    ) -> Result<User, EnrollError> {
        Ok(self.backend.activate(request, activation_key).await?)
    }
}
