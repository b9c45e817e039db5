//! Builder pattern for constructing Enroll instances
//!
//! This module provides a type-safe builder for creating [`Enroll`] instances with
//! compile-time validation of storage configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use enroll::EnrollBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build with SQLite, the mailer and settings from the environment, and auto-migration
//!     let enroll = EnrollBuilder::new()
//!         .with_sqlite("sqlite://enroll.db?mode=rwc")
//!         .await?
//!         .with_mailer_from_env()?
//!         .with_config_from_env()?
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use enroll_core::{RegistrationConfig, RepositoryProvider};
use enroll_mailer::{Mailer, MailerConfig, TemplateEngine};

use crate::Enroll;

/// Errors that can occur when building an Enroll instance.
#[derive(Debug, thiserror::Error)]
pub enum EnrollBuilderError {
    /// Failed to connect to storage backend
    #[error("Storage connection failed: {0}")]
    StorageConnection(String),

    /// Failed to run database migrations
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Failed to configure mailer
    #[error("Mailer configuration failed: {0}")]
    MailerConfiguration(String),
}

/// Marker type indicating no storage has been configured yet.
///
/// This is the initial state of [`EnrollBuilder`].
pub struct NoStorage;

/// Marker type indicating storage has been configured.
pub struct WithStorage<R: RepositoryProvider> {
    repositories: Arc<R>,
}

enum MailerSource {
    Default,
    Config(MailerConfig),
    Instance(Arc<dyn Mailer>),
}

/// A type-safe builder for constructing [`Enroll`] instances.
///
/// Storage must be configured before [`EnrollBuilder::build`] becomes available.
///
/// # Defaults
///
/// - Mailer: [`MailerConfig::default`], which writes emails to `./emails`
/// - Templates: the built-in askama activation templates
/// - Registration settings: [`RegistrationConfig::default`]
/// - Apply migrations: false
pub struct EnrollBuilder<Storage> {
    storage: Storage,
    config: RegistrationConfig,
    mailer: MailerSource,
    templates: Option<Arc<dyn TemplateEngine>>,
    apply_migrations: bool,
}

impl Default for EnrollBuilder<NoStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrollBuilder<NoStorage> {
    pub fn new() -> Self {
        Self {
            storage: NoStorage,
            config: RegistrationConfig::default(),
            mailer: MailerSource::Default,
            templates: None,
            apply_migrations: false,
        }
    }

    /// Use an existing repository provider
    pub fn with_repositories<R: RepositoryProvider>(
        self,
        repositories: Arc<R>,
    ) -> EnrollBuilder<WithStorage<R>> {
        EnrollBuilder {
            storage: WithStorage { repositories },
            config: self.config,
            mailer: self.mailer,
            templates: self.templates,
            apply_migrations: self.apply_migrations,
        }
    }
}

#[cfg(feature = "sqlite")]
impl EnrollBuilder<NoStorage> {
    /// Configure SQLite storage by connecting to the given URL.
    ///
    /// * `url` - SQLite connection URL (e.g., "sqlite::memory:" or "sqlite://path/to/db.sqlite")
    ///
    /// An in-memory URL gets a single-connection pool so every query sees the same database.
    pub async fn with_sqlite(
        self,
        url: &str,
    ) -> Result<EnrollBuilder<WithStorage<crate::SqliteRepositoryProvider>>, EnrollBuilderError>
    {
        let mut options = sqlx::sqlite::SqlitePoolOptions::new();
        if url.contains(":memory:") {
            options = options.max_connections(1);
        }

        let pool = options
            .connect(url)
            .await
            .map_err(|e| EnrollBuilderError::StorageConnection(e.to_string()))?;

        Ok(self.with_sqlite_pool(pool))
    }

    /// Configure SQLite storage with an existing connection pool.
    pub fn with_sqlite_pool(
        self,
        pool: sqlx::SqlitePool,
    ) -> EnrollBuilder<WithStorage<crate::SqliteRepositoryProvider>> {
        let repositories = Arc::new(crate::SqliteRepositoryProvider::new(pool));
        self.with_repositories(repositories)
    }
}

impl<R: RepositoryProvider> EnrollBuilder<WithStorage<R>> {
    /// Set the registration configuration
    pub fn with_config(mut self, config: RegistrationConfig) -> Self {
        self.config = config;
        self
    }

    /// Read the registration configuration from environment variables
    ///
    /// See [`RegistrationConfig::from_env`] for the variables read.
    pub fn with_config_from_env(mut self) -> Result<Self, EnrollBuilderError> {
        self.config = RegistrationConfig::from_env()
            .map_err(|e| EnrollBuilderError::InvalidConfiguration(e.to_string()))?;
        Ok(self)
    }

    /// Send mail through a transport built from `config`
    pub fn with_mailer_config(mut self, config: MailerConfig) -> Self {
        self.mailer = MailerSource::Config(config);
        self
    }

    /// Read the mailer configuration from environment variables
    pub fn with_mailer_from_env(mut self) -> Result<Self, EnrollBuilderError> {
        let config = MailerConfig::from_env()
            .map_err(|e| EnrollBuilderError::MailerConfiguration(e.to_string()))?;
        self.mailer = MailerSource::Config(config);
        Ok(self)
    }

    /// Send mail through an existing mailer
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = MailerSource::Instance(mailer);
        self
    }

    pub fn with_template_engine(mut self, templates: Arc<dyn TemplateEngine>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn apply_migrations(mut self, apply: bool) -> Self {
        self.apply_migrations = apply;
        self
    }

    pub async fn build(self) -> Result<Enroll<R>, EnrollBuilderError> {
        if self.apply_migrations {
            tracing::debug!("Applying registration storage migrations");
            self.storage
                .repositories
                .migrate()
                .await
                .map_err(|e| EnrollBuilderError::Migration(e.to_string()))?;
        }

        let mailer: Arc<dyn Mailer> = match self.mailer {
            MailerSource::Instance(mailer) => mailer,
            MailerSource::Config(config) => Arc::from(
                config
                    .build_transport()
                    .map_err(|e| EnrollBuilderError::MailerConfiguration(e.to_string()))?,
            ),
            MailerSource::Default => Arc::from(
                MailerConfig::default()
                    .build_transport()
                    .map_err(|e| EnrollBuilderError::MailerConfiguration(e.to_string()))?,
            ),
        };

        let mut enroll = Enroll::new(self.storage.repositories, mailer);
        if let Some(templates) = self.templates {
            enroll = enroll.with_template_engine(templates);
        }

        Ok(enroll.with_config(self.config))
    }
}
