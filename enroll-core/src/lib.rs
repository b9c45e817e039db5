//! Core functionality for the enroll project
//!
//! This crate contains the registration layer: the [`User`] and
//! [`RegistrationProfile`] records, email normalization, the
//! [`ExtendedRegistrationForm`], and the [`ExtendedBackend`] that creates inactive
//! accounts and sends their activation email.
//!
//! Storage is reached through the traits in [`repositories`]; storage crates such as
//! `enroll-storage-sqlite` implement them. [`InMemoryRepositoryProvider`] is a
//! complete in-process implementation.
//!
//! Outbound mail goes through the [`enroll_mailer::Mailer`] and
//! [`enroll_mailer::TemplateEngine`] seams.
pub mod backend;
pub mod config;
pub mod crypto;
pub mod error;
pub mod events;
pub mod form;
pub mod id;
pub mod normalize;
pub mod profile;
pub mod repositories;
pub mod services;
pub mod site;
pub mod user;

pub use backend::{ActivationContext, ExtendedBackend, RegistrationBackend, SENDER};
pub use config::RegistrationConfig;
pub use error::Error;
pub use events::{Event, EventBus, EventHandler};
pub use form::{
    CleanedRegistration, ExtendedRegistrationForm, RegistrationFormData, RegistrationRequest,
};
pub use normalize::{EmailNormalizer, normalize_email};
pub use profile::{ProfileId, RegistrationProfile};
pub use repositories::{InMemoryRepositoryProvider, RepositoryProvider};
pub use services::RegistrationProfileService;
pub use site::{RequestContext, Site};
pub use user::{User, UserId};
