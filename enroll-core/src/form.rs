//! The registration form
//!
//! [`ExtendedRegistrationForm`] checks submitted registration data against the user
//! store before anything is created. Its email check runs on the normalized address,
//! so `" Alice@Example.COM "` collides with an existing `alice@example.com`.
use crate::{
    Error,
    error::ValidationError,
    normalize::normalize_email,
    repositories::{RepositoryProvider, UserRepository, UserRepositoryProvider},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

/// Maximum length of a username in characters
pub const USERNAME_MAX_LENGTH: usize = 30;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("Invalid username regex pattern"));

/// Raw fields as submitted by the person registering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationFormData {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// Form data after every check passed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedRegistration {
    pub username: String,
    /// The normalized email
    pub email: String,
    pub password: String,
}

/// The fields the registration backend consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegistrationRequest {
    pub fn new<U, E, P>(username: U, email: E, password: P) -> Self
    where
        U: Into<String>,
        E: Into<String>,
        P: Into<String>,
    {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

impl From<CleanedRegistration> for RegistrationRequest {
    fn from(cleaned: CleanedRegistration) -> Self {
        Self {
            username: cleaned.username,
            email: cleaned.email,
            password: cleaned.password,
        }
    }
}

/// Registration form bound to a user store
pub struct ExtendedRegistrationForm<R: RepositoryProvider> {
    repositories: Arc<R>,
    data: RegistrationFormData,
}

impl<R: RepositoryProvider> ExtendedRegistrationForm<R> {
    pub fn new(repositories: Arc<R>, data: RegistrationFormData) -> Self {
        Self { repositories, data }
    }

    pub fn data(&self) -> &RegistrationFormData {
        &self.data
    }

    /// The normalized email, if no account uses it yet
    ///
    /// The lookup is an exact comparison against the already-lowercased value.
    pub async fn clean_email(&self) -> Result<String, Error> {
        let email = normalize_email(&self.data.email);
        if email.is_empty() {
            return Err(ValidationError::MissingField("email".to_string()).into());
        }

        if self.repositories.user().exists_by_email(&email).await? {
            return Err(ValidationError::DuplicateEmail.into());
        }

        Ok(email)
    }

    pub async fn clean_username(&self) -> Result<String, Error> {
        let username = &self.data.username;
        if username.is_empty() {
            return Err(ValidationError::MissingField("username".to_string()).into());
        }

        let length = username.chars().count();
        if length > USERNAME_MAX_LENGTH {
            return Err(ValidationError::InvalidUsername(format!(
                "Ensure this value has at most {USERNAME_MAX_LENGTH} characters (it has {length})."
            ))
            .into());
        }

        if !USERNAME_REGEX.is_match(username) {
            return Err(ValidationError::InvalidUsername(
                "Enter a valid username. This value may contain only letters, numbers and \
                 @/./+/-/_ characters."
                    .to_string(),
            )
            .into());
        }

        if self
            .repositories
            .user()
            .find_by_username(username)
            .await?
            .is_some()
        {
            return Err(ValidationError::DuplicateUsername.into());
        }

        Ok(username.clone())
    }

    /// Form-wide checks: both password fields present and equal
    pub fn clean(&self) -> Result<String, Error> {
        if self.data.password1.is_empty() {
            return Err(ValidationError::MissingField("password1".to_string()).into());
        }
        if self.data.password2.is_empty() {
            return Err(ValidationError::MissingField("password2".to_string()).into());
        }
        if self.data.password1 != self.data.password2 {
            return Err(ValidationError::PasswordMismatch.into());
        }

        Ok(self.data.password1.clone())
    }

    /// Run every check in field order, returning the first failure
    pub async fn validate(&self) -> Result<CleanedRegistration, Error> {
        let username = self.clean_username().await?;
        let email = self.clean_email().await?;
        let password = self.clean()?;

        Ok(CleanedRegistration {
            username,
            email,
            password,
        })
    }
}
