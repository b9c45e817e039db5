use enroll_mailer::MailerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Mailer error: {0}")]
    Mailer(#[from] MailerError),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Registration is closed")]
    RegistrationClosed,

    #[error("Invalid activation key")]
    InvalidActivationKey,

    #[error("Activation key has expired")]
    ActivationKeyExpired,

    #[error("Account is already activated")]
    AlreadyActivated,

    #[error("No registration profile found for user {0}")]
    ProfileNotFound(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Record not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Field-level validation failures, displayed verbatim to the person registering
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("A user with that email address already exists.")]
    DuplicateEmail,

    #[error("A user with that username already exists.")]
    DuplicateUsername,

    #[error("{0}")]
    InvalidUsername(String),

    #[error("The two password fields didn't match.")]
    PasswordMismatch,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}

impl ValidationError {
    /// The form field the error belongs to, or `None` for form-wide errors
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::DuplicateEmail => Some("email"),
            ValidationError::DuplicateUsername | ValidationError::InvalidUsername(_) => {
                Some("username")
            }
            ValidationError::PasswordMismatch => None,
            ValidationError::MissingField(field) | ValidationError::InvalidField(field) => {
                Some(field.as_str())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event bus error: {0}")]
    BusError(String),

    #[error("Event handler error: {0}")]
    HandlerError(String),
}

impl Error {
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    pub fn is_mailer_error(&self) -> bool {
        matches!(self, Error::Mailer(_))
    }

    pub fn is_event_error(&self) -> bool {
        matches!(self, Error::Event(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let validation_error = Error::Validation(ValidationError::DuplicateEmail);
        assert_eq!(
            validation_error.to_string(),
            "Validation error: A user with that email address already exists."
        );

        let storage_error = Error::Storage(StorageError::NotFound);
        assert_eq!(storage_error.to_string(), "Storage error: Record not found");

        let registration_error = Error::Registration(RegistrationError::ActivationKeyExpired);
        assert_eq!(
            registration_error.to_string(),
            "Registration error: Activation key has expired"
        );
    }

    #[test]
    fn test_validation_error_fields() {
        assert_eq!(ValidationError::DuplicateEmail.field(), Some("email"));
        assert_eq!(ValidationError::DuplicateUsername.field(), Some("username"));
        assert_eq!(
            ValidationError::MissingField("password1".to_string()).field(),
            Some("password1")
        );
        assert_eq!(ValidationError::PasswordMismatch.field(), None);
    }

    #[test]
    fn test_error_from_conversions() {
        let error: Error = ValidationError::PasswordMismatch.into();
        assert!(error.is_validation_error());

        let error: Error = MailerError::TemplateNotFound("x".to_string()).into();
        assert!(error.is_mailer_error());

        let error: Error = EventError::HandlerError("boom".to_string()).into();
        assert!(error.is_event_error());
        assert!(!error.is_storage_error());
    }
}
