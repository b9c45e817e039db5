//! Email normalization
//!
//! Registration stores and compares email addresses in a canonical form so that
//! `" Alice@Example.COM "` and `"alice@example.com"` are treated as the same address.
//! The default form is the address with surrounding whitespace removed, lowercased.
//! No syntax validation happens here.

use std::sync::Arc;

/// A replacement normalization strategy, configured through
/// [`RegistrationConfig::email_normalizer`](crate::RegistrationConfig::email_normalizer)
pub type EmailNormalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Trim surrounding whitespace and lowercase
///
/// Idempotent: `normalize_email(&normalize_email(x)) == normalize_email(x)`.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The built-in normalizer as an [`EmailNormalizer`]
pub fn default_normalizer() -> EmailNormalizer {
    Arc::new(normalize_email)
}
