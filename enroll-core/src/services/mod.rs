//! Service layer for business logic
//!
//! Services wrap the repositories with the account operations registration needs.

pub mod registration_profile;

pub use registration_profile::RegistrationProfileService;
