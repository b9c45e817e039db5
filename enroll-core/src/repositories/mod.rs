//! Repository traits for data access
//!
//! Services reach storage only through these traits:
//!
//! - [`UserRepository`] and [`RegistrationProfileRepository`] define the operations
//!   for each data domain
//! - the `*RepositoryProvider` traits hand out each repository
//! - [`RepositoryProvider`] combines them with migration and health-check hooks
//!
//! [`memory::InMemoryRepositoryProvider`] is a complete provider kept in process memory.

pub mod memory;
pub mod profile;
pub mod user;

pub use memory::InMemoryRepositoryProvider;
pub use profile::RegistrationProfileRepository;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::{
    Error, User,
    profile::{NewRegistrationProfile, RegistrationProfile},
    user::NewUser,
};

/// Provider trait for user repository access.
pub trait UserRepositoryProvider: Send + Sync + 'static {
    /// The user repository implementation type
    type UserRepo: UserRepository;

    /// Get the user repository
    fn user(&self) -> &Self::UserRepo;
}

/// Provider trait for registration profile repository access.
pub trait ProfileRepositoryProvider: Send + Sync + 'static {
    /// The registration profile repository implementation type
    type ProfileRepo: RegistrationProfileRepository;

    /// Get the registration profile repository
    fn profile(&self) -> &Self::ProfileRepo;
}

/// Provider trait that storage implementations must implement to provide all repositories.
///
/// # Example
///
/// ```rust,ignore
/// use enroll_core::repositories::*;
///
/// struct MyStorage { /* ... */ }
///
/// impl UserRepositoryProvider for MyStorage {
///     type UserRepo = MyUserRepository;
///     fn user(&self) -> &Self::UserRepo { &self.user_repo }
/// }
///
/// impl ProfileRepositoryProvider for MyStorage {
///     type ProfileRepo = MyProfileRepository;
///     fn profile(&self) -> &Self::ProfileRepo { &self.profile_repo }
/// }
///
/// #[async_trait]
/// impl RepositoryProvider for MyStorage {
///     async fn migrate(&self) -> Result<(), Error> { /* ... */ }
///     async fn health_check(&self) -> Result<(), Error> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider: UserRepositoryProvider + ProfileRepositoryProvider {
    /// Run migrations for all repositories
    async fn migrate(&self) -> Result<(), Error>;

    /// Health check for all repositories
    async fn health_check(&self) -> Result<(), Error>;

    /// Store a user together with its registration profile
    ///
    /// Either both are stored or neither is. The default implementation removes the
    /// user again when the profile cannot be created; storage with transactions
    /// should override it.
    async fn create_user_with_profile(
        &self,
        user: NewUser,
        profile: NewRegistrationProfile,
    ) -> Result<(User, RegistrationProfile), Error> {
        let user = self.user().create(user).await?;

        match self.profile().create(profile).await {
            Ok(profile) => Ok((user, profile)),
            Err(e) => {
                if let Err(cleanup) = self.user().delete(&user.id).await {
                    tracing::error!(
                        error = %cleanup,
                        user_id = %user.id,
                        "Failed to remove user after profile creation failed"
                    );
                }
                Err(e)
            }
        }
    }
}
