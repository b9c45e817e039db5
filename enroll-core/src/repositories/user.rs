use crate::{Error, User, UserId, user::NewUser};
use async_trait::async_trait;

/// Repository for user data access
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Create a new user
    ///
    /// Fails with [`StorageError::Constraint`](crate::error::StorageError::Constraint)
    /// when the username is taken.
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Find a user by exact username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error>;

    /// Whether any user has exactly this email (case-sensitive)
    async fn exists_by_email(&self, email: &str) -> Result<bool, Error>;

    /// Mark a user as active
    async fn set_active(&self, id: &UserId, is_active: bool) -> Result<(), Error>;

    /// Retrieve a user's password hash
    async fn get_password_hash(&self, id: &UserId) -> Result<Option<String>, Error>;

    /// Delete a user, failing with `NotFound` when there is none
    async fn delete(&self, id: &UserId) -> Result<(), Error>;
}
