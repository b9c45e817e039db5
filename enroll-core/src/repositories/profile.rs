use crate::{
    Error, UserId,
    profile::{NewRegistrationProfile, ProfileId, RegistrationProfile},
};
use async_trait::async_trait;

/// Repository for registration profile data access
#[async_trait]
pub trait RegistrationProfileRepository: Send + Sync + 'static {
    /// Create a new profile
    async fn create(&self, profile: NewRegistrationProfile) -> Result<RegistrationProfile, Error>;

    /// All profiles belonging to a user, oldest first
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<RegistrationProfile>, Error>;

    /// Find a profile by its activation key
    async fn find_by_activation_key(
        &self,
        activation_key: &str,
    ) -> Result<Option<RegistrationProfile>, Error>;

    /// Record that the profile's key has been used
    ///
    /// Returns `false` without changing anything when the profile was already
    /// activated, so of several concurrent callers exactly one sees `true`.
    async fn mark_activated(&self, id: &ProfileId) -> Result<bool, Error>;
}
