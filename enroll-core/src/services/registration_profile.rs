use crate::{
    Error, User, UserId,
    crypto::is_activation_key,
    error::{RegistrationError, StorageError},
    profile::{NewRegistrationProfile, RegistrationProfile},
    repositories::{
        ProfileRepositoryProvider, RegistrationProfileRepository, RepositoryProvider,
        UserRepository, UserRepositoryProvider,
    },
    user::NewUser,
};
use std::sync::Arc;

/// Service creating inactive accounts and their registration profiles
///
/// This service never sends email. Delivering the activation key is left to the
/// registration backend.
pub struct RegistrationProfileService<R: RepositoryProvider> {
    repositories: Arc<R>,
}

impl<R: RepositoryProvider> RegistrationProfileService<R> {
    pub fn new(repositories: Arc<R>) -> Self {
        Self { repositories }
    }

    /// Create an inactive user with a hashed password, plus one registration profile
    ///
    /// The email is stored exactly as given. Storage errors, such as a taken
    /// username, are returned unchanged and leave nothing behind.
    pub async fn create_inactive_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, Error> {
        let password_hash = Self::hash_password(password);

        let new_user = NewUser::builder()
            .id(UserId::new_random())
            .username(username.to_string())
            .email(email.to_string())
            .password_hash(password_hash)
            .is_active(false)
            .build()?;

        let new_profile = NewRegistrationProfile::for_new_user(&new_user);
        let (user, profile) = self
            .repositories
            .create_user_with_profile(new_user, new_profile)
            .await?;

        tracing::debug!(
            user_id = %user.id,
            profile_id = %profile.id,
            "Created inactive user and registration profile"
        );

        Ok(user)
    }

    /// Every registration profile of a user, oldest first
    pub async fn profiles_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RegistrationProfile>, Error> {
        self.repositories.profile().find_by_user(user_id).await
    }

    /// Activate the account owning `activation_key`
    ///
    /// Returns the user as stored after activation.
    pub async fn activate_user(
        &self,
        activation_key: &str,
        expiration_days: i64,
    ) -> Result<User, Error> {
        if !is_activation_key(activation_key) {
            return Err(RegistrationError::InvalidActivationKey.into());
        }

        let profile = self
            .repositories
            .profile()
            .find_by_activation_key(activation_key)
            .await?
            .ok_or(RegistrationError::InvalidActivationKey)?;

        let user = self
            .repositories
            .user()
            .find_by_id(&profile.user_id)
            .await?
            .ok_or(RegistrationError::InvalidActivationKey)?;

        if profile.is_activated() {
            return Err(RegistrationError::AlreadyActivated.into());
        }

        if profile.activation_key_expired(&user, expiration_days) {
            return Err(RegistrationError::ActivationKeyExpired.into());
        }

        // Claim the key first; a concurrent activation loses here
        if !self
            .repositories
            .profile()
            .mark_activated(&profile.id)
            .await?
        {
            return Err(RegistrationError::AlreadyActivated.into());
        }

        self.repositories.user().set_active(&user.id, true).await?;

        self.repositories
            .user()
            .find_by_id(&user.id)
            .await?
            .ok_or(Error::Storage(StorageError::NotFound))
    }

    /// Hash a password using argon2
    fn hash_password(password: &str) -> String {
        password_auth::generate_hash(password)
    }
}
