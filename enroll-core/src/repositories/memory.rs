//! In-memory repositories
//!
//! Everything lives in [`DashMap`]s and disappears with the provider. Useful for tests
//! and for applications that keep accounts elsewhere and only need the registration flow.
use crate::{
    Error, User, UserId,
    error::StorageError,
    profile::{NewRegistrationProfile, ProfileId, RegistrationProfile},
    repositories::{
        ProfileRepositoryProvider, RegistrationProfileRepository, RepositoryProvider,
        UserRepository, UserRepositoryProvider,
    },
    user::NewUser,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<UserId, (User, String)>,
    // Serializes the username check with the insert
    create_lock: Mutex<()>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let _guard = self
            .create_lock
            .lock()
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        if self
            .users
            .iter()
            .any(|entry| entry.value().0.username == user.username)
        {
            return Err(Error::Storage(StorageError::Constraint(format!(
                "username {} already exists",
                user.username
            ))));
        }

        let now = Utc::now();
        let created = User {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            date_joined: now,
            updated_at: now,
        };

        self.users.insert(
            created.id.clone(),
            (created.clone(), user.password_hash),
        );

        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        Ok(self.users.get(id).map(|entry| entry.value().0.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().0.username == username)
            .map(|entry| entry.value().0.clone()))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, Error> {
        Ok(self.users.iter().any(|entry| entry.value().0.email == email))
    }

    async fn set_active(&self, id: &UserId, is_active: bool) -> Result<(), Error> {
        let mut entry = self
            .users
            .get_mut(id)
            .ok_or(Error::Storage(StorageError::NotFound))?;

        entry.0.is_active = is_active;
        entry.0.updated_at = Utc::now();
        Ok(())
    }

    async fn get_password_hash(&self, id: &UserId) -> Result<Option<String>, Error> {
        Ok(self.users.get(id).map(|entry| entry.value().1.clone()))
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        self.users
            .remove(id)
            .map(|_| ())
            .ok_or(Error::Storage(StorageError::NotFound))
    }
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: DashMap<ProfileId, RegistrationProfile>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl RegistrationProfileRepository for InMemoryProfileRepository {
    async fn create(&self, profile: NewRegistrationProfile) -> Result<RegistrationProfile, Error> {
        let created = RegistrationProfile {
            id: profile.id,
            user_id: profile.user_id,
            activation_key: profile.activation_key,
            created_at: Utc::now(),
            activated_at: None,
        };

        self.profiles.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<RegistrationProfile>, Error> {
        let mut profiles: Vec<RegistrationProfile> = self
            .profiles
            .iter()
            .filter(|entry| &entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();

        profiles.sort_by_key(|profile| profile.created_at);
        Ok(profiles)
    }

    async fn find_by_activation_key(
        &self,
        activation_key: &str,
    ) -> Result<Option<RegistrationProfile>, Error> {
        Ok(self
            .profiles
            .iter()
            .find(|entry| entry.value().activation_key == activation_key)
            .map(|entry| entry.value().clone()))
    }

    async fn mark_activated(&self, id: &ProfileId) -> Result<bool, Error> {
        let mut profile = self
            .profiles
            .get_mut(id)
            .ok_or(Error::Storage(StorageError::NotFound))?;

        if profile.activated_at.is_some() {
            return Ok(false);
        }

        profile.activated_at = Some(Utc::now());
        Ok(true)
    }
}

/// A [`RepositoryProvider`] backed entirely by process memory
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    user: InMemoryUserRepository,
    profile: InMemoryProfileRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepositoryProvider for InMemoryRepositoryProvider {
    type UserRepo = InMemoryUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl ProfileRepositoryProvider for InMemoryRepositoryProvider {
    type ProfileRepo = InMemoryProfileRepository;

    fn profile(&self) -> &Self::ProfileRepo {
        &self.profile
    }
}

#[async_trait]
impl RepositoryProvider for InMemoryRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser::builder()
            .username(username.to_string())
            .email(email.to_string())
            .password_hash("hash".to_string())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        assert!(!user.is_active);
        assert_eq!(repo.find_by_id(&user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            repo.find_by_username("alice").await.unwrap(),
            Some(user.clone())
        );
        assert!(repo.exists_by_email("alice@example.com").await.unwrap());
        assert!(!repo.exists_by_email("ALICE@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("alice", "a@example.com"))
            .await
            .unwrap();

        let result = repo.create(new_user("alice", "b@example.com")).await;
        assert!(matches!(
            result,
            Err(Error::Storage(StorageError::Constraint(_)))
        ));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_set_active() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        repo.set_active(&user.id, true).await.unwrap();
        assert!(repo.find_by_id(&user.id).await.unwrap().unwrap().is_active);

        let missing = repo.set_active(&UserId::new("usr_missing"), true).await;
        assert!(matches!(missing, Err(Error::Storage(StorageError::NotFound))));
    }

    #[tokio::test]
    async fn test_profile_lifecycle() {
        let users = InMemoryUserRepository::new();
        let profiles = InMemoryProfileRepository::new();
        let user = users
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        let profile = profiles
            .create(NewRegistrationProfile::for_user(&user))
            .await
            .unwrap();

        assert_eq!(
            profiles.find_by_user(&user.id).await.unwrap(),
            vec![profile.clone()]
        );
        assert_eq!(
            profiles
                .find_by_activation_key(&profile.activation_key)
                .await
                .unwrap(),
            Some(profile.clone())
        );

        assert!(profiles.mark_activated(&profile.id).await.unwrap());
        let activated = profiles
            .find_by_activation_key(&profile.activation_key)
            .await
            .unwrap()
            .unwrap();
        assert!(activated.is_activated());
    }

    #[tokio::test]
    async fn test_mark_activated_only_once() {
        let users = InMemoryUserRepository::new();
        let profiles = InMemoryProfileRepository::new();
        let user = users
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();
        let profile = profiles
            .create(NewRegistrationProfile::for_user(&user))
            .await
            .unwrap();

        assert!(profiles.mark_activated(&profile.id).await.unwrap());
        let first = profiles
            .find_by_activation_key(&profile.activation_key)
            .await
            .unwrap()
            .unwrap()
            .activated_at;

        assert!(!profiles.mark_activated(&profile.id).await.unwrap());
        let second = profiles
            .find_by_activation_key(&profile.activation_key)
            .await
            .unwrap()
            .unwrap()
            .activated_at;
        assert_eq!(first, second);

        let missing = profiles.mark_activated(&ProfileId::new("rpf_missing")).await;
        assert!(matches!(missing, Err(Error::Storage(StorageError::NotFound))));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        repo.delete(&user.id).await.unwrap();
        assert!(repo.is_empty());

        let again = repo.delete(&user.id).await;
        assert!(matches!(again, Err(Error::Storage(StorageError::NotFound))));
    }
}
