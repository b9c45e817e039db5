//! SQLite storage backend for enroll
//!
//! [`SqliteRepositoryProvider`] implements the enroll-core repository traits on top
//! of a [`sqlx::SqlitePool`]. Call [`RepositoryProvider::migrate`] once before use
//! to create the `users` and `registration_profiles` tables.
//!
//! ```rust,ignore
//! use enroll_core::RepositoryProvider;
//! use enroll_storage_sqlite::SqliteRepositoryProvider;
//!
//! let pool = sqlx::SqlitePool::connect("sqlite://enroll.db?mode=rwc").await?;
//! let repositories = SqliteRepositoryProvider::new(pool);
//! repositories.migrate().await?;
//! ```
//!
//! [`RepositoryProvider::migrate`]: enroll_core::RepositoryProvider::migrate
mod migrations;
pub mod repositories;

pub use migrations::{
    AppliedMigration, MIGRATION_TABLE, MIGRATIONS, Migration, MigrationError, SqliteMigrator,
};
pub use repositories::{
    SqliteRegistrationProfileRepository, SqliteRepositoryProvider, SqliteUserRepository,
};

#[cfg(test)]
mod tests {
    use super::*;
    use enroll_core::{
        Error, RepositoryProvider, UserId,
        error::StorageError,
        profile::{NewRegistrationProfile, ProfileId},
        repositories::{
            ProfileRepositoryProvider, RegistrationProfileRepository, UserRepository,
            UserRepositoryProvider,
        },
        user::NewUser,
    };
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_sqlite_provider() -> SqliteRepositoryProvider {
        let _ = tracing_subscriber::fmt().try_init();

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create pool");
        let provider = SqliteRepositoryProvider::new(pool);
        provider.migrate().await.expect("Failed to migrate");
        provider
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser::builder()
            .username(username.to_string())
            .email(email.to_string())
            .password_hash("argon2-hash".to_string())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check_and_repeat_migrate() {
        let provider = setup_sqlite_provider().await;
        provider.health_check().await.unwrap();
        provider.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn test_user_roundtrip() {
        let provider = setup_sqlite_provider().await;

        let user = provider
            .user()
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();
        assert!(!user.is_active);
        assert!(user.id.is_valid());

        let found = provider.user().find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.email, "alice@example.com");
        assert_eq!(
            provider
                .user()
                .find_by_username("alice")
                .await
                .unwrap()
                .map(|u| u.id),
            Some(user.id.clone())
        );
        assert_eq!(
            provider.user().get_password_hash(&user.id).await.unwrap(),
            Some("argon2-hash".to_string())
        );
    }

    #[tokio::test]
    async fn test_exists_by_email_is_exact() {
        let provider = setup_sqlite_provider().await;
        provider
            .user()
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        assert!(provider.user().exists_by_email("alice@example.com").await.unwrap());
        assert!(!provider.user().exists_by_email("Alice@example.com").await.unwrap());
        assert!(!provider.user().exists_by_email("bob@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_constraint_error() {
        let provider = setup_sqlite_provider().await;
        provider
            .user()
            .create(new_user("alice", "a@example.com"))
            .await
            .unwrap();

        let result = provider
            .user()
            .create(new_user("alice", "b@example.com"))
            .await;
        assert!(matches!(
            result,
            Err(Error::Storage(StorageError::Constraint(_)))
        ));
    }

    #[tokio::test]
    async fn test_set_active() {
        let provider = setup_sqlite_provider().await;
        let user = provider
            .user()
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        provider.user().set_active(&user.id, true).await.unwrap();
        let found = provider.user().find_by_id(&user.id).await.unwrap().unwrap();
        assert!(found.is_active);

        let missing = provider
            .user()
            .set_active(&UserId::new("usr_missing"), true)
            .await;
        assert!(matches!(
            missing,
            Err(Error::Storage(StorageError::NotFound))
        ));
    }

    #[tokio::test]
    async fn test_registration_profiles() {
        let provider = setup_sqlite_provider().await;
        let user = provider
            .user()
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        let profile = provider
            .profile()
            .create(NewRegistrationProfile::for_user(&user))
            .await
            .unwrap();
        assert_eq!(profile.user_id, user.id);
        assert!(!profile.is_activated());

        let profiles = provider.profile().find_by_user(&user.id).await.unwrap();
        assert_eq!(profiles, vec![profile.clone()]);

        let found = provider
            .profile()
            .find_by_activation_key(&profile.activation_key)
            .await
            .unwrap();
        assert_eq!(found, Some(profile.clone()));

        assert!(provider.profile().mark_activated(&profile.id).await.unwrap());
        let activated = provider
            .profile()
            .find_by_activation_key(&profile.activation_key)
            .await
            .unwrap()
            .unwrap();
        assert!(activated.is_activated());

        assert!(
            provider
                .profile()
                .find_by_activation_key(&"0".repeat(64))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_mark_activated_only_once() {
        let provider = setup_sqlite_provider().await;
        let user = provider
            .user()
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();
        let profile = provider
            .profile()
            .create(NewRegistrationProfile::for_user(&user))
            .await
            .unwrap();

        assert!(provider.profile().mark_activated(&profile.id).await.unwrap());
        assert!(!provider.profile().mark_activated(&profile.id).await.unwrap());

        let missing = provider
            .profile()
            .mark_activated(&ProfileId::new("rpf_missing"))
            .await;
        assert!(matches!(
            missing,
            Err(Error::Storage(StorageError::NotFound))
        ));
    }

    #[tokio::test]
    async fn test_create_user_with_profile() {
        let provider = setup_sqlite_provider().await;
        let new = new_user("alice", "alice@example.com");
        let new_profile = NewRegistrationProfile::for_new_user(&new);

        let (user, profile) = provider
            .create_user_with_profile(new, new_profile)
            .await
            .unwrap();

        assert_eq!(profile.user_id, user.id);
        assert_eq!(
            provider.profile().find_by_user(&user.id).await.unwrap(),
            vec![profile]
        );
    }

    #[tokio::test]
    async fn test_create_user_with_profile_rolls_back() {
        let provider = setup_sqlite_provider().await;
        let alice = new_user("alice", "alice@example.com");
        let alice_profile = NewRegistrationProfile::for_new_user(&alice);
        let taken_key = alice_profile.activation_key.clone();
        provider
            .create_user_with_profile(alice, alice_profile)
            .await
            .unwrap();

        let bob = new_user("bob", "bob@example.com");
        let mut bob_profile = NewRegistrationProfile::for_new_user(&bob);
        bob_profile.activation_key = taken_key;

        let result = provider.create_user_with_profile(bob, bob_profile).await;

        assert!(matches!(
            result,
            Err(Error::Storage(StorageError::Constraint(_)))
        ));
        assert_eq!(provider.user().find_by_username("bob").await.unwrap(), None);
        assert!(!provider.user().exists_by_email("bob@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_user_removes_profiles() {
        let provider = setup_sqlite_provider().await;
        let new = new_user("alice", "alice@example.com");
        let new_profile = NewRegistrationProfile::for_new_user(&new);
        let (user, profile) = provider
            .create_user_with_profile(new, new_profile)
            .await
            .unwrap();

        provider.user().delete(&user.id).await.unwrap();

        assert_eq!(provider.user().find_by_id(&user.id).await.unwrap(), None);
        assert_eq!(
            provider
                .profile()
                .find_by_activation_key(&profile.activation_key)
                .await
                .unwrap(),
            None
        );
        assert!(matches!(
            provider.user().delete(&user.id).await,
            Err(Error::Storage(StorageError::NotFound))
        ));
    }
}
