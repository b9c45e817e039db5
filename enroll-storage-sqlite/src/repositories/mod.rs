//! Repository implementations for SQLite storage

pub mod profile;
pub mod user;

pub use profile::SqliteRegistrationProfileRepository;
pub use user::SqliteUserRepository;

use profile::insert_profile;
use user::insert_user;

use async_trait::async_trait;
use enroll_core::{
    Error, User,
    error::StorageError,
    profile::{NewRegistrationProfile, RegistrationProfile},
    repositories::{ProfileRepositoryProvider, RepositoryProvider, UserRepositoryProvider},
    user::NewUser,
};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::migrations::{MIGRATIONS, SqliteMigrator};

/// Repository provider implementation for SQLite
///
/// This struct implements all the individual repository provider traits
/// as well as the unified `RepositoryProvider` trait.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    user: Arc<SqliteUserRepository>,
    profile: Arc<SqliteRegistrationProfileRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        let user = Arc::new(SqliteUserRepository::new(pool.clone()));
        let profile = Arc::new(SqliteRegistrationProfileRepository::new(pool.clone()));

        Self {
            pool,
            user,
            profile,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl UserRepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl ProfileRepositoryProvider for SqliteRepositoryProvider {
    type ProfileRepo = SqliteRegistrationProfileRepository;

    fn profile(&self) -> &Self::ProfileRepo {
        &self.profile
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        let migrator = SqliteMigrator::new(self.pool.clone());
        migrator.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::Storage(StorageError::Migration(
                "Failed to initialize migrations".to_string(),
            ))
        })?;

        let applied = migrator.up(MIGRATIONS).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Migration(
                "Failed to run migrations".to_string(),
            ))
        })?;
        tracing::debug!(applied, "Registration schema is up to date");

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Connection(e.to_string())))?;
        Ok(())
    }

    async fn create_user_with_profile(
        &self,
        user: NewUser,
        profile: NewRegistrationProfile,
    ) -> Result<(User, RegistrationProfile), Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        let user = insert_user(&mut *tx, &user).await?;
        let profile = insert_profile(&mut *tx, &profile).await?;

        tx.commit()
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        Ok((user, profile))
    }
}
