use crate::repositories::user::{database_error, timestamp};
use async_trait::async_trait;
use chrono::Utc;
use enroll_core::{
    Error, UserId,
    error::StorageError,
    profile::{NewRegistrationProfile, ProfileId, RegistrationProfile},
    repositories::RegistrationProfileRepository,
};
use sqlx::{Sqlite, SqlitePool};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SqliteRegistrationProfile {
    id: String,
    user_id: String,
    activation_key: String,
    created_at: i64,
    activated_at: Option<i64>,
}

impl TryFrom<SqliteRegistrationProfile> for RegistrationProfile {
    type Error = Error;

    fn try_from(profile: SqliteRegistrationProfile) -> Result<Self, Self::Error> {
        Ok(RegistrationProfile {
            id: ProfileId::new(&profile.id),
            user_id: UserId::new(&profile.user_id),
            activation_key: profile.activation_key,
            created_at: timestamp(profile.created_at)?,
            activated_at: profile.activated_at.map(timestamp).transpose()?,
        })
    }
}

pub(crate) async fn insert_profile<'e, E>(
    executor: E,
    profile: &NewRegistrationProfile,
) -> Result<RegistrationProfile, Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sqlite_profile = sqlx::query_as::<_, SqliteRegistrationProfile>(
        r#"
        INSERT INTO registration_profiles (id, user_id, activation_key, created_at)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, user_id, activation_key, created_at, activated_at
        "#,
    )
    .bind(profile.id.as_str())
    .bind(profile.user_id.as_str())
    .bind(&profile.activation_key)
    .bind(Utc::now().timestamp())
    .fetch_one(executor)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = %profile.user_id, "Failed to create registration profile");
        database_error(e)
    })?;

    sqlite_profile.try_into()
}

pub struct SqliteRegistrationProfileRepository {
    pool: SqlitePool,
}

impl SqliteRegistrationProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationProfileRepository for SqliteRegistrationProfileRepository {
    async fn create(&self, profile: NewRegistrationProfile) -> Result<RegistrationProfile, Error> {
        insert_profile(&self.pool, &profile).await
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<RegistrationProfile>, Error> {
        let profiles = sqlx::query_as::<_, SqliteRegistrationProfile>(
            r#"
            SELECT id, user_id, activation_key, created_at, activated_at
            FROM registration_profiles
            WHERE user_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        profiles
            .into_iter()
            .map(RegistrationProfile::try_from)
            .collect()
    }

    async fn find_by_activation_key(
        &self,
        activation_key: &str,
    ) -> Result<Option<RegistrationProfile>, Error> {
        let profile = sqlx::query_as::<_, SqliteRegistrationProfile>(
            r#"
            SELECT id, user_id, activation_key, created_at, activated_at
            FROM registration_profiles
            WHERE activation_key = ?1
            "#,
        )
        .bind(activation_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        profile.map(RegistrationProfile::try_from).transpose()
    }

    async fn mark_activated(&self, id: &ProfileId) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE registration_profiles SET activated_at = ?1 WHERE id = ?2 AND activated_at IS NULL",
        )
        .bind(Utc::now().timestamp())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM registration_profiles WHERE id = ?1)")
                .bind(id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(database_error)?;

        if exists {
            Ok(false)
        } else {
            Err(Error::Storage(StorageError::NotFound))
        }
    }
}
