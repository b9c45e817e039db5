use async_trait::async_trait;
use chrono::{DateTime, Utc};
use enroll_core::{
    Error, User, UserId, error::StorageError, repositories::UserRepository, user::NewUser,
};
use sqlx::{Sqlite, SqlitePool};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SqliteUser {
    id: String,
    username: String,
    email: String,
    is_active: bool,
    date_joined: i64,
    updated_at: i64,
}

impl TryFrom<SqliteUser> for User {
    type Error = Error;

    fn try_from(user: SqliteUser) -> Result<Self, Self::Error> {
        User::builder()
            .id(UserId::new(&user.id))
            .username(user.username)
            .email(user.email)
            .is_active(user.is_active)
            .date_joined(timestamp(user.date_joined)?)
            .updated_at(timestamp(user.updated_at)?)
            .build()
    }
}

pub(crate) fn timestamp(seconds: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        Error::Storage(StorageError::Database(format!(
            "Invalid timestamp: {seconds}"
        )))
    })
}

pub(crate) fn database_error(e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::Storage(StorageError::Constraint(db.message().to_string()))
        }
        _ => Error::Storage(StorageError::Database(e.to_string())),
    }
}

/// Insert a user through any SQLite executor, so it can join a transaction
pub(crate) async fn insert_user<'e, E>(executor: E, user: &NewUser) -> Result<User, Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let now = Utc::now().timestamp();

    let sqlite_user = sqlx::query_as::<_, SqliteUser>(
        r#"
        INSERT INTO users (id, username, email, password_hash, is_active, date_joined, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        RETURNING id, username, email, is_active, date_joined, updated_at
        "#,
    )
    .bind(user.id.as_str())
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.is_active)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, username = %user.username, "Failed to create user");
        database_error(e)
    })?;

    sqlite_user.try_into()
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        insert_user(&self.pool, &user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        let sqlite_user = sqlx::query_as::<_, SqliteUser>(
            "SELECT id, username, email, is_active, date_joined, updated_at FROM users WHERE id = ?1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        sqlite_user.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let sqlite_user = sqlx::query_as::<_, SqliteUser>(
            "SELECT id, username, email, is_active, date_joined, updated_at FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        sqlite_user.map(User::try_from).transpose()
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(database_error)?;

        Ok(exists)
    }

    async fn set_active(&self, id: &UserId, is_active: bool) -> Result<(), Error> {
        let result = sqlx::query("UPDATE users SET is_active = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(is_active)
            .bind(Utc::now().timestamp())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::Storage(StorageError::NotFound));
        }

        Ok(())
    }

    async fn get_password_hash(&self, id: &UserId) -> Result<Option<String>, Error> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?;

        Ok(hash)
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::Storage(StorageError::NotFound));
        }

        Ok(())
    }
}
