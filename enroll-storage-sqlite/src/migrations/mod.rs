//! Schema migrations for the SQLite backend
//!
//! A [`Migration`] is a version number plus the SQL statements that apply and revert
//! it. [`SqliteMigrator`] runs each pending migration in its own transaction and
//! records it in [`MIGRATION_TABLE`], so applying the same list twice is a no-op.
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;

/// Name of the table recording applied migrations
pub const MIGRATION_TABLE: &str = "_enroll_migrations";

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Duplicate migration version {0}")]
    DuplicateVersion(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub up: &'static [&'static str],
    pub down: &'static [&'static str],
}

/// A row of [`MIGRATION_TABLE`]
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    /// Unix timestamp in seconds
    pub applied_at: i64,
}

/// Every migration of this backend, oldest first
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "CreateUsersTable",
        // No UNIQUE on email; the registration form rejects duplicates
        up: &[r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 0,
                date_joined INTEGER NOT NULL DEFAULT (unixepoch()),
                updated_at INTEGER NOT NULL DEFAULT (unixepoch()),
                UNIQUE(username)
            )"#],
        down: &["DROP TABLE IF EXISTS users"],
    },
    Migration {
        version: 2,
        name: "CreateRegistrationProfilesTable",
        up: &[r#"
            CREATE TABLE IF NOT EXISTS registration_profiles (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                activation_key TEXT NOT NULL,
                created_at INTEGER NOT NULL DEFAULT (unixepoch()),
                activated_at INTEGER,
                UNIQUE(activation_key),
                FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
            )"#],
        down: &["DROP TABLE IF EXISTS registration_profiles"],
    },
    Migration {
        version: 3,
        name: "CreateIndexes",
        up: &[
            "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
            "CREATE INDEX IF NOT EXISTS idx_registration_profiles_user_id ON registration_profiles(user_id)",
        ],
        down: &[
            "DROP INDEX IF EXISTS idx_users_email",
            "DROP INDEX IF EXISTS idx_registration_profiles_user_id",
        ],
    },
];

fn check_unique_versions(migrations: &[Migration]) -> Result<(), MigrationError> {
    let mut versions: Vec<i64> = migrations.iter().map(|m| m.version).collect();
    versions.sort_unstable();

    match versions.windows(2).find(|pair| pair[0] == pair[1]) {
        Some(pair) => Err(MigrationError::DuplicateVersion(pair[0])),
        None => Ok(()),
    }
}

async fn execute_all(
    conn: &mut SqliteConnection,
    statements: &[&str],
) -> Result<(), MigrationError> {
    for &statement in statements {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    Ok(())
}

pub struct SqliteMigrator {
    pool: SqlitePool,
}

impl SqliteMigrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the tracking table if it does not exist yet
    pub async fn initialize(&self) -> Result<(), MigrationError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {MIGRATION_TABLE} (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at INTEGER NOT NULL DEFAULT (unixepoch())
            )"#
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Apply every migration not yet recorded, in the order given
    ///
    /// Returns how many were applied.
    pub async fn up(&self, migrations: &[Migration]) -> Result<usize, MigrationError> {
        check_unique_versions(migrations)?;

        let mut applied = 0;
        for migration in migrations {
            if self.is_applied(migration.version).await? {
                continue;
            }

            tracing::info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );

            let mut tx = self.pool.begin().await?;
            execute_all(&mut tx, migration.up).await?;
            sqlx::query(&format!(
                "INSERT INTO {MIGRATION_TABLE} (version, name, applied_at) VALUES (?1, ?2, ?3)"
            ))
            .bind(migration.version)
            .bind(migration.name)
            .bind(Utc::now().timestamp())
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;

            applied += 1;
        }

        Ok(applied)
    }

    /// Revert every recorded migration in the list, newest first
    ///
    /// Returns how many were reverted.
    pub async fn down(&self, migrations: &[Migration]) -> Result<usize, MigrationError> {
        let mut reverted = 0;
        for migration in migrations.iter().rev() {
            if !self.is_applied(migration.version).await? {
                continue;
            }

            tracing::info!(
                version = migration.version,
                name = migration.name,
                "Rolling back migration"
            );

            let mut tx = self.pool.begin().await?;
            execute_all(&mut tx, migration.down).await?;
            sqlx::query(&format!("DELETE FROM {MIGRATION_TABLE} WHERE version = ?1"))
                .bind(migration.version)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            reverted += 1;
        }

        Ok(reverted)
    }

    pub async fn applied(&self) -> Result<Vec<AppliedMigration>, MigrationError> {
        let records = sqlx::query_as::<_, AppliedMigration>(&format!(
            "SELECT version, name, applied_at FROM {MIGRATION_TABLE} ORDER BY version"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn is_applied(&self, version: i64) -> Result<bool, MigrationError> {
        let applied: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {MIGRATION_TABLE} WHERE version = ?1)"
        ))
        .bind(version)
        .fetch_one(&self.pool)
        .await?;

        Ok(applied)
    }
}
