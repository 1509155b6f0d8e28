use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::GeneralConfig;

pub mod listing;
pub mod migrator;
pub mod repositories;

pub use repositories::rating::RatingRepository;
pub use repositories::store::StoreRepository;
pub use repositories::user::UserRepository;

/// Handle to the relational store. Cheap to clone; all clones share the pool.
#[derive(Clone)]
pub struct Storage {
    pub conn: DatabaseConnection,
}

impl Storage {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::connect(&GeneralConfig {
            database_path: db_url.to_string(),
            ..GeneralConfig::default()
        })
        .await
    }

    pub async fn connect(config: &GeneralConfig) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let db_url = config.database_path.as_str();
        let in_memory = is_in_memory(db_url);

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        // Every connection to `:memory:` opens a fresh, empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (config.max_db_connections, config.min_db_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(config.db_connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .sqlx_logging(false);

        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        migrator::Migrator::up(&conn, None)
            .await
            .context("Failed to apply migrations")?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn stores(&self) -> StoreRepository {
        StoreRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn ratings(&self) -> RatingRepository {
        RatingRepository::new(self.conn.clone())
    }
}

fn is_in_memory(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}

/// Current instant as stored in `created_at`/`updated_at`.
///
/// Fixed microsecond precision keeps lexical order equal to chronological
/// order, which the `created_at` sort and the window counters rely on.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Lower bound of a trailing window of `days` days ending now.
#[must_use]
pub fn window_start(days: u32) -> String {
    (Utc::now() - ChronoDuration::days(i64::from(days))).to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Whether `err` was caused by a unique constraint rejecting a write.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.downcast_ref::<DbErr>().is_some_and(|db_err| {
            matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_sort_lexically() {
        let earlier = window_start(1);
        let now = now_timestamp();
        assert!(earlier < now);
        assert_eq!(now.len(), "2025-01-01T00:00:00.000000Z".len());
    }

    #[test]
    fn test_memory_urls_detected() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite:file:test?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite:data/storerate.db"));
    }

    #[test]
    fn test_plain_errors_are_not_unique_violations() {
        let err = anyhow::anyhow!("boom");
        assert!(!is_unique_violation(&err));

        let err = anyhow::Error::new(DbErr::RecordNotFound("x".to_string()));
        assert!(!is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_in_memory_storage_migrates_and_pings() {
        let storage = Storage::new("sqlite::memory:").await.unwrap();
        storage.ping().await.unwrap();
        assert_eq!(storage.users().count().await.unwrap(), 0);
    }
}
