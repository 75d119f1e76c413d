use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

pub mod models;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct DBService {
    pub pool: SqlitePool,
}

impl DBService {
    /// Open (creating if necessary) the database at `database_url` and run
    /// pending migrations.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;
        tracing::debug!(%database_url, "database ready");

        Ok(Self { pool })
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use tempfile::TempDir;

    use super::DBService;

    /// Fresh migrated database on a temp dir. The `TempDir` must be kept
    /// alive for the duration of the test.
    pub async fn test_db() -> (DBService, TempDir) {
        let dir = TempDir::new().expect("create temp dir");
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        let db = DBService::new(&url).await.expect("open test database");
        (db, dir)
    }
}
