//! SQLite connection pool and schema initialization.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                fs::create_dir_all(parent)
                    .await
                    .context("failed to create database directory")?;
            }
        }

        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("failed to connect to SQLite database")?;

        info!("connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    async fn init(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                timeframe TEXT NOT NULL,
                direction TEXT NOT NULL,
                pattern_group TEXT,
                signal_type TEXT NOT NULL,
                price TEXT NOT NULL,
                signal_time INTEGER NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("failed to create alerts table")?;

        // Additive migration: pre-existing rows predate pattern_group and
        // surface as NULL ("N/A" at the presentation layer).
        let _ = sqlx::query("ALTER TABLE alerts ADD COLUMN pattern_group TEXT")
            .execute(&mut *conn)
            .await;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_alerts_symbol_timeframe ON alerts (symbol, timeframe);",
        )
        .execute(&mut *conn)
        .await
        .context("failed to create symbol/timeframe index")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_alerts_pattern_group ON alerts (pattern_group);")
            .execute(&mut *conn)
            .await
            .context("failed to create pattern_group index")?;

        info!("database schema initialized");
        Ok(())
    }
}
