use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;
use std::time::Duration;

use super::{BackendError, BackendResult, KvBackend, ReadTxn, WriteTxn};

const CREATE_BUCKETS: &str = r#"
CREATE TABLE IF NOT EXISTS kv_buckets (
    name TEXT PRIMARY KEY NOT NULL
)
"#;

const CREATE_ENTRIES: &str = r#"
CREATE TABLE IF NOT EXISTS kv_entries (
    bucket TEXT NOT NULL REFERENCES kv_buckets(name) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value BLOB NOT NULL,
    PRIMARY KEY (bucket, key)
)
"#;

/// Buckets and entries kept in two SQLite tables. Each transaction maps onto
/// one SQLite transaction, so a committed write replaces its values
/// atomically.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Open (creating if missing) the database at `url`, e.g.
    /// `sqlite://feeds.db`, and make sure the tables exist.
    pub async fn connect(url: &str) -> BackendResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        // Every connection to an in-memory database gets its own empty
        // database, so those pools hold exactly one connection for good.
        let pool_options = if is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_BUCKETS).execute(&pool).await?;
        sqlx::query(CREATE_ENTRIES).execute(&pool).await?;

        tracing::debug!(url, "SQLite backing store ready");

        Ok(Self { pool })
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[async_trait]
impl KvBackend for SqliteBackend {
    async fn create_bucket_if_absent(&self, bucket: &str) -> BackendResult<()> {
        sqlx::query("INSERT OR IGNORE INTO kv_buckets (name) VALUES (?1)")
            .bind(bucket)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn begin_read(&self) -> BackendResult<Box<dyn ReadTxn>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTxn { tx }))
    }

    async fn begin_write(&self) -> BackendResult<Box<dyn WriteTxn>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTxn { tx }))
    }

    async fn check_connection(&self) -> BackendResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    /// Closes every pooled connection; later calls fail with
    /// `sqlx::Error::PoolClosed`.
    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Rolled back on drop unless committed.
struct SqliteTxn {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteTxn {
    async fn ensure_bucket(&mut self, bucket: &str) -> BackendResult<()> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT 1 FROM kv_buckets WHERE name = ?1")
            .bind(bucket)
            .fetch_optional(&mut *self.tx)
            .await?;

        match exists {
            Some(_) => Ok(()),
            None => Err(BackendError::BucketNotFound(bucket.to_string())),
        }
    }
}

#[async_trait]
impl ReadTxn for SqliteTxn {
    async fn get(&mut self, bucket: &str, key: &str) -> BackendResult<Option<Vec<u8>>> {
        self.ensure_bucket(bucket).await?;

        let value = sqlx::query_scalar::<_, Vec<u8>>(
            "SELECT value FROM kv_entries WHERE bucket = ?1 AND key = ?2",
        )
        .bind(bucket)
        .bind(key)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(value)
    }
}

#[async_trait]
impl WriteTxn for SqliteTxn {
    async fn put(&mut self, bucket: &str, key: &str, value: Vec<u8>) -> BackendResult<()> {
        self.ensure_bucket(bucket).await?;

        sqlx::query(
            r#"
            INSERT INTO kv_entries (bucket, key, value)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (bucket, key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(bucket)
        .bind(key)
        .bind(value)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> BackendResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
