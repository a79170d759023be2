use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use sqlx::SqliteConnection;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::debug;

use crate::batch::{Batch, Command};
use crate::rank::rank_window;
use crate::{FieldStream, Store, StoreError};

/// SQLite-based store implementation.
///
/// Blobs, hash records and sorted sets live in three tables. Batches run
/// inside a single transaction, so several processes can share one database
/// file and never observe a half-applied batch.
#[derive(Debug, Clone)]
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (creating if needed) the database file at `path` and apply the schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let options = SqliteConnectOptions::new()
      .filename(path.as_ref())
      .create_if_missing(true)
      .journal_mode(SqliteJournalMode::Wal)
      .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    let store = Self::new(pool);
    store.migrate().await?;

    debug!(path = %path.as_ref().display(), "opened sqlite store");
    Ok(store)
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    Ok(())
  }

  /// Apply one command on an open connection or transaction.
  async fn apply(conn: &mut SqliteConnection, command: &Command) -> Result<(), sqlx::Error> {
    match command {
      Command::Set { key, value } => {
        Self::remove(conn, key).await?;
        sqlx::query("INSERT INTO kv (key, value) VALUES (?, ?)")
          .bind(key)
          .bind(value)
          .execute(&mut *conn)
          .await?;
      }
      Command::Delete { keys } => {
        for key in keys {
          Self::remove(conn, key).await?;
        }
      }
      Command::HSet { key, field, value } => {
        sqlx::query(
          r#"
          INSERT INTO hashes (key, field, value) VALUES (?, ?, ?)
          ON CONFLICT (key, field) DO UPDATE SET value = excluded.value
          "#,
        )
        .bind(key)
        .bind(field)
        .bind(value)
        .execute(&mut *conn)
        .await?;
      }
      Command::HDel { key, field } => {
        sqlx::query("DELETE FROM hashes WHERE key = ? AND field = ?")
          .bind(key)
          .bind(field)
          .execute(&mut *conn)
          .await?;
      }
      Command::ZAdd { key, member, score } => {
        sqlx::query(
          r#"
          INSERT INTO zsets (key, member, score) VALUES (?, ?, ?)
          ON CONFLICT (key, member) DO UPDATE SET score = excluded.score
          "#,
        )
        .bind(key)
        .bind(member)
        .bind(score)
        .execute(&mut *conn)
        .await?;
      }
      Command::ZRem { key, member } => {
        sqlx::query("DELETE FROM zsets WHERE key = ? AND member = ?")
          .bind(key)
          .bind(member)
          .execute(&mut *conn)
          .await?;
      }
    }

    Ok(())
  }

  /// Remove every record kind stored under `key`.
  async fn remove(conn: &mut SqliteConnection, key: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM kv WHERE key = ?")
      .bind(key)
      .execute(&mut *conn)
      .await?;
    sqlx::query("DELETE FROM hashes WHERE key = ?")
      .bind(key)
      .execute(&mut *conn)
      .await?;
    sqlx::query("DELETE FROM zsets WHERE key = ?")
      .bind(key)
      .execute(&mut *conn)
      .await?;
    Ok(())
  }
}

#[async_trait]
impl Store for SqliteStore {
  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    let value = sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
      .bind(key)
      .fetch_optional(&self.pool)
      .await?;
    Ok(value)
  }

  async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
    let mut batch = Batch::new();
    batch.set(key, value);
    self.execute(batch).await
  }

  async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
    let rows: Vec<(String, String)> =
      sqlx::query_as("SELECT field, value FROM hashes WHERE key = ?")
        .bind(key)
        .fetch_all(&self.pool)
        .await?;
    Ok(rows.into_iter().collect())
  }

  async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
    let mut batch = Batch::new();
    batch.hset(key, field, value);
    self.execute(batch).await
  }

  async fn hdel(&self, key: &str, field: &str) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM hashes WHERE key = ? AND field = ?")
      .bind(key)
      .bind(field)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  fn hscan<'a>(&'a self, key: &'a str) -> FieldStream<'a> {
    let rows = sqlx::query_as::<_, (String, String)>("SELECT field, value FROM hashes WHERE key = ?")
      .bind(key)
      .fetch(&self.pool);
    Box::pin(rows.map(|row| row.map_err(StoreError::from)))
  }

  async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
    let len: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM zsets WHERE key = ?")
      .bind(key)
      .fetch_one(&self.pool)
      .await?;

    let Some((offset, count)) = rank_window(len, start, stop) else {
      return Ok(Vec::new());
    };

    let members = sqlx::query_scalar(
      r#"
      SELECT member FROM zsets
      WHERE key = ?
      ORDER BY score, member
      LIMIT ? OFFSET ?
      "#,
    )
    .bind(key)
    .bind(count)
    .bind(offset)
    .fetch_all(&self.pool)
    .await?;

    Ok(members)
  }

  async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
    let keys = sqlx::query_scalar(
      r#"
      SELECT key FROM kv WHERE key GLOB ?
      UNION
      SELECT key FROM hashes WHERE key GLOB ?
      UNION
      SELECT key FROM zsets WHERE key GLOB ?
      ORDER BY key
      "#,
    )
    .bind(pattern)
    .bind(pattern)
    .bind(pattern)
    .fetch_all(&self.pool)
    .await?;

    Ok(keys)
  }

  async fn execute(&self, batch: Batch) -> Result<(), StoreError> {
    if batch.is_empty() {
      return Ok(());
    }

    // Dropping the transaction on error rolls back everything applied so far.
    let mut tx = self.pool.begin().await?;
    for command in batch.commands() {
      Self::apply(&mut *tx, command).await?;
    }
    tx.commit().await?;

    Ok(())
  }
}
