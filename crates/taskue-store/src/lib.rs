//! Taskue Store
//!
//! This crate provides the key-value store contract that taskue clients and
//! runner processes share, along with two backends:
//!
//! - [`MemoryStore`]: in-process records behind a single lock, used for tests
//!   and embedding.
//! - [`SqliteStore`]: a file-backed store that several processes can open at
//!   the same time.
//!
//! The [`Store`] trait defines operations for:
//! - Plain blobs addressed by key
//! - Hash records (field/value maps)
//! - Sorted sets queried by rank
//! - Atomic [`Batch`]es of write commands
//! - Key enumeration by glob pattern
//!
//! Absence is always reported as `None` or an empty collection, never as an
//! error.

mod batch;
mod glob;
mod memory;
mod rank;
mod sqlite;

pub use batch::{Batch, Command};
pub use glob::glob_match;
pub use memory::MemoryStore;
pub use rank::rank_window;
pub use sqlite::SqliteStore;

use std::collections::HashMap;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

/// A lazy stream of `(field, value)` pairs read from a hash record.
pub type FieldStream<'a> =
  Pin<Box<dyn Stream<Item = Result<(String, String), StoreError>> + Send + 'a>>;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// The store could not be reached or refused the operation.
  #[error("store unavailable: {message}")]
  Unavailable { message: String },

  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// Applying the schema failed.
  #[error("migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
  /// Create an unavailable error.
  pub fn unavailable(message: impl Into<String>) -> Self {
    Self::Unavailable {
      message: message.into(),
    }
  }
}

/// Storage contract for taskue records.
#[async_trait]
pub trait Store: Send + Sync {
  /// Get a blob by key.
  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

  /// Get several blobs, one slot per requested key.
  async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, StoreError> {
    let mut values = Vec::with_capacity(keys.len());
    for key in keys {
      values.push(self.get(key).await?);
    }
    Ok(values)
  }

  /// Set a blob.
  async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

  /// Get every field of a hash record. Empty when the record is absent.
  async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

  /// Set one field of a hash record.
  async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;

  /// Remove one field of a hash record. Returns whether the field existed.
  async fn hdel(&self, key: &str, field: &str) -> Result<bool, StoreError>;

  /// Lazily iterate the fields of a hash record, in no particular order.
  fn hscan<'a>(&'a self, key: &'a str) -> FieldStream<'a>;

  /// Members of a sorted set between two ranks, inclusive.
  ///
  /// Members are ordered by score, then by member. Negative ranks count
  /// from the end of the set.
  async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError>;

  /// Every key matching a glob pattern, sorted.
  async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

  /// Apply every command in the batch, or none of them.
  async fn execute(&self, batch: Batch) -> Result<(), StoreError>;
}
