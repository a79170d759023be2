use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures::{StreamExt, stream};

use crate::batch::{Batch, Command};
use crate::glob::glob_match;
use crate::rank::rank_window;
use crate::{FieldStream, Store, StoreError};

/// Every record kind, keyed by store key.
#[derive(Debug, Default)]
struct Records {
  values: HashMap<String, Vec<u8>>,
  hashes: HashMap<String, HashMap<String, String>>,
  sorted: HashMap<String, HashMap<String, f64>>,
}

impl Records {
  fn remove(&mut self, key: &str) {
    self.values.remove(key);
    self.hashes.remove(key);
    self.sorted.remove(key);
  }

  fn apply(&mut self, command: Command) {
    match command {
      Command::Set { key, value } => {
        self.remove(&key);
        self.values.insert(key, value);
      }
      Command::Delete { keys } => {
        for key in keys {
          self.remove(&key);
        }
      }
      Command::HSet { key, field, value } => {
        self.hashes.entry(key).or_default().insert(field, value);
      }
      Command::HDel { key, field } => {
        self.hdel(&key, &field);
      }
      Command::ZAdd { key, member, score } => {
        self.sorted.entry(key).or_default().insert(member, score);
      }
      Command::ZRem { key, member } => {
        if let Some(set) = self.sorted.get_mut(&key) {
          set.remove(&member);
          if set.is_empty() {
            self.sorted.remove(&key);
          }
        }
      }
    }
  }

  fn hdel(&mut self, key: &str, field: &str) -> bool {
    let Some(hash) = self.hashes.get_mut(key) else {
      return false;
    };
    let removed = hash.remove(field).is_some();
    if hash.is_empty() {
      self.hashes.remove(key);
    }
    removed
  }
}

#[derive(Debug, Default)]
struct Inner {
  records: Mutex<Records>,
  unavailable: AtomicBool,
}

/// In-memory store implementation.
///
/// All records sit behind one lock, so a [`Batch`] is applied in a single
/// critical section and readers never observe part of it. Clones share the
/// same records, which lets a test hold one handle for a client and another
/// for playing the runner.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make every subsequent operation fail with [`StoreError::Unavailable`]
  /// until switched back.
  pub fn set_unavailable(&self, unavailable: bool) {
    self.inner.unavailable.store(unavailable, Ordering::SeqCst);
  }

  fn records(&self) -> Result<MutexGuard<'_, Records>, StoreError> {
    if self.inner.unavailable.load(Ordering::SeqCst) {
      return Err(StoreError::unavailable("memory store is offline"));
    }
    self
      .inner
      .records
      .lock()
      .map_err(|_| StoreError::unavailable("memory store lock poisoned"))
  }

  fn hash_snapshot(&self, key: &str) -> Result<Vec<(String, String)>, StoreError> {
    let records = self.records()?;
    Ok(
      records
        .hashes
        .get(key)
        .map(|hash| {
          hash
            .iter()
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
        })
        .unwrap_or_default(),
    )
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    Ok(self.records()?.values.get(key).cloned())
  }

  async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, StoreError> {
    let records = self.records()?;
    Ok(keys.iter().map(|key| records.values.get(key).cloned()).collect())
  }

  async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
    self.records()?.apply(Command::Set {
      key: key.to_string(),
      value,
    });
    Ok(())
  }

  async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
    Ok(self.records()?.hashes.get(key).cloned().unwrap_or_default())
  }

  async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
    self.records()?.apply(Command::HSet {
      key: key.to_string(),
      field: field.to_string(),
      value: value.to_string(),
    });
    Ok(())
  }

  async fn hdel(&self, key: &str, field: &str) -> Result<bool, StoreError> {
    Ok(self.records()?.hdel(key, field))
  }

  fn hscan<'a>(&'a self, key: &'a str) -> FieldStream<'a> {
    // Nothing is read until the stream is first polled.
    let snapshot = stream::once(async move { self.hash_snapshot(key) });
    Box::pin(snapshot.flat_map(|snapshot| {
      let items: Vec<Result<(String, String), StoreError>> = match snapshot {
        Ok(pairs) => pairs.into_iter().map(Ok).collect(),
        Err(e) => vec![Err(e)],
      };
      stream::iter(items)
    }))
  }

  async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
    let records = self.records()?;
    let Some(set) = records.sorted.get(key) else {
      return Ok(Vec::new());
    };

    let Some((offset, count)) = rank_window(set.len() as i64, start, stop) else {
      return Ok(Vec::new());
    };

    let mut members: Vec<(&String, f64)> = set.iter().map(|(m, s)| (m, *s)).collect();
    members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    Ok(
      members
        .into_iter()
        .skip(offset as usize)
        .take(count as usize)
        .map(|(member, _)| member.clone())
        .collect(),
    )
  }

  async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
    let records = self.records()?;
    let mut keys: Vec<String> = records
      .values
      .keys()
      .chain(records.hashes.keys())
      .chain(records.sorted.keys())
      .filter(|key| glob_match(pattern, key))
      .cloned()
      .collect();
    keys.sort();
    keys.dedup();
    Ok(keys)
  }

  async fn execute(&self, batch: Batch) -> Result<(), StoreError> {
    let mut records = self.records()?;
    for command in batch {
      records.apply(command);
    }
    Ok(())
  }
}
