//! Atomic write batches.

/// A single write applied as part of a [`Batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
  /// Set a blob, replacing any record stored under the key.
  Set { key: String, value: Vec<u8> },

  /// Delete records of any kind stored under the keys.
  Delete { keys: Vec<String> },

  /// Set one field of a hash record.
  HSet {
    key: String,
    field: String,
    value: String,
  },

  /// Remove one field of a hash record.
  HDel { key: String, field: String },

  /// Insert a member into a sorted set, or update its score.
  ZAdd {
    key: String,
    member: String,
    score: f64,
  },

  /// Remove a member from a sorted set.
  ZRem { key: String, member: String },
}

/// An ordered list of commands that a store applies all-or-nothing.
///
/// # Usage
///
/// ```ignore
/// let mut batch = Batch::new();
/// batch
///   .set("taskue:workflow:abc", blob)
///   .zadd("taskue:workflows", "abc", 1700000000000.0);
/// store.execute(batch).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
  commands: Vec<Command>,
}

impl Batch {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(&mut self, key: impl Into<String>, value: Vec<u8>) -> &mut Self {
    self.push(Command::Set {
      key: key.into(),
      value,
    })
  }

  /// Queue deletion of several keys. An empty key list queues nothing.
  pub fn delete<I, K>(&mut self, keys: I) -> &mut Self
  where
    I: IntoIterator<Item = K>,
    K: Into<String>,
  {
    let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
    if keys.is_empty() {
      return self;
    }
    self.push(Command::Delete { keys })
  }

  pub fn hset(
    &mut self,
    key: impl Into<String>,
    field: impl Into<String>,
    value: impl Into<String>,
  ) -> &mut Self {
    self.push(Command::HSet {
      key: key.into(),
      field: field.into(),
      value: value.into(),
    })
  }

  pub fn hdel(&mut self, key: impl Into<String>, field: impl Into<String>) -> &mut Self {
    self.push(Command::HDel {
      key: key.into(),
      field: field.into(),
    })
  }

  pub fn zadd(&mut self, key: impl Into<String>, member: impl Into<String>, score: f64) -> &mut Self {
    self.push(Command::ZAdd {
      key: key.into(),
      member: member.into(),
      score,
    })
  }

  pub fn zrem(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
    self.push(Command::ZRem {
      key: key.into(),
      member: member.into(),
    })
  }

  /// Commands in the order they will be applied.
  pub fn commands(&self) -> &[Command] {
    &self.commands
  }

  pub fn len(&self) -> usize {
    self.commands.len()
  }

  pub fn is_empty(&self) -> bool {
    self.commands.is_empty()
  }

  fn push(&mut self, command: Command) -> &mut Self {
    self.commands.push(command);
    self
  }
}

impl IntoIterator for Batch {
  type Item = Command;
  type IntoIter = std::vec::IntoIter<Command>;

  fn into_iter(self) -> Self::IntoIter {
    self.commands.into_iter()
  }
}
