//! Records owned by runner processes: runners and namespaces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// A runner's self-reported fields, as written under `taskue:runner:{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
  pub name: String,
  pub fields: BTreeMap<String, String>,
}

impl Runner {
  pub fn get(&self, field: &str) -> Option<&str> {
    self.fields.get(field).map(String::as_str)
  }

  /// Heartbeat timestamp (Unix seconds), when the runner reports one.
  pub fn last_seen(&self) -> Option<i64> {
    self.get("timestamp")?.trim().parse().ok()
  }
}

/// A namespace and the last time a runner reported activity in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
  pub name: String,
  /// Unix seconds.
  pub timestamp: i64,
}

impl Namespace {
  /// Build a namespace from one field of the namespace map.
  pub fn parse(name: impl Into<String>, value: &str) -> Result<Self, CodecError> {
    let name = name.into();
    let timestamp = value
      .trim()
      .parse()
      .map_err(|_| CodecError::InvalidValue {
        message: format!("namespace '{}' has non-integer timestamp '{}'", name, value),
      })?;
    Ok(Self { name, timestamp })
  }
}
