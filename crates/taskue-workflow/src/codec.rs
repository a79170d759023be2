//! Versioned blob format for stored records.
//!
//! Every blob is a JSON envelope:
//!
//! ```json
//! { "version": 1, "kind": "workflow", "data": { "uid": "...", ... } }
//! ```
//!
//! Decoding checks the version and the kind before touching `data`, so a
//! blob written by an incompatible runner, or a task blob read as a
//! workflow, is rejected instead of half-parsed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::task::Task;
use crate::workflow::Workflow;

/// Envelope version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

/// A record that can be stored as a blob.
pub trait Record: Serialize + DeserializeOwned {
  /// Tag written into the envelope.
  const KIND: &'static str;
}

impl Record for Workflow {
  const KIND: &'static str = "workflow";
}

impl Record for Task {
  const KIND: &'static str = "task";
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
  version: u32,
  kind: &'a str,
  data: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
  version: u32,
  kind: String,
  data: serde_json::Value,
}

pub fn encode<T: Record>(record: &T) -> Result<Vec<u8>, CodecError> {
  let envelope = EnvelopeRef {
    version: FORMAT_VERSION,
    kind: T::KIND,
    data: record,
  };
  Ok(serde_json::to_vec(&envelope)?)
}

pub fn decode<T: Record>(blob: &[u8]) -> Result<T, CodecError> {
  let envelope: Envelope = serde_json::from_slice(blob)?;

  if envelope.version != FORMAT_VERSION {
    return Err(CodecError::UnsupportedVersion {
      found: envelope.version,
    });
  }

  if envelope.kind != T::KIND {
    return Err(CodecError::KindMismatch {
      expected: T::KIND.to_string(),
      found: envelope.kind,
    });
  }

  Ok(serde_json::from_value(envelope.data)?)
}
