use thiserror::Error;

/// Errors produced while encoding or decoding stored records.
#[derive(Debug, Error)]
pub enum CodecError {
  #[error("invalid json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("unsupported record version {found}")]
  UnsupportedVersion { found: u32 },

  #[error("expected a {expected} record, found {found}")]
  KindMismatch { expected: String, found: String },

  #[error("invalid value: {message}")]
  InvalidValue { message: String },
}
