//! The shared error taxonomy for the fichas workspace.
//!
//! Every crate in the workspace reports through this enum so that callers
//! (notably the API layer) can map error kinds without knowing which
//! backend produced them.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed identifier or filename; rejected before touching storage.
  #[error("validation error: {0}")]
  Validation(String),

  /// The underlying store is unreadable or unwritable. Surfaced to the
  /// operator on explicit write actions; degraded on reads.
  #[error("persistence error at {path}: {source}")]
  Persistence {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// An `image_refs` entry with no backing file, surfaced at open time.
  #[error("attachment {filename:?} not found for ficha {ficha}")]
  AttachmentNotFound { ficha: String, filename: String },

  /// Reserved for a future optimistic-concurrency stamp compared at save
  /// time. The last-writer-wins baseline never constructs this.
  #[error("conflicting write: {0}")]
  Conflict(String),

  /// A metadata document that cannot be decoded.
  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// The source dataset cannot be read or lacks required columns.
  #[error("source error: {0}")]
  Source(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
