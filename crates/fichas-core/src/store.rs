//! The storage and ingestion trait seams.
//!
//! Implemented by backends (`fichas-store-fs`, `fichas-ingest`); higher
//! layers (`fichas-api`) depend on these abstractions, not on any
//! concrete backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (tokio with `axum`).

use std::future::Future;

use crate::{
  Result,
  ficha::FichaId,
  record::{RecordMetadata, SourceRecord},
};

/// Durable per-record operator state, one document per ficha.
///
/// Concurrent-write policy: last-writer-wins at the granularity of a
/// full [`save`](MetadataStore::save). There is no field-level merge and
/// no optimistic-concurrency token — an explicit simplification for the
/// assumed one-operator-per-record usage. [`crate::Error::Conflict`] is
/// the reserved kind should a version stamp ever be added.
pub trait MetadataStore: Send + Sync {
  /// Read the persisted metadata for `id`.
  ///
  /// Absence is a valid state: a ficha that has never been written
  /// yields [`RecordMetadata::default`], not an error. Errors mean the
  /// store itself could not be read.
  fn load<'a>(
    &'a self,
    id: &'a FichaId,
  ) -> impl Future<Output = Result<RecordMetadata>> + Send + 'a;

  /// Replace the stored metadata for `id` in full, atomically: a
  /// concurrent `load` observes either the fully-old or fully-new
  /// document, never a mix. Fails with [`crate::Error::Persistence`]
  /// when the underlying storage is unwritable.
  fn save<'a>(
    &'a self,
    id: &'a FichaId,
    metadata: &'a RecordMetadata,
  ) -> impl Future<Output = Result<()>> + Send + 'a;
}

/// Binary attachments stored inside a record's partition, kept
/// consistent with the record's `image_refs`.
///
/// There is no deletion operation; attachments are append-only.
pub trait AttachmentStore: Send + Sync {
  /// Sanitize `filename`, disambiguate collisions with already-stored
  /// files, write `bytes` into the record's partition, and append the
  /// stored name to `image_refs`. Returns the name actually stored.
  ///
  /// The `image_refs` append is a read-modify-write that is not atomic
  /// with respect to other concurrent metadata edits; see the
  /// concurrent-write policy on [`MetadataStore`].
  fn add_image<'a>(
    &'a self,
    id: &'a FichaId,
    filename: &'a str,
    bytes: &'a [u8],
  ) -> impl Future<Output = Result<String>> + Send + 'a;

  /// The record's `image_refs`, in upload order. Does not stat the
  /// backing files — a missing file surfaces from
  /// [`open_image`](AttachmentStore::open_image) instead.
  fn list_images<'a>(
    &'a self,
    id: &'a FichaId,
  ) -> impl Future<Output = Result<Vec<String>>> + Send + 'a;

  /// Read one attachment's bytes. Fails with
  /// [`crate::Error::AttachmentNotFound`] when the reference has no
  /// backing file.
  fn open_image<'a>(
    &'a self,
    id: &'a FichaId,
    filename: &'a str,
  ) -> impl Future<Output = Result<Vec<u8>>> + Send + 'a;
}

/// Supplier of the raw record sequence — the spreadsheet-equivalent
/// source, read in full once per classifying pass.
pub trait SourceLoader: Send + Sync {
  fn load_records(
    &self,
  ) -> impl Future<Output = Result<Vec<SourceRecord>>> + Send + '_;
}
