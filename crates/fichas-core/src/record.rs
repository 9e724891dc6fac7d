//! Record types — the source row and the persisted per-record metadata.
//!
//! A source record is re-derived on every load of the spreadsheet export
//! and is never written back. Operator edits live in [`RecordMetadata`],
//! one document per ficha, owned exclusively by the metadata store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ficha::FichaId;

/// One row of the maintenance spreadsheet, as supplied by the source
/// loader. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
  pub id:               FichaId,
  /// The spreadsheet's "Fecha Último Mantenimiento" value, if the cell
  /// held a parseable date.
  pub last_maintenance: Option<NaiveDate>,
  pub model:            Option<String>,
  pub location:         Option<String>,
}

impl SourceRecord {
  /// Convenience constructor with the descriptive columns left empty.
  pub fn new(id: FichaId, last_maintenance: Option<NaiveDate>) -> Self {
    Self { id, last_maintenance, model: None, location: None }
  }
}

/// Operator-entered state for one ficha, persisted as a single JSON
/// document in the record's partition. Created lazily on first write;
/// never deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
  /// Manually entered maintenance date. Always wins over the spreadsheet
  /// value, since the spreadsheet may lag reality.
  #[serde(default)]
  pub override_last_maintenance: Option<NaiveDate>,
  #[serde(default)]
  pub notes:                     String,
  /// Filenames of attachments stored in this record's partition, in
  /// upload order.
  #[serde(default)]
  pub image_refs:                Vec<String>,
}

impl RecordMetadata {
  /// True when nothing has ever been recorded for this ficha.
  pub fn is_empty(&self) -> bool {
    self.override_last_maintenance.is_none()
      && self.notes.is_empty()
      && self.image_refs.is_empty()
  }
}
