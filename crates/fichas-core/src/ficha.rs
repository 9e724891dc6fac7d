//! `FichaId` — the validated identifier of a tracked equipment record.
//!
//! The identifier doubles as the name of the record's storage partition,
//! so anything that could escape a directory is rejected here, before any
//! path is ever formed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A ficha identifier, unique per equipment record and stable across
/// loads of the source spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct FichaId(String);

impl FichaId {
  /// Validate and construct an identifier from raw source text.
  ///
  /// Surrounding whitespace is trimmed. Rejects empty strings, path
  /// separators, NUL bytes, and dot-names (`.`, `..`, `.hidden`).
  pub fn new(raw: impl AsRef<str>) -> Result<Self> {
    let trimmed = raw.as_ref().trim();
    if trimmed.is_empty() {
      return Err(Error::Validation("ficha identifier is empty".into()));
    }
    if trimmed.contains(['/', '\\', '\0']) {
      return Err(Error::Validation(format!(
        "ficha identifier {trimmed:?} contains a path separator"
      )));
    }
    if trimmed.starts_with('.') {
      return Err(Error::Validation(format!(
        "ficha identifier {trimmed:?} starts with a dot"
      )));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for FichaId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl TryFrom<String> for FichaId {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

/// Reduce an uploaded filename to a safe, bare name for storage inside a
/// record's partition.
///
/// Any directory components are stripped (only the final path segment
/// survives), and the result must be a plain non-empty name. Collision
/// handling against already-stored files is the store's job, not ours.
pub fn sanitize_filename(raw: &str) -> Result<String> {
  let base = raw
    .rsplit(['/', '\\'])
    .next()
    .unwrap_or(raw)
    .trim()
    .replace('\0', "");
  if base.is_empty() || base == "." || base == ".." {
    return Err(Error::Validation(format!(
      "unusable attachment filename {raw:?}"
    )));
  }
  Ok(base)
}
