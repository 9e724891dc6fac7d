//! [`CsvLoader`] — reads the maintenance sheet from a CSV file.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use fichas_core::{
  Error, Result,
  ficha::FichaId,
  record::SourceRecord,
  store::SourceLoader,
};

use crate::normalize::detect_column;

const FICHA_ALIASES: &[&str] = &["ficha"];
const MODEL_ALIASES: &[&str] = &["modelo"];
const LOCATION_ALIASES: &[&str] = &["location", "ubicacion"];
const DATE_ALIASES: &[&str] = &[
  "fecha ultimo mantenimiento",
  // Some real sheets carry this misspelled header; the fold cannot
  // repair it, so it needs its own alias.
  "fecha ultiimo mantenimiento",
  "fecha de ultimo mantenimiento",
  "ultimo mantenimiento",
];

/// Date formats seen in sheet exports, day-first forms preferred.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// A [`SourceLoader`] over a CSV export. The file is re-read in full on
/// every [`load_records`](SourceLoader::load_records) call, so edits to
/// the sheet show up on the next classifying pass without a restart.
#[derive(Debug, Clone)]
pub struct CsvLoader {
  path: PathBuf,
}

impl CsvLoader {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

impl SourceLoader for CsvLoader {
  async fn load_records(&self) -> Result<Vec<SourceRecord>> {
    let path = self.path.clone();
    tokio::task::spawn_blocking(move || read_csv(&path))
      .await
      .map_err(|e| Error::Source(format!("loader task failed: {e}")))?
  }
}

fn read_csv(path: &Path) -> Result<Vec<SourceRecord>> {
  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .trim(csv::Trim::All)
    .from_path(path)
    .map_err(|e| Error::Source(format!("cannot read {}: {e}", path.display())))?;

  let headers: Vec<String> = reader
    .headers()
    .map_err(|e| Error::Source(format!("cannot read headers: {e}")))?
    .iter()
    .map(|h| h.to_string())
    .collect();

  let ficha_col = detect_column(&headers, FICHA_ALIASES).ok_or_else(|| {
    missing_column("ficha", &headers)
  })?;
  let date_col = detect_column(&headers, DATE_ALIASES).ok_or_else(|| {
    missing_column("fecha ultimo mantenimiento", &headers)
  })?;
  let model_col = detect_column(&headers, MODEL_ALIASES);
  let location_col = detect_column(&headers, LOCATION_ALIASES);

  let mut out = Vec::new();
  for (line, row) in reader.records().enumerate() {
    let row = match row {
      Ok(row) => row,
      Err(e) => {
        tracing::warn!(line, error = %e, "skipping unreadable row");
        continue;
      }
    };

    let raw_id = row.get(ficha_col).unwrap_or("");
    let id = match FichaId::new(raw_id) {
      Ok(id) => id,
      Err(e) => {
        tracing::warn!(line, identifier = raw_id, error = %e, "skipping row without usable ficha");
        continue;
      }
    };

    let last_maintenance =
      row.get(date_col).and_then(|s| parse_date(&id, s));

    out.push(SourceRecord {
      id,
      last_maintenance,
      model: model_col.and_then(|i| non_empty(row.get(i))),
      location: location_col.and_then(|i| non_empty(row.get(i))),
    });
  }

  tracing::debug!(records = out.len(), path = %path.display(), "source loaded");
  Ok(out)
}

/// Parse a sheet cell as a date. Blank or unparseable cells coerce to
/// `None` (the record then classifies fail-safe as overdue) rather than
/// failing the whole load.
fn parse_date(id: &FichaId, raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  for format in DATE_FORMATS {
    if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
      return Some(date);
    }
  }
  tracing::warn!(ficha = %id, value = raw, "unparseable maintenance date; treating as unknown");
  None
}

fn non_empty(cell: Option<&str>) -> Option<String> {
  cell.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

fn missing_column(wanted: &str, headers: &[String]) -> Error {
  Error::Source(format!(
    "no column matching {wanted:?} among headers {headers:?}"
  ))
}
