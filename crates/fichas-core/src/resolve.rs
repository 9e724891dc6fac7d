//! The record resolver — merges source rows with stored overrides into
//! the authoritative per-record view.
//!
//! An [`EffectiveRecord`] is computed on every pass and never cached:
//! both the threshold and "today" can change between requests.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  record::SourceRecord,
  status::{self, DEFAULT_THRESHOLD_DAYS, Status},
  store::MetadataStore,
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Classification inputs, threaded explicitly through every resolve call.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
  /// Staleness threshold in whole days, minimum 1.
  pub threshold_days: u32,
  /// The evaluation date; wall clock in production, pinned in tests.
  pub today:          NaiveDate,
}

impl ResolveOptions {
  pub fn new(threshold_days: u32, today: NaiveDate) -> Self {
    Self { threshold_days: threshold_days.max(1), today }
  }
}

impl Default for ResolveOptions {
  fn default() -> Self {
    Self {
      threshold_days: DEFAULT_THRESHOLD_DAYS,
      today:          Utc::now().date_naive(),
    }
  }
}

// ─── Computed view ───────────────────────────────────────────────────────────

/// The computed read model for one ficha — never stored, always derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveRecord {
  pub ficha:                     String,
  pub model:                     Option<String>,
  pub location:                  Option<String>,
  /// The spreadsheet's date, untouched by operator edits.
  pub source_last_maintenance:   Option<NaiveDate>,
  /// The operator's manually entered date, when present.
  pub override_last_maintenance: Option<NaiveDate>,
  /// `override` when present, else the source date. This is the value
  /// staleness is computed from.
  pub effective_last_maintenance: Option<NaiveDate>,
  /// Whole days since the effective date; negative for future-dated
  /// entries, absent when no date is known.
  pub days_since:                Option<i64>,
  /// Suggested next maintenance date (one month and fifteen days on).
  pub next_due:                  Option<NaiveDate>,
  pub status:                    Status,
  pub notes:                     String,
  pub image_refs:                Vec<String>,
  /// Set when this record's metadata could not be read; source-only
  /// values are shown and operator state is omitted.
  pub metadata_degraded:         bool,
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Resolve a single source record against the metadata store.
///
/// A failed metadata load degrades this record to source-only values
/// rather than propagating: one bad partition must not block the rest of
/// a listing.
pub async fn resolve_one<S: MetadataStore>(
  source: &SourceRecord,
  store: &S,
  opts: &ResolveOptions,
) -> EffectiveRecord {
  let (metadata, degraded) = match store.load(&source.id).await {
    Ok(m) => (m, false),
    Err(e) => {
      tracing::warn!(ficha = %source.id, error = %e, "metadata load failed; serving source-only record");
      (Default::default(), true)
    }
  };

  let effective = metadata
    .override_last_maintenance
    .or(source.last_maintenance);

  EffectiveRecord {
    ficha: source.id.as_str().to_string(),
    model: source.model.clone(),
    location: source.location.clone(),
    source_last_maintenance: source.last_maintenance,
    override_last_maintenance: metadata.override_last_maintenance,
    effective_last_maintenance: effective,
    days_since: effective.map(|d| status::days_since(d, opts.today)),
    next_due: effective.and_then(status::next_due),
    status: status::classify(effective, opts.threshold_days, opts.today),
    notes: metadata.notes,
    image_refs: metadata.image_refs,
    metadata_degraded: degraded,
  }
}

/// Resolve a whole source pass, preserving the loader's ordering.
pub async fn resolve_all<S: MetadataStore>(
  source: &[SourceRecord],
  store: &S,
  opts: &ResolveOptions,
) -> Vec<EffectiveRecord> {
  let mut out = Vec::with_capacity(source.len());
  for record in source {
    out.push(resolve_one(record, store, opts).await);
  }
  out
}
