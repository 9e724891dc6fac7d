//! Record listing, detail, and metadata-edit handlers.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use fichas_core::{
  ficha::FichaId,
  record::{RecordMetadata, SourceRecord},
  resolve::{self, EffectiveRecord, ResolveOptions},
  store::{AttachmentStore, MetadataStore, SourceLoader},
};

use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  /// Request-scoped staleness threshold; the server default applies when
  /// absent.
  pub threshold_days: Option<u32>,
}

fn options<L, S>(state: &AppState<L, S>, params: &ListParams) -> ResolveOptions {
  ResolveOptions::new(
    params.threshold_days.unwrap_or(state.default_threshold),
    Utc::now().date_naive(),
  )
}

/// `GET /records` — the full classified listing, in source order.
pub async fn list<L, S>(
  State(state): State<AppState<L, S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<EffectiveRecord>>, ApiError>
where
  L: SourceLoader,
  S: MetadataStore + AttachmentStore,
{
  let source = state.loader.load_records().await?;
  let opts = options(&state, &params);
  Ok(Json(resolve::resolve_all(&source, &*state.store, &opts).await))
}

/// `GET /records/{ficha}` — one resolved record; 404 when the ficha is
/// not present in the source sheet.
pub async fn get_one<L, S>(
  State(state): State<AppState<L, S>>,
  Path(ficha): Path<String>,
  Query(params): Query<ListParams>,
) -> Result<Json<EffectiveRecord>, ApiError>
where
  L: SourceLoader,
  S: MetadataStore + AttachmentStore,
{
  let id = FichaId::new(&ficha)?;
  let source = state.loader.load_records().await?;
  let record = find_source(&source, &id)?;
  let opts = options(&state, &params);
  Ok(Json(resolve::resolve_one(record, &*state.store, &opts).await))
}

/// Body of `PUT /records/{ficha}/metadata`. Only the fields present in
/// the request are changed; an explicit `"override_last_maintenance":
/// null` clears the operator date so the spreadsheet value applies
/// again.
#[derive(Debug, Default, Deserialize)]
pub struct MetadataPatch {
  #[serde(default, deserialize_with = "present")]
  pub override_last_maintenance: Option<Option<NaiveDate>>,
  #[serde(default)]
  pub notes:                     Option<String>,
}

/// Wraps a deserialised value in `Some` so that an absent field and an
/// explicit `null` stay distinguishable.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

/// `PUT /records/{ficha}/metadata` — read-modify-write of the named
/// fields, persisted as one full atomic save (last writer wins).
pub async fn update_metadata<L, S>(
  State(state): State<AppState<L, S>>,
  Path(ficha): Path<String>,
  Json(patch): Json<MetadataPatch>,
) -> Result<Json<RecordMetadata>, ApiError>
where
  L: SourceLoader,
  S: MetadataStore + AttachmentStore,
{
  let id = FichaId::new(&ficha)?;

  let mut metadata = state.store.load(&id).await?;
  if let Some(value) = patch.override_last_maintenance {
    metadata.override_last_maintenance = value;
  }
  if let Some(notes) = patch.notes {
    metadata.notes = notes;
  }
  state.store.save(&id, &metadata).await?;

  tracing::info!(ficha = %id, "metadata updated");
  Ok(Json(metadata))
}

fn find_source<'a>(
  source: &'a [SourceRecord],
  id: &FichaId,
) -> Result<&'a SourceRecord, ApiError> {
  source
    .iter()
    .find(|r| &r.id == id)
    .ok_or_else(|| ApiError::NotFound(format!("ficha {id} is not in the source sheet")))
}
