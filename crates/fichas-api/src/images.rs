//! Attachment upload and retrieval handlers.
//!
//! Uploads arrive as base64 in JSON bodies; downloads stream the raw
//! bytes. The attachment store is keyed by ficha alone and does not
//! consult the source sheet.

use axum::{
  Json,
  extract::{Path, State},
  http::header,
  response::IntoResponse,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use fichas_core::{
  ficha::FichaId,
  store::{AttachmentStore, MetadataStore, SourceLoader},
};

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct UploadBody {
  /// The filename as uploaded; it is sanitized and possibly suffixed
  /// before storage.
  pub filename: String,
  /// Base64-encoded file contents.
  pub data:     String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
  /// The name the attachment was actually stored (and is listed) under.
  pub stored_filename: String,
}

/// `POST /records/{ficha}/images`.
pub async fn upload<L, S>(
  State(state): State<AppState<L, S>>,
  Path(ficha): Path<String>,
  Json(body): Json<UploadBody>,
) -> Result<Json<UploadResponse>, ApiError>
where
  L: SourceLoader,
  S: MetadataStore + AttachmentStore,
{
  let id = FichaId::new(&ficha)?;
  let bytes = STANDARD
    .decode(body.data.as_bytes())
    .map_err(|e| ApiError::BadRequest(format!("invalid base64 payload: {e}")))?;

  let stored_filename =
    state.store.add_image(&id, &body.filename, &bytes).await?;
  Ok(Json(UploadResponse { stored_filename }))
}

/// `GET /records/{ficha}/images` — the record's `image_refs`, cheap
/// listing without per-file existence checks.
pub async fn list<L, S>(
  State(state): State<AppState<L, S>>,
  Path(ficha): Path<String>,
) -> Result<Json<Vec<String>>, ApiError>
where
  L: SourceLoader,
  S: MetadataStore + AttachmentStore,
{
  let id = FichaId::new(&ficha)?;
  Ok(Json(state.store.list_images(&id).await?))
}

/// `GET /records/{ficha}/images/{filename}` — raw bytes; 404 surfaces an
/// orphaned reference at open time.
pub async fn open<L, S>(
  State(state): State<AppState<L, S>>,
  Path((ficha, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError>
where
  L: SourceLoader,
  S: MetadataStore + AttachmentStore,
{
  let id = FichaId::new(&ficha)?;
  let bytes = state.store.open_image(&id, &filename).await?;
  Ok((
    [(header::CONTENT_TYPE, "application/octet-stream")],
    Bytes::from(bytes),
  ))
}
