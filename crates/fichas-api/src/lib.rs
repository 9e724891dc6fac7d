//! JSON REST API for the fichas maintenance tracker.
//!
//! Exposes an axum [`Router`] backed by any
//! [`fichas_core::store::MetadataStore`] + [`AttachmentStore`] pair and
//! any [`SourceLoader`]. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", fichas_api::api_router(state))
//! ```

pub mod error;
pub mod images;
pub mod records;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use fichas_core::store::{AttachmentStore, MetadataStore, SourceLoader};

pub use error::ApiError;

/// Shared handler state: the source of records, the per-record store,
/// and the configured default staleness threshold.
pub struct AppState<L, S> {
  pub loader:            Arc<L>,
  pub store:             Arc<S>,
  pub default_threshold: u32,
}

// Manual impl: `L` and `S` live behind `Arc`s and need not be `Clone`.
impl<L, S> Clone for AppState<L, S> {
  fn clone(&self) -> Self {
    Self {
      loader:            Arc::clone(&self.loader),
      store:             Arc::clone(&self.store),
      default_threshold: self.default_threshold,
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<L, S>(state: AppState<L, S>) -> Router<()>
where
  L: SourceLoader + 'static,
  S: MetadataStore + AttachmentStore + 'static,
{
  Router::new()
    // Records
    .route("/records", get(records::list::<L, S>))
    .route("/records/{ficha}", get(records::get_one::<L, S>))
    .route(
      "/records/{ficha}/metadata",
      put(records::update_metadata::<L, S>),
    )
    // Attachments
    .route(
      "/records/{ficha}/images",
      get(images::list::<L, S>).post(images::upload::<L, S>),
    )
    .route("/records/{ficha}/images/{filename}", get(images::open::<L, S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
