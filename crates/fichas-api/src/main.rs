//! fichas-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens
//! the filesystem store, points the CSV loader at the maintenance sheet
//! export, and serves the JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use fichas_api::AppState;
use fichas_core::status::DEFAULT_THRESHOLD_DAYS;
use fichas_ingest::CsvLoader;
use fichas_store_fs::FsStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Fichas maintenance tracker server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:           String,
  #[serde(default = "default_port")]
  port:           u16,
  /// Base directory for per-ficha partitions.
  data_dir:       PathBuf,
  /// CSV export of the maintenance sheet.
  source_path:    PathBuf,
  /// Default staleness threshold in days; requests may override it.
  #[serde(default = "default_threshold")]
  threshold_days: u32,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8600 }
fn default_threshold() -> u32 { DEFAULT_THRESHOLD_DAYS }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("FICHAS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.threshold_days < 1 {
    anyhow::bail!("threshold_days must be at least 1");
  }

  // Open the per-record store.
  let data_dir = expand_tilde(&server_cfg.data_dir);
  let store = FsStore::open(&data_dir)
    .await
    .with_context(|| format!("failed to open store at {data_dir:?}"))?;

  let loader = CsvLoader::new(expand_tilde(&server_cfg.source_path));

  let state = AppState {
    loader:            Arc::new(loader),
    store:             Arc::new(store),
    default_threshold: server_cfg.threshold_days,
  };

  let app = fichas_api::api_router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
