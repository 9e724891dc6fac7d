//! [`FsStore`] — the directory-per-record implementation of
//! [`MetadataStore`] and [`AttachmentStore`].

use std::{
  io::{ErrorKind, Write as _},
  path::{Path, PathBuf},
};

use tokio::fs;

use fichas_core::{
  Error, Result,
  ficha::{FichaId, sanitize_filename},
  record::RecordMetadata,
  store::{AttachmentStore, MetadataStore},
};

const METADATA_FILE: &str = "metadata.json";

/// A fichas store backed by one directory per record under a fixed base
/// path. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct FsStore {
  base: PathBuf,
}

impl FsStore {
  /// Open (or create) a store rooted at `base`.
  pub async fn open(base: impl Into<PathBuf>) -> Result<Self> {
    let base = base.into();
    fs::create_dir_all(&base)
      .await
      .map_err(|e| persistence(&base, e))?;
    Ok(Self { base })
  }

  /// The partition directory owning one record's document and blobs.
  fn partition(&self, id: &FichaId) -> PathBuf { self.base.join(id.as_str()) }

  fn metadata_path(&self, id: &FichaId) -> PathBuf {
    self.partition(id).join(METADATA_FILE)
  }

  /// Pick a filename that collides neither with an existing blob nor
  /// with a listed reference, suffixing `-1`, `-2`, … before the
  /// extension.
  async fn disambiguate(
    &self,
    id: &FichaId,
    wanted: &str,
    refs: &[String],
  ) -> Result<String> {
    let dir = self.partition(id);
    let mut candidate = wanted.to_string();
    let mut counter = 0u32;
    loop {
      let taken = refs.iter().any(|r| r == &candidate)
        || fs::try_exists(dir.join(&candidate))
          .await
          .map_err(|e| persistence(&dir, e))?;
      if !taken {
        return Ok(candidate);
      }
      counter += 1;
      candidate = suffixed(wanted, counter);
    }
  }
}

impl MetadataStore for FsStore {
  async fn load(&self, id: &FichaId) -> Result<RecordMetadata> {
    let path = self.metadata_path(id);
    let raw = match fs::read_to_string(&path).await {
      Ok(raw) => raw,
      // Never-written records are a valid, representable state.
      Err(e) if e.kind() == ErrorKind::NotFound => {
        return Ok(RecordMetadata::default());
      }
      Err(e) => return Err(persistence(&path, e)),
    };
    Ok(serde_json::from_str(&raw)?)
  }

  async fn save(&self, id: &FichaId, metadata: &RecordMetadata) -> Result<()> {
    let dir = self.partition(id);
    fs::create_dir_all(&dir)
      .await
      .map_err(|e| persistence(&dir, e))?;

    // Write the whole document to a uniquely-named sibling tmp file,
    // then rename over the canonical one. A concurrent load sees old or
    // new, never a mix, and racing saves each keep their own tmp file
    // instead of interleaving into a shared one.
    let canonical = dir.join(METADATA_FILE);
    let body = serde_json::to_vec_pretty(metadata)?;
    let written = body.len();
    tokio::task::spawn_blocking(move || -> Result<()> {
      let mut tmp = tempfile::Builder::new()
        .prefix(METADATA_FILE)
        .suffix(".tmp")
        .tempfile_in(&dir)
        .map_err(|e| persistence(&dir, e))?;
      tmp.write_all(&body).map_err(|e| persistence(tmp.path(), e))?;
      tmp
        .persist(&canonical)
        .map_err(|e| persistence(&canonical, e.error))?;
      Ok(())
    })
    .await
    .map_err(|e| {
      persistence(&self.partition(id), std::io::Error::other(e))
    })??;

    tracing::debug!(ficha = %id, bytes = written, "metadata saved");
    Ok(())
  }
}

impl AttachmentStore for FsStore {
  async fn add_image(
    &self,
    id: &FichaId,
    filename: &str,
    bytes: &[u8],
  ) -> Result<String> {
    let wanted = sanitize_filename(filename)?;
    // The document and its tmp siblings own the `metadata.json*` names.
    if wanted.starts_with(METADATA_FILE) {
      return Err(Error::Validation(format!(
        "attachment filename {wanted:?} is reserved"
      )));
    }

    let dir = self.partition(id);
    fs::create_dir_all(&dir)
      .await
      .map_err(|e| persistence(&dir, e))?;

    let mut metadata = self.load(id).await?;
    let stored = self.disambiguate(id, &wanted, &metadata.image_refs).await?;

    let blob_path = dir.join(&stored);
    fs::write(&blob_path, bytes)
      .await
      .map_err(|e| persistence(&blob_path, e))?;

    metadata.image_refs.push(stored.clone());
    if let Err(e) = self.save(id, &metadata).await {
      // Don't leave an unlisted blob behind when the reference could not
      // be recorded.
      let _ = fs::remove_file(&blob_path).await;
      return Err(e);
    }

    tracing::debug!(ficha = %id, filename = %stored, bytes = bytes.len(), "attachment stored");
    Ok(stored)
  }

  async fn list_images(&self, id: &FichaId) -> Result<Vec<String>> {
    Ok(self.load(id).await?.image_refs)
  }

  async fn open_image(&self, id: &FichaId, filename: &str) -> Result<Vec<u8>> {
    let name = sanitize_filename(filename)?;
    let path = self.partition(id).join(&name);
    match fs::read(&path).await {
      Ok(bytes) => Ok(bytes),
      Err(e) if e.kind() == ErrorKind::NotFound => {
        Err(Error::AttachmentNotFound {
          ficha:    id.as_str().to_string(),
          filename: name,
        })
      }
      Err(e) => Err(persistence(&path, e)),
    }
  }
}

fn persistence(path: &Path, source: std::io::Error) -> Error {
  Error::Persistence { path: path.to_path_buf(), source }
}

/// `photo.jpg` + 2 → `photo-2.jpg`; extensionless names get a bare
/// numeric suffix.
fn suffixed(name: &str, counter: u32) -> String {
  let path = Path::new(name);
  match (path.file_stem().and_then(|s| s.to_str()), path.extension().and_then(|s| s.to_str())) {
    (Some(stem), Some(ext)) => format!("{stem}-{counter}.{ext}"),
    _ => format!("{name}-{counter}"),
  }
}
