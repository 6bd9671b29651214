//! Scenario storage port and its adapters.
//!
//! Handlers and services only see `dyn ScenarioStore`; which adapter backs it is
//! decided once at startup from `StorageConfig`.
//!
//! Adapters:
//!   - `memory`    : in-process map, nothing survives a restart
//!   - `documents` : one JSON document per scenario under a collection directory
//!   - `local`     : a single JSON array file, the same shape the browser client
//!                   keeps under its `scenarios` local-storage key

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::domain::{Scenario, ScenarioPatch};

pub mod documents;
pub mod local;
pub mod memory;

pub use documents::DocumentStore;
pub use local::LocalFileStore;
pub use memory::MemoryStore;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("storage I/O failed at {path}: {source}")]
  Io { path: PathBuf, source: std::io::Error },
  #[error("failed to (de)serialize {path}: {source}")]
  Serialization { path: PathBuf, source: serde_json::Error },
  #[error("scenario `{0}` already exists")]
  Duplicate(String),
}

#[async_trait]
pub trait ScenarioStore: Send + Sync {
  /// Short adapter name for logs.
  fn backend(&self) -> &'static str;

  async fn create(&self, scenario: Scenario) -> Result<Scenario>;
  async fn get_by_id(&self, id: &str) -> Result<Option<Scenario>>;
  /// Applies the patch and bumps `updated_at`. Last write wins.
  async fn update(&self, id: &str, patch: ScenarioPatch) -> Result<Option<Scenario>>;
  /// Returns false when nothing was stored under `id`.
  async fn delete(&self, id: &str) -> Result<bool>;
  /// Most recently created first.
  async fn list_all(&self) -> Result<Vec<Scenario>>;
}

/// Open the configured adapter. The returned handle is the only connection the app uses.
pub async fn open(cfg: &StorageConfig) -> Result<Arc<dyn ScenarioStore>> {
  let store: Arc<dyn ScenarioStore> = match cfg.backend {
    StorageBackend::Memory => Arc::new(MemoryStore::new()),
    StorageBackend::Documents => Arc::new(DocumentStore::open(&cfg.path).await?),
    StorageBackend::Local => Arc::new(LocalFileStore::open(&cfg.path).await?),
  };
  info!(target: "debate_tutor", backend = store.backend(), path = %cfg.path.display(), "Scenario store opened");
  Ok(store)
}

pub(crate) fn sort_by_recency(scenarios: &mut [Scenario]) {
  scenarios.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Write through a sibling temp file so a crash never leaves half a document behind.
pub(crate) async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
  let bytes = serde_json::to_vec_pretty(value)
    .map_err(|source| StoreError::Serialization { path: path.to_path_buf(), source })?;
  let tmp = path.with_extension("json.tmp");
  tokio::fs::write(&tmp, &bytes)
    .await
    .map_err(|source| StoreError::Io { path: tmp.clone(), source })?;
  tokio::fs::rename(&tmp, path)
    .await
    .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })
}
