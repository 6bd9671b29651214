//! Document collection on disk: one JSON document per scenario.
//!
//! ```text
//! <root>/
//! ├── 3f0c...e1.json
//! └── 9a41...07.json
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use super::{sort_by_recency, write_json_atomic, Result, ScenarioStore, StoreError};
use crate::domain::{Scenario, ScenarioPatch};

pub struct DocumentStore {
  root: PathBuf,
  // Serializes read-modify-write on individual documents.
  lock: RwLock<()>,
}

/// Document ids become file names; anything else is simply not found.
fn is_valid_id(id: &str) -> bool {
  !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_not_found(e: &std::io::Error) -> bool {
  e.kind() == std::io::ErrorKind::NotFound
}

impl DocumentStore {
  /// Open (and create if needed) the collection directory.
  pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
    let root = root.as_ref().to_path_buf();
    tokio::fs::create_dir_all(&root)
      .await
      .map_err(|source| StoreError::Io { path: root.clone(), source })?;
    info!(target: "debate_tutor", root = %root.display(), "Document collection ready");
    Ok(Self { root, lock: RwLock::new(()) })
  }

  fn doc_path(&self, id: &str) -> PathBuf {
    self.root.join(format!("{id}.json"))
  }

  async fn read_doc(&self, path: &Path) -> Result<Option<Scenario>> {
    match tokio::fs::read(path).await {
      Ok(bytes) => serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StoreError::Serialization { path: path.to_path_buf(), source }),
      Err(e) if is_not_found(&e) => Ok(None),
      Err(source) => Err(StoreError::Io { path: path.to_path_buf(), source }),
    }
  }
}

#[async_trait]
impl ScenarioStore for DocumentStore {
  fn backend(&self) -> &'static str {
    "documents"
  }

  #[instrument(level = "debug", skip(self, scenario), fields(id = %scenario.id))]
  async fn create(&self, scenario: Scenario) -> Result<Scenario> {
    let _guard = self.lock.write().await;
    if !is_valid_id(&scenario.id) {
      return Err(StoreError::Io {
        path: self.doc_path(&scenario.id),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid document id"),
      });
    }
    let path = self.doc_path(&scenario.id);
    let exists = tokio::fs::try_exists(&path)
      .await
      .map_err(|source| StoreError::Io { path: path.clone(), source })?;
    if exists {
      return Err(StoreError::Duplicate(scenario.id));
    }
    write_json_atomic(&path, &scenario).await?;
    Ok(scenario)
  }

  async fn get_by_id(&self, id: &str) -> Result<Option<Scenario>> {
    if !is_valid_id(id) {
      return Ok(None);
    }
    let _guard = self.lock.read().await;
    self.read_doc(&self.doc_path(id)).await
  }

  #[instrument(level = "debug", skip(self, patch), fields(%id))]
  async fn update(&self, id: &str, patch: ScenarioPatch) -> Result<Option<Scenario>> {
    if !is_valid_id(id) {
      return Ok(None);
    }
    let _guard = self.lock.write().await;
    let path = self.doc_path(id);
    let Some(mut scenario) = self.read_doc(&path).await? else {
      return Ok(None);
    };
    scenario.apply(patch, Utc::now());
    write_json_atomic(&path, &scenario).await?;
    Ok(Some(scenario))
  }

  async fn delete(&self, id: &str) -> Result<bool> {
    if !is_valid_id(id) {
      return Ok(false);
    }
    let _guard = self.lock.write().await;
    let path = self.doc_path(id);
    match tokio::fs::remove_file(&path).await {
      Ok(()) => Ok(true),
      Err(e) if is_not_found(&e) => Ok(false),
      Err(source) => Err(StoreError::Io { path, source }),
    }
  }

  async fn list_all(&self) -> Result<Vec<Scenario>> {
    let _guard = self.lock.read().await;
    let mut entries = tokio::fs::read_dir(&self.root)
      .await
      .map_err(|source| StoreError::Io { path: self.root.clone(), source })?;

    let mut all = Vec::new();
    while let Some(entry) = entries
      .next_entry()
      .await
      .map_err(|source| StoreError::Io { path: self.root.clone(), source })?
    {
      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }
      match self.read_doc(&path).await {
        Ok(Some(s)) => all.push(s),
        Ok(None) => {}
        Err(e) => warn!(target: "scenario", path = %path.display(), error = %e, "Skipping unreadable scenario document"),
      }
    }
    sort_by_recency(&mut all);
    Ok(all)
  }
}
