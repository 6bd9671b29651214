//! Single-file store holding every scenario in one JSON array.
//!
//! This is the server-side twin of the browser's `scenarios` local-storage entry:
//! the whole list is read, changed and written back on every mutation. A file that
//! does not parse reads as an empty list, the same way the browser client treats
//! a corrupt entry.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use super::{sort_by_recency, write_json_atomic, Result, ScenarioStore, StoreError};
use crate::domain::{Scenario, ScenarioPatch};

pub struct LocalFileStore {
  path: PathBuf,
  lock: RwLock<()>,
}

impl LocalFileStore {
  /// `path` may be a directory, in which case `scenarios.json` inside it is used.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let mut path = path.as_ref().to_path_buf();
    if path.extension().is_none() {
      tokio::fs::create_dir_all(&path)
        .await
        .map_err(|source| StoreError::Io { path: path.clone(), source })?;
      path = path.join("scenarios.json");
    } else if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
    }
    info!(target: "debate_tutor", path = %path.display(), "Local scenario file ready");
    Ok(Self { path, lock: RwLock::new(()) })
  }

  async fn load(&self) -> Result<Vec<Scenario>> {
    let bytes = match tokio::fs::read(&self.path).await {
      Ok(b) => b,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(source) => return Err(StoreError::Io { path: self.path.clone(), source }),
    };
    match serde_json::from_slice::<Vec<Scenario>>(&bytes) {
      Ok(list) => Ok(list),
      Err(e) => {
        error!(target: "scenario", path = %self.path.display(), error = %e, "Failed to parse saved scenarios; treating as empty");
        Ok(Vec::new())
      }
    }
  }

  async fn save(&self, list: &[Scenario]) -> Result<()> {
    write_json_atomic(&self.path, list).await
  }
}

#[async_trait]
impl ScenarioStore for LocalFileStore {
  fn backend(&self) -> &'static str {
    "local"
  }

  #[instrument(level = "debug", skip(self, scenario), fields(id = %scenario.id))]
  async fn create(&self, scenario: Scenario) -> Result<Scenario> {
    let _guard = self.lock.write().await;
    let mut list = self.load().await?;
    if list.iter().any(|s| s.id == scenario.id) {
      return Err(StoreError::Duplicate(scenario.id));
    }
    list.push(scenario.clone());
    self.save(&list).await?;
    Ok(scenario)
  }

  async fn get_by_id(&self, id: &str) -> Result<Option<Scenario>> {
    let _guard = self.lock.read().await;
    Ok(self.load().await?.into_iter().find(|s| s.id == id))
  }

  #[instrument(level = "debug", skip(self, patch), fields(%id))]
  async fn update(&self, id: &str, patch: ScenarioPatch) -> Result<Option<Scenario>> {
    let _guard = self.lock.write().await;
    let mut list = self.load().await?;
    let Some(slot) = list.iter_mut().find(|s| s.id == id) else {
      return Ok(None);
    };
    slot.apply(patch, Utc::now());
    let updated = slot.clone();
    self.save(&list).await?;
    Ok(Some(updated))
  }

  async fn delete(&self, id: &str) -> Result<bool> {
    let _guard = self.lock.write().await;
    let mut list = self.load().await?;
    let before = list.len();
    list.retain(|s| s.id != id);
    if list.len() == before {
      return Ok(false);
    }
    self.save(&list).await?;
    Ok(true)
  }

  async fn list_all(&self) -> Result<Vec<Scenario>> {
    let _guard = self.lock.read().await;
    let mut list = self.load().await?;
    sort_by_recency(&mut list);
    Ok(list)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::test_support::{at, exercise_store, scenario};
  use tempfile::TempDir;

  #[tokio::test]
  async fn satisfies_store_contract() {
    let dir = TempDir::new().unwrap();
    let store = LocalFileStore::open(dir.path().join("local")).await.unwrap();
    exercise_store(&store).await;
  }

  #[tokio::test]
  async fn whole_list_lives_in_one_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data/scenarios.json");
    let store = LocalFileStore::open(&file).await.unwrap();
    store.create(scenario("a", at(0))).await.unwrap();
    store.create(scenario("b", at(1))).await.unwrap();

    let raw: serde_json::Value = serde_json::from_slice(&std::fs::read(&file).unwrap()).unwrap();
    assert_eq!(raw.as_array().map(Vec::len), Some(2));

    let reopened = LocalFileStore::open(&file).await.unwrap();
    assert_eq!(reopened.list_all().await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn corrupt_file_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("scenarios.json");
    std::fs::write(&file, "not json at all").unwrap();
    let store = LocalFileStore::open(&file).await.unwrap();
    assert!(store.list_all().await.unwrap().is_empty());
    store.create(scenario("fresh", at(0))).await.unwrap();
    assert_eq!(store.list_all().await.unwrap().len(), 1);
  }
}
