//! In-process scenario store. Default backend and the one router tests use.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{sort_by_recency, Result, ScenarioStore, StoreError};
use crate::domain::{Scenario, ScenarioPatch};

#[derive(Default)]
pub struct MemoryStore {
  by_id: RwLock<HashMap<String, Scenario>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ScenarioStore for MemoryStore {
  fn backend(&self) -> &'static str {
    "memory"
  }

  #[instrument(level = "debug", skip(self, scenario), fields(id = %scenario.id))]
  async fn create(&self, scenario: Scenario) -> Result<Scenario> {
    let mut by_id = self.by_id.write().await;
    if by_id.contains_key(&scenario.id) {
      return Err(StoreError::Duplicate(scenario.id));
    }
    by_id.insert(scenario.id.clone(), scenario.clone());
    debug!(target: "scenario", count = by_id.len(), "Scenario stored in memory");
    Ok(scenario)
  }

  async fn get_by_id(&self, id: &str) -> Result<Option<Scenario>> {
    Ok(self.by_id.read().await.get(id).cloned())
  }

  #[instrument(level = "debug", skip(self, patch), fields(%id))]
  async fn update(&self, id: &str, patch: ScenarioPatch) -> Result<Option<Scenario>> {
    let mut by_id = self.by_id.write().await;
    Ok(by_id.get_mut(id).map(|s| {
      s.apply(patch, Utc::now());
      s.clone()
    }))
  }

  async fn delete(&self, id: &str) -> Result<bool> {
    Ok(self.by_id.write().await.remove(id).is_some())
  }

  async fn list_all(&self) -> Result<Vec<Scenario>> {
    let mut all: Vec<Scenario> = self.by_id.read().await.values().cloned().collect();
    sort_by_recency(&mut all);
    Ok(all)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::test_support::{at, exercise_store, scenario};

  #[tokio::test]
  async fn satisfies_store_contract() {
    exercise_store(&MemoryStore::new()).await;
  }

  #[tokio::test]
  async fn rejects_duplicate_ids() {
    let store = MemoryStore::new();
    store.create(scenario("a", at(0))).await.unwrap();
    let err = store.create(scenario("a", at(1))).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(id) if id == "a"));
  }
}
