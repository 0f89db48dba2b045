use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::provider::{StorageContext, StorageProvider};
use crate::{DEFAULT_PROVIDER, StorageError};

type Key = (StorageContext, String);

/// In-memory storage provider.
///
/// Payloads live in a shared map for the lifetime of the process. Useful
/// for tests and single-process deployments; anything durable should sit
/// behind its own [`StorageProvider`] implementation.
#[derive(Clone)]
pub struct MemoryStorageProvider {
  name: String,
  entries: Arc<RwLock<HashMap<Key, serde_json::Value>>>,
}

impl MemoryStorageProvider {
  /// Create a provider registered under the default provider name.
  pub fn new() -> Self {
    Self::with_name(DEFAULT_PROVIDER)
  }

  /// Create a provider with a custom registry name.
  pub fn with_name(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      entries: Arc::new(RwLock::new(HashMap::new())),
    }
  }
}

impl Default for MemoryStorageProvider {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
  fn name(&self) -> &str {
    &self.name
  }

  async fn save(
    &self,
    context: &StorageContext,
    key: &str,
    value: serde_json::Value,
  ) -> Result<(), StorageError> {
    let mut entries = self.entries.write().map_err(|_| StorageError::Backend {
      message: "storage lock poisoned".to_string(),
    })?;
    entries.insert((context.clone(), key.to_string()), value);
    Ok(())
  }

  async fn load(
    &self,
    context: &StorageContext,
    key: &str,
  ) -> Result<Option<serde_json::Value>, StorageError> {
    let entries = self.entries.read().map_err(|_| StorageError::Backend {
      message: "storage lock poisoned".to_string(),
    })?;
    Ok(entries.get(&(context.clone(), key.to_string())).cloned())
  }

  async fn delete(&self, context: &StorageContext, key: &str) -> Result<(), StorageError> {
    let mut entries = self.entries.write().map_err(|_| StorageError::Backend {
      message: "storage lock poisoned".to_string(),
    })?;
    entries.remove(&(context.clone(), key.to_string()));
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[tokio::test]
  async fn save_then_load_round_trips() {
    let provider = MemoryStorageProvider::new();
    let context = StorageContext::new("instance-1", "wf-1");

    provider
      .save(&context, "input", json!({"answer": 42}))
      .await
      .unwrap();

    let loaded = provider.load(&context, "input").await.unwrap();
    assert_eq!(loaded, Some(json!({"answer": 42})));
  }

  #[tokio::test]
  async fn load_missing_key_is_none() {
    let provider = MemoryStorageProvider::new();
    let context = StorageContext::new("instance-1", "wf-1");
    assert_eq!(provider.load(&context, "nothing").await.unwrap(), None);
  }

  #[tokio::test]
  async fn contexts_do_not_collide() {
    let provider = MemoryStorageProvider::new();
    let a = StorageContext::new("instance-1", "activity-a");
    let b = StorageContext::new("instance-1", "activity-b");

    provider.save(&a, "output", json!(1)).await.unwrap();
    assert_eq!(provider.load(&b, "output").await.unwrap(), None);
  }

  #[tokio::test]
  async fn delete_removes_entry() {
    let provider = MemoryStorageProvider::new();
    let context = StorageContext::new("instance-1", "wf-1");

    provider.save(&context, "input", json!(true)).await.unwrap();
    provider.delete(&context, "input").await.unwrap();
    assert_eq!(provider.load(&context, "input").await.unwrap(), None);
  }
}
