use async_trait::async_trait;

use crate::StorageError;

/// Addressing scope for stored payloads.
///
/// `owner_id` is the blueprint id for workflow-level keys (the run input)
/// or an activity id for per-activity output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageContext {
  pub instance_id: String,
  pub owner_id: String,
}

impl StorageContext {
  pub fn new(instance_id: impl Into<String>, owner_id: impl Into<String>) -> Self {
    Self {
      instance_id: instance_id.into(),
      owner_id: owner_id.into(),
    }
  }
}

/// Keyed load/save of named payloads against a storage context.
///
/// Implementations decide where the bytes live (memory, database, blob
/// store). The engine only ever addresses payloads through references.
#[async_trait]
pub trait StorageProvider: Send + Sync {
  /// Registry name of this provider.
  fn name(&self) -> &str;

  async fn save(
    &self,
    context: &StorageContext,
    key: &str,
    value: serde_json::Value,
  ) -> Result<(), StorageError>;

  async fn load(
    &self,
    context: &StorageContext,
    key: &str,
  ) -> Result<Option<serde_json::Value>, StorageError>;

  async fn delete(&self, context: &StorageContext, key: &str) -> Result<(), StorageError>;
}
