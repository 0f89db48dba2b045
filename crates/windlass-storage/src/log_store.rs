use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use windlass_workflow::ExecutionLogEntry;

use crate::StorageError;

/// Sink for execution-log entries.
///
/// The engine buffers entries during a run and appends them in one batch
/// when the top-level call returns.
#[async_trait]
pub trait ExecutionLogStore: Send + Sync {
  async fn append(&self, entries: &[ExecutionLogEntry]) -> Result<(), StorageError>;
}

/// In-memory log store, mainly for tests and the CLI.
#[derive(Clone, Default)]
pub struct MemoryExecutionLogStore {
  entries: Arc<RwLock<Vec<ExecutionLogEntry>>>,
}

impl MemoryExecutionLogStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot of everything appended so far.
  pub fn entries(&self) -> Vec<ExecutionLogEntry> {
    self.entries.read().map(|e| e.clone()).unwrap_or_default()
  }
}

#[async_trait]
impl ExecutionLogStore for MemoryExecutionLogStore {
  async fn append(&self, entries: &[ExecutionLogEntry]) -> Result<(), StorageError> {
    let mut store = self.entries.write().map_err(|_| StorageError::Backend {
      message: "log store lock poisoned".to_string(),
    })?;
    store.extend_from_slice(entries);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn append_accumulates_batches() {
    let store = MemoryExecutionLogStore::new();

    let first = vec![ExecutionLogEntry::new("instance-1", None, "started")];
    let second = vec![
      ExecutionLogEntry::new("instance-1", Some("a".to_string()), "executed"),
      ExecutionLogEntry::new("instance-1", None, "finished"),
    ];

    store.append(&first).await.unwrap();
    store.append(&second).await.unwrap();

    let entries = store.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].outcome, "started");
    assert_eq!(entries[2].outcome, "finished");
  }
}
