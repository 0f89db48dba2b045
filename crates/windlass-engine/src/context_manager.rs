use async_trait::async_trait;
use windlass_workflow::WorkflowInstance;

use crate::error::EngineError;

/// Loads the application-scoped context object correlated with an
/// instance's `context_id`, before dispatch starts.
#[async_trait]
pub trait WorkflowContextManager: Send + Sync {
  async fn load_context(
    &self,
    context_id: &str,
    instance: &WorkflowInstance,
  ) -> Result<Option<serde_json::Value>, EngineError>;
}

/// Default manager for deployments without workflow-scoped context.
pub struct NoopContextManager;

#[async_trait]
impl WorkflowContextManager for NoopContextManager {
  async fn load_context(
    &self,
    _context_id: &str,
    _instance: &WorkflowInstance,
  ) -> Result<Option<serde_json::Value>, EngineError> {
    Ok(None)
  }
}
