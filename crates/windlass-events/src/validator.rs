use async_trait::async_trait;
use windlass_workflow::WorkflowInstance;

/// Admission observers: any validator may veto a run or a single activity
/// before it executes (authorization, rate limiting, maintenance windows).
///
/// Validators are consulted in registration order; the first veto wins and
/// short-circuits the rest. Both checks default to allowing execution.
#[async_trait]
pub trait ExecutionValidator: Send + Sync {
  /// Veto point before any dispatch for a top-level call.
  async fn validate_run(&self, _instance: &WorkflowInstance, _activity_id: Option<&str>) -> bool {
    true
  }

  /// Veto point for one activity's admission check, after the activity
  /// type itself agreed to run.
  async fn validate_activity(
    &self,
    _instance: &WorkflowInstance,
    _activity_id: &str,
    _resuming: bool,
  ) -> bool {
    true
  }
}
