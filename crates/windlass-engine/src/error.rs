//! Engine error types.

use thiserror::Error;
use windlass_events::EventError;
use windlass_storage::StorageError;
use windlass_workflow::WorkflowStatus;

use crate::activity::ActivityError;

/// Errors that can occur while driving a workflow instance.
///
/// Everything except [`EngineError::InvalidStatus`] is contained by the
/// run-level fault handler: the instance transitions to `Faulted` and the
/// top-level call still returns a `RunResult`. `InvalidStatus` is a
/// programming-logic error and is raised to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
  /// The instance's status matches none of the known transitions.
  #[error("instance '{instance_id}' cannot be executed from status '{status}'")]
  InvalidStatus {
    instance_id: String,
    status: WorkflowStatus,
  },

  /// A scheduled or targeted activity id is not in the blueprint.
  #[error("activity not found in blueprint: {0}")]
  ActivityNotFound(String),

  /// The activity runtime has no type registered for a blueprint
  /// activity.
  #[error("no activity type registered for '{0}'")]
  UnknownActivityType(String),

  /// An activity's own operation failed.
  #[error("activity '{activity_id}' failed: {source}")]
  Activity {
    activity_id: String,
    #[source]
    source: ActivityError,
  },

  /// A storage provider call failed.
  #[error(transparent)]
  Storage(#[from] StorageError),

  /// An event handler failed.
  #[error(transparent)]
  Event(#[from] EventError),

  /// The workflow context manager failed to load the scoped context.
  #[error("workflow context load failed: {message}")]
  Context { message: String },
}
