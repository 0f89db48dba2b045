use serde::{Deserialize, Serialize};

/// Lifecycle status of a workflow instance.
///
/// Transitions are driven by the engine: `Idle → Running`, then
/// `Running → {Suspended, Finished, Faulted, Cancelled}` and
/// `Suspended → Running` on resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
  Idle,
  Running,
  Suspended,
  Cancelled,
  Finished,
  Faulted,
}

impl std::fmt::Display for WorkflowStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      WorkflowStatus::Idle => "idle",
      WorkflowStatus::Running => "running",
      WorkflowStatus::Suspended => "suspended",
      WorkflowStatus::Cancelled => "cancelled",
      WorkflowStatus::Finished => "finished",
      WorkflowStatus::Faulted => "faulted",
    };
    f.write_str(s)
  }
}
