use serde::{Deserialize, Serialize};
use windlass_workflow::{WorkflowFault, WorkflowStatus};

/// Events emitted during a top-level engine invocation.
///
/// The order within one invocation is fixed: `InputUpdated?`,
/// `WorkflowExecuting`, the per-pass activity events, `WorkflowExecuted`,
/// zero or more status-specific terminal events, `ExecutionFinished`.
/// Within one pass: `ActivityActivating`, `BurstStarting` (first pass
/// only), `ActivityResuming` (resume mode only), `ActivityExecuting`,
/// then either `ActivityExecuted` → `ActivityResultExecuting` →
/// `ActivityResultExecuted` → `PassCompleted` (→ `BurstCompleted` when
/// the stack drains) or the failure pair `ActivityFaulted` →
/// `ActivityResultFailed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowEvent {
  /// The run input was persisted and the instance's input reference
  /// replaced.
  InputUpdated { instance_id: String },

  /// Dispatch is about to begin.
  WorkflowExecuting {
    instance_id: String,
    status: WorkflowStatus,
  },

  /// Dispatch returned; status reflects the outcome of the call.
  WorkflowExecuted {
    instance_id: String,
    status: WorkflowStatus,
  },

  /// Terminal event: the run was cancelled.
  WorkflowCancelled { instance_id: String },

  /// Terminal event: the run completed with no blocking activities left.
  WorkflowCompleted { instance_id: String },

  /// Terminal event: the run faulted.
  WorkflowFaulted {
    instance_id: String,
    fault: WorkflowFault,
  },

  /// Terminal event: the run suspended awaiting external stimulus.
  WorkflowSuspended {
    instance_id: String,
    blocking_activity_ids: Vec<String>,
  },

  /// Always the last event of an invocation.
  ExecutionFinished { instance_id: String },

  /// An activity instance is being activated for a pass.
  ActivityActivating {
    instance_id: String,
    activity_id: String,
  },

  /// First activity dispatch of this invocation.
  BurstStarting {
    instance_id: String,
    activity_id: String,
  },

  /// The scheduled-activity stack drained.
  BurstCompleted {
    instance_id: String,
    activity_id: String,
  },

  /// The first pass of a resume-mode invocation.
  ActivityResuming {
    instance_id: String,
    activity_id: String,
  },

  ActivityExecuting {
    instance_id: String,
    activity_id: String,
  },

  ActivityExecuted {
    instance_id: String,
    activity_id: String,
  },

  /// The activity's result is about to be applied to the run state.
  ActivityResultExecuting {
    instance_id: String,
    activity_id: String,
  },

  ActivityResultExecuted {
    instance_id: String,
    activity_id: String,
  },

  /// One full dispatch-and-apply cycle completed.
  PassCompleted {
    instance_id: String,
    activity_id: String,
  },

  /// The pass failed after the activity boundary; the burst stops here.
  ActivityResultFailed {
    instance_id: String,
    activity_id: String,
    error: String,
  },

  /// The activity's own execute/resume operation failed.
  ActivityFaulted {
    instance_id: String,
    activity_id: String,
    error: String,
  },
}

impl WorkflowEvent {
  /// Instance the event belongs to.
  pub fn instance_id(&self) -> &str {
    match self {
      WorkflowEvent::InputUpdated { instance_id }
      | WorkflowEvent::WorkflowExecuting { instance_id, .. }
      | WorkflowEvent::WorkflowExecuted { instance_id, .. }
      | WorkflowEvent::WorkflowCancelled { instance_id }
      | WorkflowEvent::WorkflowCompleted { instance_id }
      | WorkflowEvent::WorkflowFaulted { instance_id, .. }
      | WorkflowEvent::WorkflowSuspended { instance_id, .. }
      | WorkflowEvent::ExecutionFinished { instance_id }
      | WorkflowEvent::ActivityActivating { instance_id, .. }
      | WorkflowEvent::BurstStarting { instance_id, .. }
      | WorkflowEvent::BurstCompleted { instance_id, .. }
      | WorkflowEvent::ActivityResuming { instance_id, .. }
      | WorkflowEvent::ActivityExecuting { instance_id, .. }
      | WorkflowEvent::ActivityExecuted { instance_id, .. }
      | WorkflowEvent::ActivityResultExecuting { instance_id, .. }
      | WorkflowEvent::ActivityResultExecuted { instance_id, .. }
      | WorkflowEvent::PassCompleted { instance_id, .. }
      | WorkflowEvent::ActivityResultFailed { instance_id, .. }
      | WorkflowEvent::ActivityFaulted { instance_id, .. } => instance_id,
    }
  }

  /// Short name for logging.
  pub fn name(&self) -> &'static str {
    match self {
      WorkflowEvent::InputUpdated { .. } => "input_updated",
      WorkflowEvent::WorkflowExecuting { .. } => "workflow_executing",
      WorkflowEvent::WorkflowExecuted { .. } => "workflow_executed",
      WorkflowEvent::WorkflowCancelled { .. } => "workflow_cancelled",
      WorkflowEvent::WorkflowCompleted { .. } => "workflow_completed",
      WorkflowEvent::WorkflowFaulted { .. } => "workflow_faulted",
      WorkflowEvent::WorkflowSuspended { .. } => "workflow_suspended",
      WorkflowEvent::ExecutionFinished { .. } => "execution_finished",
      WorkflowEvent::ActivityActivating { .. } => "activity_activating",
      WorkflowEvent::BurstStarting { .. } => "burst_starting",
      WorkflowEvent::BurstCompleted { .. } => "burst_completed",
      WorkflowEvent::ActivityResuming { .. } => "activity_resuming",
      WorkflowEvent::ActivityExecuting { .. } => "activity_executing",
      WorkflowEvent::ActivityExecuted { .. } => "activity_executed",
      WorkflowEvent::ActivityResultExecuting { .. } => "activity_result_executing",
      WorkflowEvent::ActivityResultExecuted { .. } => "activity_result_executed",
      WorkflowEvent::PassCompleted { .. } => "pass_completed",
      WorkflowEvent::ActivityResultFailed { .. } => "activity_result_failed",
      WorkflowEvent::ActivityFaulted { .. } => "activity_faulted",
    }
  }
}
