use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use windlass_storage::StorageService;
use windlass_workflow::{
  ExecutionLogEntry, ScheduledActivity, WorkflowBlueprint, WorkflowFault, WorkflowInstance,
  WorkflowStatus,
};

/// Per-run mutable state for one top-level engine invocation.
///
/// Created once per invocation and discarded at its end; never shared
/// across concurrent invocations. The context borrows the caller's
/// instance exclusively for the call, owns the scheduled-activity stack,
/// and buffers execution-log entries until the runner flushes them.
pub struct ExecutionContext<'i> {
  blueprint: Arc<WorkflowBlueprint>,
  instance: &'i mut WorkflowInstance,
  scheduled: Vec<ScheduledActivity>,
  /// Input payload carried into this call, consumed by the first pass.
  input: Option<serde_json::Value>,
  /// Application-scoped context object loaded by the context manager.
  workflow_context: Option<serde_json::Value>,
  log: Vec<ExecutionLogEntry>,
  storage: StorageService,
  cancel: CancellationToken,
}

impl<'i> ExecutionContext<'i> {
  pub fn new(
    blueprint: Arc<WorkflowBlueprint>,
    instance: &'i mut WorkflowInstance,
    input: Option<serde_json::Value>,
    storage: StorageService,
    cancel: CancellationToken,
  ) -> Self {
    Self {
      blueprint,
      instance,
      scheduled: Vec::new(),
      input,
      workflow_context: None,
      log: Vec::new(),
      storage,
      cancel,
    }
  }

  pub fn blueprint(&self) -> &Arc<WorkflowBlueprint> {
    &self.blueprint
  }

  pub fn instance(&self) -> &WorkflowInstance {
    self.instance
  }

  pub fn instance_mut(&mut self) -> &mut WorkflowInstance {
    self.instance
  }

  pub fn status(&self) -> WorkflowStatus {
    self.instance.status
  }

  pub fn input(&self) -> Option<&serde_json::Value> {
    self.input.as_ref()
  }

  pub fn workflow_context(&self) -> Option<&serde_json::Value> {
    self.workflow_context.as_ref()
  }

  pub fn set_workflow_context(&mut self, context: Option<serde_json::Value>) {
    self.workflow_context = context;
  }

  pub fn storage(&self) -> &StorageService {
    &self.storage
  }

  pub fn cancellation(&self) -> &CancellationToken {
    &self.cancel
  }

  // --- scheduled-activity stack -------------------------------------------

  /// Push onto the LIFO stack. The same activity id may appear multiple
  /// times; loops are legal.
  pub fn schedule_activity(&mut self, scheduled: ScheduledActivity) {
    self.scheduled.push(scheduled);
  }

  /// Pop the most recently scheduled activity.
  pub fn pop_scheduled_activity(&mut self) -> Option<ScheduledActivity> {
    self.scheduled.pop()
  }

  pub fn has_scheduled_activities(&self) -> bool {
    !self.scheduled.is_empty()
  }

  // --- blocking set -------------------------------------------------------

  pub fn add_blocking_activity(&mut self, activity_id: &str) {
    self
      .instance
      .blocking_activities
      .push(windlass_workflow::BlockingActivity::new(activity_id));
  }

  /// Remove every blocking entry matching the id; a single external
  /// trigger satisfies all identical registrations.
  pub fn remove_blocking_activities(&mut self, activity_id: &str) {
    self
      .instance
      .blocking_activities
      .retain(|b| b.activity_id != activity_id);
  }

  pub fn has_blocking_activities(&self) -> bool {
    !self.instance.blocking_activities.is_empty()
  }

  // --- status transitions -------------------------------------------------

  /// Idle → Running.
  pub fn begin(&mut self) {
    self.instance.status = WorkflowStatus::Running;
    self.add_entry(None, "started", None);
  }

  /// Suspended → Running.
  pub fn resume(&mut self) {
    self.instance.status = WorkflowStatus::Running;
    self.add_entry(None, "resumed", None);
  }

  /// Running → Suspended. A suspended run keeps at least one blocking
  /// activity; callers check before transitioning.
  pub fn suspend(&mut self) {
    self.instance.status = WorkflowStatus::Suspended;
    self.add_entry(None, "suspended", None);
  }

  /// Running → Finished.
  pub fn complete(&mut self) {
    self.instance.status = WorkflowStatus::Finished;
    self.instance.finished_at = Some(Utc::now());
    self.add_entry(None, "finished", None);
  }

  /// Observed external cancellation.
  pub fn cancel_run(&mut self) {
    self.instance.status = WorkflowStatus::Cancelled;
    self.add_entry(None, "cancelled", None);
  }

  /// Record a run-level fault and transition to Faulted.
  pub fn fault(&mut self, message: String, activity_id: Option<String>, resuming: bool) {
    let fault = WorkflowFault {
      message,
      faulted_activity_id: activity_id.clone(),
      resuming,
    };
    self.instance.status = WorkflowStatus::Faulted;
    self.instance.faulted_at = Some(Utc::now());
    self.instance.fault = Some(fault.clone());
    self.log.push(
      ExecutionLogEntry::new(self.instance.instance_id.as_str(), activity_id, "faulted")
        .with_fault(fault),
    );
  }

  /// Mark the current pass complete: the in-flight marker is cleared so a
  /// crash between passes does not re-run a finished activity.
  pub fn complete_pass(&mut self) {
    self.instance.current_activity = None;
  }

  // --- log ----------------------------------------------------------------

  pub fn add_entry(&mut self, activity_id: Option<String>, outcome: &str, message: Option<String>) {
    let mut entry = ExecutionLogEntry::new(self.instance.instance_id.as_str(), activity_id, outcome);
    if let Some(message) = message {
      entry = entry.with_message(message);
    }
    self.log.push(entry);
  }

  /// Drain the buffered log entries for flushing.
  pub fn take_log(&mut self) -> Vec<ExecutionLogEntry> {
    std::mem::take(&mut self.log)
  }

  // --- blueprint helpers --------------------------------------------------

  /// Build scheduled entries for the targets of an activity's outbound
  /// connections with the given outcome, in connection order.
  pub fn outbound_activities(&self, activity_id: &str, outcome: &str) -> Vec<ScheduledActivity> {
    self
      .blueprint
      .graph()
      .targets_for_outcome(activity_id, outcome)
      .into_iter()
      .map(ScheduledActivity::new)
      .collect()
  }
}
