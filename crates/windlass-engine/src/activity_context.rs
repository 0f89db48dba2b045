use windlass_storage::StorageContext;
use windlass_workflow::{ActivityBlueprint, OutputReference};

use crate::activity::ActivityError;
use crate::context::ExecutionContext;

/// Per-activity scope for a single dispatch.
///
/// Built fresh for every pop from the scheduled-activity stack (and once
/// more, transiently, for the admission check) and discarded as soon as
/// the activity's result has been applied.
pub struct ActivityExecutionContext<'e, 'i> {
  execution: &'e mut ExecutionContext<'i>,
  activity: ActivityBlueprint,
  input: Option<serde_json::Value>,
  resuming: bool,
  faulted: bool,
}

impl<'e, 'i> ActivityExecutionContext<'e, 'i> {
  pub fn new(
    execution: &'e mut ExecutionContext<'i>,
    activity: ActivityBlueprint,
    input: Option<serde_json::Value>,
    resuming: bool,
  ) -> Self {
    Self {
      execution,
      activity,
      input,
      resuming,
      faulted: false,
    }
  }

  pub fn execution(&self) -> &ExecutionContext<'i> {
    self.execution
  }

  pub fn execution_mut(&mut self) -> &mut ExecutionContext<'i> {
    self.execution
  }

  /// Blueprint of the activity this pass dispatches.
  pub fn activity(&self) -> &ActivityBlueprint {
    &self.activity
  }

  /// Input resolved for this pass: the call input on the first pass,
  /// otherwise the scheduled entry's explicit input or the previous
  /// activity's persisted output.
  pub fn input(&self) -> Option<&serde_json::Value> {
    self.input.as_ref()
  }

  /// Whether this pass resumes a previously blocking activity.
  pub fn resuming(&self) -> bool {
    self.resuming
  }

  /// Shortcut into the activity blueprint's configuration properties.
  pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
    self.activity.property(name)
  }

  /// Mark this activity's scope as faulted. The enclosing run decides the
  /// instance-level status.
  pub fn set_faulted(&mut self) {
    self.faulted = true;
  }

  pub fn faulted(&self) -> bool {
    self.faulted
  }

  /// Persist this activity's output and point the instance's output
  /// reference at it. Subsequent passes without an explicit input read it
  /// back through the reference.
  pub async fn set_output(&mut self, payload: serde_json::Value) -> Result<(), ActivityError> {
    let instance_id = self.execution.instance().instance_id.clone();
    let activity_id = self.activity.activity_id.clone();
    let context = StorageContext::new(instance_id, activity_id.clone());

    let provider = self
      .execution
      .storage()
      .save(None, &context, "output", payload)
      .await?;

    self.execution.instance_mut().output = Some(OutputReference::new(provider, activity_id));
    Ok(())
  }
}
