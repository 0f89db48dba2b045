use windlass_workflow::ScheduledActivity;

use crate::activity_context::ActivityExecutionContext;

/// Outcome of one activity pass, applied against the execution context.
///
/// `apply` is the only place an activity's result mutates the scheduled
/// stack or the blocking set.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityResult {
  /// Schedule follow-up activities. Entries are pushed onto the LIFO
  /// stack in order, so the last entry listed here is dispatched first.
  Schedule(Vec<ScheduledActivity>),

  /// Park the current activity until an external trigger resumes it by
  /// id.
  Block,

  /// Terminal branch: nothing further to schedule.
  Noop,
}

impl ActivityResult {
  /// Convenience constructor scheduling a single activity.
  pub fn schedule_one(activity_id: impl Into<String>) -> Self {
    Self::Schedule(vec![ScheduledActivity::new(activity_id)])
  }

  /// Apply this result's side effects to the run state.
  pub fn apply(&self, ctx: &mut ActivityExecutionContext<'_, '_>) {
    match self {
      ActivityResult::Schedule(activities) => {
        for scheduled in activities {
          ctx.execution_mut().schedule_activity(scheduled.clone());
        }
      }
      ActivityResult::Block => {
        let activity_id = ctx.activity().activity_id.clone();
        ctx.execution_mut().add_blocking_activity(&activity_id);
      }
      ActivityResult::Noop => {}
    }
  }
}

/// Result of a top-level [`crate::WorkflowRunner::run_workflow`] call.
///
/// The instance itself is mutated in place through the caller's exclusive
/// reference. `executed = false` signals that no state change occurred
/// (vetoed, inapplicable resume target, or inapplicable idle-begin); a
/// faulted run instead reports `executed` according to whatever progress
/// happened before the fault.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
  /// Effective target activity of the call, when one was determined.
  pub activity_id: Option<String>,
  pub executed: bool,
}

impl RunResult {
  pub fn new(activity_id: Option<String>, executed: bool) -> Self {
    Self {
      activity_id,
      executed,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use tokio_util::sync::CancellationToken;
  use windlass_storage::StorageService;
  use windlass_workflow::{ActivityBlueprint, WorkflowBlueprint, WorkflowInstance};

  use super::*;
  use crate::context::ExecutionContext;

  fn blueprint() -> Arc<WorkflowBlueprint> {
    Arc::new(WorkflowBlueprint {
      blueprint_id: "wf".to_string(),
      version: 1,
      name: "test".to_string(),
      activities: vec![ActivityBlueprint::new("a", "noop")],
      connections: vec![],
    })
  }

  #[test]
  fn schedule_pushes_in_listed_order() {
    let mut instance = WorkflowInstance::new("wf");
    let mut ctx = ExecutionContext::new(
      blueprint(),
      &mut instance,
      None,
      StorageService::new(),
      CancellationToken::new(),
    );
    let mut actx =
      ActivityExecutionContext::new(&mut ctx, ActivityBlueprint::new("a", "noop"), None, false);

    ActivityResult::Schedule(vec![
      ScheduledActivity::new("x"),
      ScheduledActivity::new("y"),
    ])
    .apply(&mut actx);

    // The last listed entry pops first.
    assert_eq!(ctx.pop_scheduled_activity().unwrap().activity_id, "y");
    assert_eq!(ctx.pop_scheduled_activity().unwrap().activity_id, "x");
  }

  #[test]
  fn block_registers_the_current_activity() {
    let mut instance = WorkflowInstance::new("wf");
    let mut ctx = ExecutionContext::new(
      blueprint(),
      &mut instance,
      None,
      StorageService::new(),
      CancellationToken::new(),
    );
    let mut actx =
      ActivityExecutionContext::new(&mut ctx, ActivityBlueprint::new("a", "noop"), None, false);

    ActivityResult::Block.apply(&mut actx);

    assert!(instance.is_blocking("a"));
  }

  #[test]
  fn noop_leaves_run_state_untouched() {
    let mut instance = WorkflowInstance::new("wf");
    let mut ctx = ExecutionContext::new(
      blueprint(),
      &mut instance,
      None,
      StorageService::new(),
      CancellationToken::new(),
    );
    let mut actx =
      ActivityExecutionContext::new(&mut ctx, ActivityBlueprint::new("a", "noop"), None, false);

    ActivityResult::Noop.apply(&mut actx);

    assert!(!ctx.has_scheduled_activities());
    assert!(!ctx.has_blocking_activities());
  }

  #[test]
  fn schedule_one_targets_a_single_activity() {
    let result = ActivityResult::schedule_one("b");
    assert_eq!(
      result,
      ActivityResult::Schedule(vec![ScheduledActivity::new("b")])
    );
  }
}
