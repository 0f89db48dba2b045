//! The workflow runner: terminal-state dispatch and the scheduling loop.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use windlass_events::{EventBus, EventHandler, ExecutionValidator, WorkflowEvent};
use windlass_storage::{
  ExecutionLogStore, MemoryExecutionLogStore, MemoryStorageProvider, StorageContext,
  StorageService,
};
use windlass_workflow::{
  ActivityBlueprint, InputReference, ScheduledActivity, WorkflowBlueprint, WorkflowInput,
  WorkflowInstance, WorkflowStatus, start_activities,
};

use crate::activity::ActivityResolver;
use crate::activity_context::ActivityExecutionContext;
use crate::context::ExecutionContext;
use crate::context_manager::{NoopContextManager, WorkflowContextManager};
use crate::error::EngineError;
use crate::result::RunResult;

/// Operation the scheduling loop invokes on the next popped activity.
/// Resume applies to the first pass of a resume-mode call only; every
/// later pass executes normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActivityOperation {
  Execute,
  Resume,
}

/// Builder for a [`WorkflowRunner`].
pub struct WorkflowRunnerBuilder {
  resolver: Arc<dyn ActivityResolver>,
  storage: Option<StorageService>,
  bus: EventBus,
  validators: Vec<Arc<dyn ExecutionValidator>>,
  context_manager: Option<Arc<dyn WorkflowContextManager>>,
  log_store: Option<Arc<dyn ExecutionLogStore>>,
}

impl WorkflowRunnerBuilder {
  pub fn new(resolver: Arc<dyn ActivityResolver>) -> Self {
    Self {
      resolver,
      storage: None,
      bus: EventBus::new(),
      validators: Vec::new(),
      context_manager: None,
      log_store: None,
    }
  }

  /// Replace the default storage service (a single in-memory provider).
  pub fn storage(mut self, storage: StorageService) -> Self {
    self.storage = Some(storage);
    self
  }

  /// Subscribe a lifecycle event handler; registration order is delivery
  /// order.
  pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
    self.bus.subscribe(handler);
    self
  }

  /// Register an admission observer; the first veto wins.
  pub fn validator(mut self, validator: Arc<dyn ExecutionValidator>) -> Self {
    self.validators.push(validator);
    self
  }

  pub fn context_manager(mut self, manager: Arc<dyn WorkflowContextManager>) -> Self {
    self.context_manager = Some(manager);
    self
  }

  pub fn log_store(mut self, store: Arc<dyn ExecutionLogStore>) -> Self {
    self.log_store = Some(store);
    self
  }

  pub fn build(self) -> WorkflowRunner {
    let storage = self.storage.unwrap_or_else(|| {
      let mut service = StorageService::new();
      service.register(Arc::new(MemoryStorageProvider::new()));
      service
    });

    WorkflowRunner {
      resolver: self.resolver,
      storage,
      bus: self.bus,
      validators: self.validators,
      context_manager: self
        .context_manager
        .unwrap_or_else(|| Arc::new(NoopContextManager)),
      log_store: self
        .log_store
        .unwrap_or_else(|| Arc::new(MemoryExecutionLogStore::new())),
    }
  }
}

/// Drives a workflow instance forward against a blueprint.
///
/// One runner serves any number of instances; every call gets its own
/// [`ExecutionContext`] and runs strictly sequentially. Concurrency comes
/// from running different instances' calls on separate tasks.
pub struct WorkflowRunner {
  resolver: Arc<dyn ActivityResolver>,
  storage: StorageService,
  bus: EventBus,
  validators: Vec<Arc<dyn ExecutionValidator>>,
  context_manager: Arc<dyn WorkflowContextManager>,
  log_store: Arc<dyn ExecutionLogStore>,
}

impl WorkflowRunner {
  /// Create a runner with default collaborators (in-memory storage and
  /// log store, no handlers, no validators).
  pub fn new(resolver: Arc<dyn ActivityResolver>) -> Self {
    Self::builder(resolver).build()
  }

  pub fn builder(resolver: Arc<dyn ActivityResolver>) -> WorkflowRunnerBuilder {
    WorkflowRunnerBuilder::new(resolver)
  }

  /// Run one top-level invocation against the instance.
  ///
  /// The instance is mutated in place; the caller persists it afterward.
  /// `activity_id` targets a specific activity (required to resume a
  /// suspended run); `input` is persisted through the storage service
  /// before any activity runs and is not undone on failure.
  ///
  /// Returns `Err` only for invalid-status programming errors; every
  /// runtime failure is contained as a `Faulted` instance inside a normal
  /// `RunResult`.
  #[instrument(
    name = "run_workflow",
    skip_all,
    fields(
      instance_id = %instance.instance_id,
      blueprint_id = %blueprint.blueprint_id,
    )
  )]
  pub async fn run_workflow(
    &self,
    blueprint: Arc<WorkflowBlueprint>,
    instance: &mut WorkflowInstance,
    activity_id: Option<&str>,
    input: Option<WorkflowInput>,
    cancel: CancellationToken,
  ) -> Result<RunResult, EngineError> {
    let call_input = match input {
      Some(input) => {
        let storage_context =
          StorageContext::new(instance.instance_id.as_str(), blueprint.blueprint_id.as_str());
        let provider = self
          .storage
          .save(
            input.provider_name.as_deref(),
            &storage_context,
            "input",
            input.payload.clone(),
          )
          .await?;
        instance.input = Some(InputReference::new(provider));
        self
          .bus
          .publish(&WorkflowEvent::InputUpdated {
            instance_id: instance.instance_id.clone(),
          })
          .await?;
        Some(input.payload)
      }
      None => None,
    };

    let mut ctx = ExecutionContext::new(
      blueprint,
      instance,
      call_input,
      self.storage.clone(),
      cancel,
    );
    let result = self.run_internal(&mut ctx, activity_id).await;

    let entries = ctx.take_log();
    if !entries.is_empty() {
      self.log_store.append(&entries).await?;
    }

    result
  }

  async fn run_internal(
    &self,
    ctx: &mut ExecutionContext<'_>,
    activity_id: Option<&str>,
  ) -> Result<RunResult, EngineError> {
    if let Some(context_id) = ctx.instance().context_id.clone() {
      let loaded = self
        .context_manager
        .load_context(&context_id, ctx.instance())
        .await?;
      ctx.set_workflow_context(loaded);
    }

    // A populated current_activity is a crash/retry marker; an explicit
    // target always wins over it.
    let activity_id: Option<String> = activity_id.map(str::to_string).or_else(|| {
      ctx
        .instance()
        .current_activity
        .as_ref()
        .map(|c| c.activity_id.clone())
    });

    let activity = activity_id
      .as_deref()
      .and_then(|id| ctx.blueprint().get_activity(id).cloned());

    // Give observers a chance to prevent the run entirely.
    for validator in &self.validators {
      if !validator
        .validate_run(ctx.instance(), activity_id.as_deref())
        .await
      {
        info!(
          instance_id = %ctx.instance().instance_id,
          "workflow_execution_vetoed"
        );
        return Ok(RunResult::new(activity_id, false));
      }
    }

    let instance_id = ctx.instance().instance_id.clone();

    match ctx.status() {
      WorkflowStatus::Finished | WorkflowStatus::Cancelled => {
        // Re-invoking a terminal instance is a no-op.
        info!(
          instance_id = %instance_id,
          status = %ctx.status(),
          "workflow_already_terminal"
        );
        return Ok(RunResult::new(activity_id, false));
      }
      WorkflowStatus::Faulted => {
        return Err(EngineError::InvalidStatus {
          instance_id,
          status: ctx.status(),
        });
      }
      _ => {}
    }

    self
      .bus
      .publish(&WorkflowEvent::WorkflowExecuting {
        instance_id: instance_id.clone(),
        status: ctx.status(),
      })
      .await?;

    let run_result = match ctx.status() {
      WorkflowStatus::Idle => {
        let result = self.begin_workflow(ctx, activity.as_ref()).await;

        if !result.executed && ctx.status() != WorkflowStatus::Faulted {
          info!(instance_id = %instance_id, "workflow_cannot_begin");
          return Ok(result);
        }

        result
      }
      WorkflowStatus::Running => {
        // Re-entrant call: simply continue the scheduling loop.
        self.run(ctx, ActivityOperation::Execute).await;
        RunResult::new(activity_id, true)
      }
      WorkflowStatus::Suspended => {
        let target = activity
          .filter(|a| ctx.instance().is_blocking(&a.activity_id));

        let Some(target) = target else {
          info!(instance_id = %instance_id, "resume_target_not_blocking");
          return Ok(RunResult::new(activity_id, false));
        };

        let result = self.resume_workflow(ctx, &target).await;

        if !result.executed && ctx.status() != WorkflowStatus::Faulted {
          info!(instance_id = %instance_id, "workflow_cannot_resume");
          return Ok(result);
        }

        result
      }
      // Terminal statuses returned above.
      _ => unreachable!("terminal statuses are handled before dispatch"),
    };

    self
      .bus
      .publish(&WorkflowEvent::WorkflowExecuted {
        instance_id: instance_id.clone(),
        status: ctx.status(),
      })
      .await?;

    let terminal_event = match ctx.status() {
      WorkflowStatus::Cancelled => Some(WorkflowEvent::WorkflowCancelled {
        instance_id: instance_id.clone(),
      }),
      WorkflowStatus::Finished => Some(WorkflowEvent::WorkflowCompleted {
        instance_id: instance_id.clone(),
      }),
      WorkflowStatus::Faulted => ctx.instance().fault.clone().map(|fault| {
        WorkflowEvent::WorkflowFaulted {
          instance_id: instance_id.clone(),
          fault,
        }
      }),
      WorkflowStatus::Suspended => Some(WorkflowEvent::WorkflowSuspended {
        instance_id: instance_id.clone(),
        blocking_activity_ids: ctx
          .instance()
          .blocking_activities
          .iter()
          .map(|b| b.activity_id.clone())
          .collect(),
      }),
      _ => None,
    };

    if let Some(event) = terminal_event {
      self.bus.publish(&event).await?;
    }

    self
      .bus
      .publish(&WorkflowEvent::ExecutionFinished {
        instance_id: instance_id.clone(),
      })
      .await?;

    Ok(run_result)
  }

  /// Idle → Running. Any failure here faults the run with the attempted
  /// start activity id and is not rethrown.
  async fn begin_workflow(
    &self,
    ctx: &mut ExecutionContext<'_>,
    activity: Option<&ActivityBlueprint>,
  ) -> RunResult {
    let start = activity
      .cloned()
      .or_else(|| start_activities(ctx.blueprint()).first().map(|a| (*a).clone()))
      .or_else(|| ctx.blueprint().first_activity().cloned());

    let Some(start) = start else {
      // Nothing to begin from: the instance stays Idle.
      info!(
        instance_id = %ctx.instance().instance_id,
        "no_start_activity"
      );
      return RunResult::new(None, false);
    };

    match self.try_begin(ctx, &start).await {
      Ok(result) => result,
      Err(e) => {
        warn!(
          instance_id = %ctx.instance().instance_id,
          error = %e,
          "workflow_begin_failed"
        );
        ctx.fault(e.to_string(), Some(start.activity_id.clone()), false);
        RunResult::new(Some(start.activity_id), false)
      }
    }
  }

  async fn try_begin(
    &self,
    ctx: &mut ExecutionContext<'_>,
    start: &ActivityBlueprint,
  ) -> Result<RunResult, EngineError> {
    if !self.can_execute(ctx, start, false).await? {
      return Ok(RunResult::new(Some(start.activity_id.clone()), false));
    }

    ctx.begin();
    ctx.schedule_activity(ScheduledActivity::new(start.activity_id.clone()));
    self.run(ctx, ActivityOperation::Execute).await;
    Ok(RunResult::new(Some(start.activity_id.clone()), true))
  }

  /// Suspended → Running. Removes every blocking entry matching the
  /// target before rescheduling it; only the first dispatched activity
  /// resumes.
  async fn resume_workflow(
    &self,
    ctx: &mut ExecutionContext<'_>,
    activity: &ActivityBlueprint,
  ) -> RunResult {
    match self.try_resume(ctx, activity).await {
      Ok(result) => result,
      Err(e) => {
        warn!(
          instance_id = %ctx.instance().instance_id,
          error = %e,
          "workflow_resume_failed"
        );
        ctx.fault(e.to_string(), Some(activity.activity_id.clone()), true);
        RunResult::new(Some(activity.activity_id.clone()), false)
      }
    }
  }

  async fn try_resume(
    &self,
    ctx: &mut ExecutionContext<'_>,
    activity: &ActivityBlueprint,
  ) -> Result<RunResult, EngineError> {
    if !self.can_execute(ctx, activity, true).await? {
      return Ok(RunResult::new(Some(activity.activity_id.clone()), false));
    }

    ctx.remove_blocking_activities(&activity.activity_id);
    ctx.resume();
    ctx.schedule_activity(ScheduledActivity::new(activity.activity_id.clone()));
    self.run(ctx, ActivityOperation::Resume).await;
    Ok(RunResult::new(Some(activity.activity_id.clone()), true))
  }

  /// Admission check: activate the activity in a disposable scope, ask
  /// the activity type whether it is runnable, then give observers their
  /// veto. No persistent side effects beyond what activation itself
  /// performs.
  async fn can_execute(
    &self,
    ctx: &mut ExecutionContext<'_>,
    activity_blueprint: &ActivityBlueprint,
    resuming: bool,
  ) -> Result<bool, EngineError> {
    let activity = self.resolver.activate(activity_blueprint).await?;
    let input = ctx.input().cloned();
    let actx = ActivityExecutionContext::new(ctx, activity_blueprint.clone(), input, resuming);

    let willing = activity
      .can_execute(&actx)
      .await
      .map_err(|source| EngineError::Activity {
        activity_id: activity_blueprint.activity_id.clone(),
        source,
      })?;
    drop(actx);

    if !willing {
      return Ok(false);
    }

    for validator in &self.validators {
      if !validator
        .validate_activity(ctx.instance(), &activity_blueprint.activity_id, resuming)
        .await
      {
        return Ok(false);
      }
    }

    Ok(true)
  }

  /// Run the scheduling loop, containing any failure as a run-level
  /// fault.
  async fn run(&self, ctx: &mut ExecutionContext<'_>, operation: ActivityOperation) {
    if let Err(e) = self.run_core(ctx, operation).await {
      warn!(
        instance_id = %ctx.instance().instance_id,
        error = %e,
        "workflow_run_failed"
      );
      let activity_id = ctx
        .instance()
        .current_activity
        .as_ref()
        .map(|c| c.activity_id.clone());
      ctx.fault(
        e.to_string(),
        activity_id,
        operation == ActivityOperation::Resume,
      );
    }
  }

  /// The scheduling loop: pop, dispatch, apply, repeat until the stack
  /// drains or the pass short-circuits.
  async fn run_core(
    &self,
    ctx: &mut ExecutionContext<'_>,
    mut operation: ActivityOperation,
  ) -> Result<(), EngineError> {
    let instance_id = ctx.instance().instance_id.clone();
    let mut burst_started = false;

    while ctx.has_scheduled_activities() {
      if ctx.cancellation().is_cancelled() {
        warn!(instance_id = %instance_id, "workflow_cancelled");
        ctx.cancel_run();
        return Ok(());
      }

      let Some(scheduled) = ctx.pop_scheduled_activity() else {
        break;
      };
      let activity_id = scheduled.activity_id.clone();

      // The in-flight marker: a crash mid-pass resumes exactly here.
      ctx.instance_mut().current_activity = Some(scheduled.clone());

      let activity_blueprint = ctx
        .blueprint()
        .get_activity(&activity_id)
        .cloned()
        .ok_or_else(|| EngineError::ActivityNotFound(activity_id.clone()))?;

      let resuming = operation == ActivityOperation::Resume;

      // Input chain: the call input feeds the first pass; afterwards an
      // explicit scheduled input wins, else the previous activity's
      // persisted output is read back through its reference.
      let input = if !burst_started {
        ctx.input().cloned()
      } else if scheduled.input.is_some() {
        scheduled.input.clone()
      } else if let Some(output) = ctx.instance().output.clone() {
        let storage_context =
          StorageContext::new(instance_id.as_str(), output.activity_id.as_str());
        ctx
          .storage()
          .load(Some(output.provider_name.as_str()), &storage_context, "output")
          .await?
      } else {
        None
      };

      let activity = self.resolver.activate(&activity_blueprint).await?;

      self
        .bus
        .publish(&WorkflowEvent::ActivityActivating {
          instance_id: instance_id.clone(),
          activity_id: activity_id.clone(),
        })
        .await?;

      if !burst_started {
        self
          .bus
          .publish(&WorkflowEvent::BurstStarting {
            instance_id: instance_id.clone(),
            activity_id: activity_id.clone(),
          })
          .await?;
        burst_started = true;
      }

      if resuming {
        self
          .bus
          .publish(&WorkflowEvent::ActivityResuming {
            instance_id: instance_id.clone(),
            activity_id: activity_id.clone(),
          })
          .await?;
      }

      self
        .bus
        .publish(&WorkflowEvent::ActivityExecuting {
          instance_id: instance_id.clone(),
          activity_id: activity_id.clone(),
        })
        .await?;

      info!(
        instance_id = %instance_id,
        activity_id = %activity_id,
        resuming,
        "activity_executing"
      );

      let mut actx = ActivityExecutionContext::new(ctx, activity_blueprint, input, resuming);

      let invoked = if resuming {
        activity.resume(&mut actx).await
      } else {
        activity.execute(&mut actx).await
      };

      let result = match invoked {
        Ok(result) => result,
        Err(e) => {
          // Activity boundary: this one activity broke.
          warn!(
            instance_id = %instance_id,
            activity_id = %activity_id,
            error = %e,
            "activity_faulted"
          );
          actx.set_faulted();
          self
            .bus
            .publish(&WorkflowEvent::ActivityFaulted {
              instance_id: instance_id.clone(),
              activity_id: activity_id.clone(),
              error: e.to_string(),
            })
            .await?;
          self
            .bus
            .publish(&WorkflowEvent::ActivityResultFailed {
              instance_id: instance_id.clone(),
              activity_id: activity_id.clone(),
              error: e.to_string(),
            })
            .await?;
          // Run boundary: the enclosing catch faults the whole run.
          return Err(EngineError::Activity {
            activity_id,
            source: e,
          });
        }
      };

      let Some(result) = result else {
        // Sentinel: the activity already handled its outcome; stop the
        // burst without completing the pass.
        return Ok(());
      };

      self
        .bus
        .publish(&WorkflowEvent::ActivityExecuted {
          instance_id: instance_id.clone(),
          activity_id: activity_id.clone(),
        })
        .await?;
      self
        .bus
        .publish(&WorkflowEvent::ActivityResultExecuting {
          instance_id: instance_id.clone(),
          activity_id: activity_id.clone(),
        })
        .await?;

      result.apply(&mut actx);

      ctx.complete_pass();
      ctx.instance_mut().last_executed_activity_id = Some(activity_id.clone());

      self
        .bus
        .publish(&WorkflowEvent::ActivityResultExecuted {
          instance_id: instance_id.clone(),
          activity_id: activity_id.clone(),
        })
        .await?;
      self
        .bus
        .publish(&WorkflowEvent::PassCompleted {
          instance_id: instance_id.clone(),
          activity_id: activity_id.clone(),
        })
        .await?;

      if !ctx.has_scheduled_activities() {
        self
          .bus
          .publish(&WorkflowEvent::BurstCompleted {
            instance_id: instance_id.clone(),
            activity_id: activity_id.clone(),
          })
          .await?;
      }

      operation = ActivityOperation::Execute;
    }

    ctx.instance_mut().current_activity = None;

    if ctx.has_blocking_activities() {
      ctx.suspend();
    }

    if ctx.status() == WorkflowStatus::Running {
      ctx.complete();
    }

    Ok(())
  }
}
