use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use windlass_storage::StorageError;
use windlass_workflow::ActivityBlueprint;

use crate::activity_context::ActivityExecutionContext;
use crate::error::EngineError;
use crate::result::ActivityResult;

/// Error raised by an activity's own operations.
#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
  /// The activity failed in a way of its own.
  #[error("{message}")]
  Failed { message: String },

  /// A storage call made by the activity failed.
  #[error(transparent)]
  Storage(#[from] StorageError),
}

impl ActivityError {
  pub fn failed(message: impl Into<String>) -> Self {
    Self::Failed {
      message: message.into(),
    }
  }
}

/// Input/output property names an activity exposes.
///
/// Consumed by external tooling (designers, type-declaration renderers),
/// never by the engine itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityDescriptor {
  pub input_properties: Vec<String>,
  pub output_properties: Vec<String>,
}

/// An activated, runnable activity instance.
///
/// Activated fresh for every pass (and once more, transiently, for the
/// admission check). `execute`/`resume` return `Ok(None)` as a sentinel
/// meaning "already handled internally"; the engine stops the current
/// burst without applying a result.
#[async_trait]
pub trait Activity: Send + Sync {
  /// Whether the activity is willing to run given the current input and
  /// state. Consulted during the admission check, before any observer
  /// veto.
  async fn can_execute(&self, _ctx: &ActivityExecutionContext<'_, '_>) -> Result<bool, ActivityError> {
    Ok(true)
  }

  async fn execute(
    &self,
    ctx: &mut ActivityExecutionContext<'_, '_>,
  ) -> Result<Option<ActivityResult>, ActivityError>;

  /// Resume after an external trigger. Defaults to plain execution.
  async fn resume(
    &self,
    ctx: &mut ActivityExecutionContext<'_, '_>,
  ) -> Result<Option<ActivityResult>, ActivityError> {
    self.execute(ctx).await
  }

  fn describe(&self) -> ActivityDescriptor {
    ActivityDescriptor::default()
  }
}

/// The activity runtime boundary: produces an activatable activity
/// instance for a blueprint activity.
#[async_trait]
pub trait ActivityResolver: Send + Sync {
  /// Activate an activity instance for the given blueprint activity.
  ///
  /// Activation may be impure (the activity type's responsibility, not
  /// the engine's). An unknown `activity_type` is
  /// [`EngineError::UnknownActivityType`].
  async fn activate(&self, blueprint: &ActivityBlueprint) -> Result<Box<dyn Activity>, EngineError>;
}
