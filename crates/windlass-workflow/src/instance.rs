use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reference::{InputReference, OutputReference};
use crate::status::WorkflowStatus;

/// An activity waiting on the scheduled-activity stack.
///
/// The optional input overrides the default input chain (previous
/// activity's persisted output) when the entry is popped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledActivity {
  pub activity_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub input: Option<serde_json::Value>,
}

impl ScheduledActivity {
  pub fn new(activity_id: impl Into<String>) -> Self {
    Self {
      activity_id: activity_id.into(),
      input: None,
    }
  }

  pub fn with_input(activity_id: impl Into<String>, input: serde_json::Value) -> Self {
    Self {
      activity_id: activity_id.into(),
      input: Some(input),
    }
  }
}

/// An activity parked until an external trigger resumes it by id.
///
/// The same activity id may be registered more than once; a single resume
/// request removes every matching entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingActivity {
  pub activity_id: String,
}

impl BlockingActivity {
  pub fn new(activity_id: impl Into<String>) -> Self {
    Self {
      activity_id: activity_id.into(),
    }
  }
}

/// Snapshot of a run-level failure recorded on the instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowFault {
  pub message: String,
  /// Activity that was executing when the fault occurred, when known.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub faulted_activity_id: Option<String>,
  /// Whether the failure happened while resuming a suspended run.
  pub resuming: bool,
}

/// Input carried into a top-level engine call.
///
/// The payload is persisted through the named storage provider (or the
/// default provider) before any activity runs, and the instance keeps an
/// [`InputReference`] to it.
#[derive(Debug, Clone)]
pub struct WorkflowInput {
  pub payload: serde_json::Value,
  pub provider_name: Option<String>,
}

impl WorkflowInput {
  pub fn new(payload: serde_json::Value) -> Self {
    Self {
      payload,
      provider_name: None,
    }
  }

  pub fn with_provider(payload: serde_json::Value, provider_name: impl Into<String>) -> Self {
    Self {
      payload,
      provider_name: Some(provider_name.into()),
    }
  }
}

/// Mutable per-execution record of a workflow's progress.
///
/// Owned exclusively by the caller across engine calls. The engine mutates
/// it in place during a call and returns it; persisting it afterward is the
/// caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInstance {
  pub instance_id: String,
  pub blueprint_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  pub status: WorkflowStatus,
  /// Set while an activity pass is in flight; a crash mid-run leaves it
  /// populated so the next call resumes exactly there.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current_activity: Option<ScheduledActivity>,
  #[serde(default)]
  pub blocking_activities: Vec<BlockingActivity>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub input: Option<InputReference>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output: Option<OutputReference>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_executed_activity_id: Option<String>,
  /// Correlates the run with an application-scoped context object loaded
  /// by a context manager before execution starts.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub context_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fault: Option<WorkflowFault>,
  pub created_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub finished_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub faulted_at: Option<DateTime<Utc>>,
}

impl WorkflowInstance {
  /// Create a fresh idle instance for the given blueprint.
  pub fn new(blueprint_id: impl Into<String>) -> Self {
    Self {
      instance_id: uuid::Uuid::new_v4().to_string(),
      blueprint_id: blueprint_id.into(),
      name: None,
      status: WorkflowStatus::Idle,
      current_activity: None,
      blocking_activities: Vec::new(),
      input: None,
      output: None,
      last_executed_activity_id: None,
      context_id: None,
      fault: None,
      created_at: Utc::now(),
      finished_at: None,
      faulted_at: None,
    }
  }

  /// Whether any blocking entry matches the given activity id.
  pub fn is_blocking(&self, activity_id: &str) -> bool {
    self
      .blocking_activities
      .iter()
      .any(|b| b.activity_id == activity_id)
  }
}
