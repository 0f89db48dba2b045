use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::instance::WorkflowFault;

/// One execution-log record: a state transition or fault observed during a
/// run. Entries are buffered on the execution context and flushed in one
/// batch at the end of the top-level call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
  pub instance_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub activity_id: Option<String>,
  /// Short outcome label ("started", "suspended", "finished", "faulted").
  pub outcome: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fault: Option<WorkflowFault>,
  pub timestamp: DateTime<Utc>,
}

impl ExecutionLogEntry {
  pub fn new(
    instance_id: impl Into<String>,
    activity_id: Option<String>,
    outcome: impl Into<String>,
  ) -> Self {
    Self {
      instance_id: instance_id.into(),
      activity_id,
      outcome: outcome.into(),
      message: None,
      fault: None,
      timestamp: Utc::now(),
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn with_fault(mut self, fault: WorkflowFault) -> Self {
    self.fault = Some(fault);
    self
  }
}
