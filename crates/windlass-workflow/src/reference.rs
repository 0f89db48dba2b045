use serde::{Deserialize, Serialize};

/// Indirect pointer to a persisted workflow input payload.
///
/// The payload itself lives in the storage provider named here, under the
/// instance's workflow-scoped storage context. References are deliberately
/// distinct from payloads so large values can be swapped between backing
/// stores without touching the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputReference {
  pub provider_name: String,
}

impl InputReference {
  pub fn new(provider_name: impl Into<String>) -> Self {
    Self {
      provider_name: provider_name.into(),
    }
  }
}

/// Indirect pointer to the persisted output of an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputReference {
  pub provider_name: String,
  /// Activity that produced the output; also the storage owner key.
  pub activity_id: String,
}

impl OutputReference {
  pub fn new(provider_name: impl Into<String>, activity_id: impl Into<String>) -> Self {
    Self {
      provider_name: provider_name.into(),
      activity_id: activity_id.into(),
    }
  }
}
