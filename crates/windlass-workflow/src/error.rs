use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("connection references unknown activity: source={source}, target={target}")]
  InvalidConnection { source: String, target: String },

  #[error("blueprint has no activities")]
  EmptyBlueprint,
}
