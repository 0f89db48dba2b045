use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::graph::BlueprintGraph;

/// One activity in a compiled workflow blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityBlueprint {
  pub activity_id: String,
  /// Name of the activity type; resolved to a runnable activity by the
  /// activity runtime.
  pub activity_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
  /// Type-specific configuration, interpreted by the activity itself.
  #[serde(default)]
  pub properties: serde_json::Map<String, serde_json::Value>,
}

impl ActivityBlueprint {
  pub fn new(activity_id: impl Into<String>, activity_type: impl Into<String>) -> Self {
    Self {
      activity_id: activity_id.into(),
      activity_type: activity_type.into(),
      display_name: None,
      properties: serde_json::Map::new(),
    }
  }

  /// Look up a configuration property by name.
  pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
    self.properties.get(name)
  }
}

/// A directed connection between two activities.
///
/// `outcome` labels the branch of the source activity this connection
/// follows ("done", "true", "timeout", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
  pub source: String,
  pub outcome: String,
  pub target: String,
}

impl Connection {
  pub fn new(
    source: impl Into<String>,
    outcome: impl Into<String>,
    target: impl Into<String>,
  ) -> Self {
    Self {
      source: source.into(),
      outcome: outcome.into(),
      target: target.into(),
    }
  }
}

/// Immutable, compiled representation of a workflow's activity graph.
///
/// Blueprints are read-only and safely shared across concurrent runs of
/// different instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowBlueprint {
  pub blueprint_id: String,
  #[serde(default = "default_version")]
  pub version: i32,
  pub name: String,
  /// Ordered activity list; the first entry is the fallback entry point
  /// when no start activity can be computed from the connections.
  pub activities: Vec<ActivityBlueprint>,
  #[serde(default)]
  pub connections: Vec<Connection>,
}

fn default_version() -> i32 {
  1
}

impl WorkflowBlueprint {
  /// Get an activity by id.
  pub fn get_activity(&self, activity_id: &str) -> Option<&ActivityBlueprint> {
    self
      .activities
      .iter()
      .find(|a| a.activity_id == activity_id)
  }

  /// The first activity in definition order, if any.
  pub fn first_activity(&self) -> Option<&ActivityBlueprint> {
    self.activities.first()
  }

  /// Build the graph structure for traversal.
  pub fn graph(&self) -> BlueprintGraph {
    BlueprintGraph::new(&self.activities, &self.connections)
  }

  /// Check structural integrity: at least one activity, and every
  /// connection endpoint names a known activity.
  pub fn validate(&self) -> Result<(), WorkflowError> {
    if self.activities.is_empty() {
      return Err(WorkflowError::EmptyBlueprint);
    }

    for connection in &self.connections {
      if self.get_activity(&connection.source).is_none()
        || self.get_activity(&connection.target).is_none()
      {
        return Err(WorkflowError::InvalidConnection {
          source: connection.source.clone(),
          target: connection.target.clone(),
        });
      }
    }

    Ok(())
  }
}

/// Activities eligible as entry points: those with no inbound connection,
/// in definition order.
pub fn start_activities(blueprint: &WorkflowBlueprint) -> Vec<&ActivityBlueprint> {
  let graph = blueprint.graph();
  blueprint
    .activities
    .iter()
    .filter(|a| graph.entry_points().contains(&a.activity_id))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn blueprint() -> WorkflowBlueprint {
    WorkflowBlueprint {
      blueprint_id: "wf".to_string(),
      version: 1,
      name: "test".to_string(),
      activities: vec![
        ActivityBlueprint::new("a", "noop"),
        ActivityBlueprint::new("b", "noop"),
        ActivityBlueprint::new("c", "noop"),
      ],
      connections: vec![
        Connection::new("a", "done", "b"),
        Connection::new("b", "done", "c"),
      ],
    }
  }

  #[test]
  fn get_activity_by_id() {
    let bp = blueprint();
    assert!(bp.get_activity("b").is_some());
    assert!(bp.get_activity("missing").is_none());
  }

  #[test]
  fn start_activities_are_entry_points() {
    let bp = blueprint();
    let starts = start_activities(&bp);
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].activity_id, "a");
  }

  #[test]
  fn start_activities_empty_for_cycle() {
    let mut bp = blueprint();
    bp.connections.push(Connection::new("c", "done", "a"));
    assert!(start_activities(&bp).is_empty());
  }

  #[test]
  fn validate_rejects_dangling_connection() {
    let mut bp = blueprint();
    bp.connections.push(Connection::new("c", "done", "ghost"));
    assert!(matches!(
      bp.validate(),
      Err(WorkflowError::InvalidConnection { .. })
    ));
  }

  #[test]
  fn validate_rejects_empty_blueprint() {
    let bp = WorkflowBlueprint {
      blueprint_id: "wf".to_string(),
      version: 1,
      name: "empty".to_string(),
      activities: vec![],
      connections: vec![],
    };
    assert!(matches!(bp.validate(), Err(WorkflowError::EmptyBlueprint)));
  }
}
