use std::collections::HashMap;

use crate::blueprint::{ActivityBlueprint, Connection};

/// Adjacency view over a blueprint's connections.
#[derive(Debug, Clone)]
pub struct BlueprintGraph {
  /// activity_id -> outbound (outcome, target) pairs in connection order.
  outbound: HashMap<String, Vec<(String, String)>>,
  /// activity_id -> inbound source activity ids.
  inbound: HashMap<String, Vec<String>>,
  /// Activities with no inbound connection, in definition order.
  entry_points: Vec<String>,
}

impl BlueprintGraph {
  pub fn new(activities: &[ActivityBlueprint], connections: &[Connection]) -> Self {
    let mut outbound: HashMap<String, Vec<(String, String)>> = HashMap::new();
    let mut inbound: HashMap<String, Vec<String>> = HashMap::new();

    for activity in activities {
      outbound.entry(activity.activity_id.clone()).or_default();
      inbound.entry(activity.activity_id.clone()).or_default();
    }

    for connection in connections {
      outbound
        .entry(connection.source.clone())
        .or_default()
        .push((connection.outcome.clone(), connection.target.clone()));
      inbound
        .entry(connection.target.clone())
        .or_default()
        .push(connection.source.clone());
    }

    let entry_points = activities
      .iter()
      .filter(|a| {
        inbound
          .get(&a.activity_id)
          .is_none_or(|sources| sources.is_empty())
      })
      .map(|a| a.activity_id.clone())
      .collect();

    Self {
      outbound,
      inbound,
      entry_points,
    }
  }

  /// Activities with no inbound connection.
  pub fn entry_points(&self) -> &[String] {
    &self.entry_points
  }

  /// Outbound (outcome, target) pairs for an activity.
  pub fn outbound(&self, activity_id: &str) -> &[(String, String)] {
    self
      .outbound
      .get(activity_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Targets of an activity's outbound connections, restricted to one
  /// outcome label.
  pub fn targets_for_outcome(&self, activity_id: &str, outcome: &str) -> Vec<&str> {
    self
      .outbound(activity_id)
      .iter()
      .filter(|(o, _)| o == outcome)
      .map(|(_, target)| target.as_str())
      .collect()
  }

  /// Source activities connecting into an activity.
  pub fn inbound(&self, activity_id: &str) -> &[String] {
    self
      .inbound
      .get(activity_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }
}
