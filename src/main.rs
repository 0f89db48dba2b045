use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use windlass_engine::{
  Activity, ActivityError, ActivityExecutionContext, ActivityResolver, ActivityResult,
  EngineError, WorkflowRunner,
};
use windlass_events::{EventError, EventHandler, WorkflowEvent};
use windlass_workflow::{
  ActivityBlueprint, WorkflowBlueprint, WorkflowInput, WorkflowInstance,
};

/// Windlass - a suspendable workflow execution engine
#[derive(Parser)]
#[command(name = "windlass")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a blueprint with a fresh instance
  Run {
    /// Path to the blueprint file (JSON)
    blueprint_file: PathBuf,

    /// Write the resulting instance state to this file instead of stdout
    #[arg(long)]
    state: Option<PathBuf>,
  },

  /// Resume a suspended instance from a saved state file
  Resume {
    /// Path to the blueprint file (JSON)
    blueprint_file: PathBuf,

    /// Path to the saved instance state (JSON)
    #[arg(long)]
    state: PathBuf,

    /// Blocking activity id to resume
    #[arg(long)]
    activity: String,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Run {
      blueprint_file,
      state,
    }) => {
      run_blueprint(blueprint_file, state)?;
    }
    Some(Commands::Resume {
      blueprint_file,
      state,
      activity,
    }) => {
      resume_instance(blueprint_file, state, activity)?;
    }
    None => {
      println!("windlass - use --help to see available commands");
    }
  }

  Ok(())
}

fn run_blueprint(blueprint_file: PathBuf, state: Option<PathBuf>) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_blueprint_async(blueprint_file, state).await })
}

async fn run_blueprint_async(blueprint_file: PathBuf, state: Option<PathBuf>) -> Result<()> {
  let blueprint = load_blueprint(&blueprint_file).await?;
  eprintln!("Loaded blueprint: {}", blueprint.name);

  let payload = read_payload_from_stdin()?;
  let input = payload.map(WorkflowInput::new);

  let mut instance = WorkflowInstance::new(blueprint.blueprint_id.clone());
  let runner = demo_runner();

  let result = runner
    .run_workflow(
      Arc::new(blueprint),
      &mut instance,
      None,
      input,
      CancellationToken::new(),
    )
    .await
    .context("workflow execution failed")?;

  eprintln!(
    "Run complete: status={} executed={}",
    instance.status, result.executed
  );

  write_instance(&instance, state).await
}

fn resume_instance(blueprint_file: PathBuf, state: PathBuf, activity: String) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { resume_instance_async(blueprint_file, state, activity).await })
}

async fn resume_instance_async(
  blueprint_file: PathBuf,
  state: PathBuf,
  activity: String,
) -> Result<()> {
  let blueprint = load_blueprint(&blueprint_file).await?;

  let state_content = tokio::fs::read_to_string(&state)
    .await
    .with_context(|| format!("failed to read state file: {}", state.display()))?;
  let mut instance: WorkflowInstance = serde_json::from_str(&state_content)
    .with_context(|| format!("failed to parse state file: {}", state.display()))?;

  let payload = read_payload_from_stdin()?;
  let input = payload.map(WorkflowInput::new);

  let runner = demo_runner();
  let result = runner
    .run_workflow(
      Arc::new(blueprint),
      &mut instance,
      Some(activity.as_str()),
      input,
      CancellationToken::new(),
    )
    .await
    .context("workflow resume failed")?;

  if !result.executed {
    eprintln!("Instance was not resumed (is '{}' blocking?)", activity);
  }

  eprintln!(
    "Resume complete: status={} executed={}",
    instance.status, result.executed
  );

  write_instance(&instance, Some(state)).await
}

async fn load_blueprint(blueprint_file: &PathBuf) -> Result<WorkflowBlueprint> {
  let content = tokio::fs::read_to_string(blueprint_file)
    .await
    .with_context(|| format!("failed to read blueprint file: {}", blueprint_file.display()))?;

  let blueprint: WorkflowBlueprint = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse blueprint file: {}", blueprint_file.display()))?;

  blueprint
    .validate()
    .context("blueprint failed validation")?;

  Ok(blueprint)
}

async fn write_instance(instance: &WorkflowInstance, state: Option<PathBuf>) -> Result<()> {
  let rendered = serde_json::to_string_pretty(instance)?;

  match state {
    Some(path) => {
      tokio::fs::write(&path, rendered)
        .await
        .with_context(|| format!("failed to write state file: {}", path.display()))?;
      eprintln!("Instance state written to {}", path.display());
    }
    None => println!("{}", rendered),
  }

  Ok(())
}

fn read_payload_from_stdin() -> Result<Option<serde_json::Value>> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, run without input
    return Ok(None);
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read payload from stdin")?;

  if input.trim().is_empty() {
    Ok(None)
  } else {
    serde_json::from_str(&input)
      .map(Some)
      .context("failed to parse payload JSON from stdin")
  }
}

fn demo_runner() -> WorkflowRunner {
  WorkflowRunner::builder(Arc::new(DemoResolver))
    .event_handler(Arc::new(LoggingEventHandler))
    .build()
}

/// Built-in demo activity set for the CLI. Real deployments plug in their
/// own [`ActivityResolver`].
struct DemoResolver;

#[async_trait]
impl ActivityResolver for DemoResolver {
  async fn activate(
    &self,
    blueprint: &ActivityBlueprint,
  ) -> Result<Box<dyn Activity>, EngineError> {
    let activity: Box<dyn Activity> = match blueprint.activity_type.as_str() {
      "log" => Box::new(LogActivity),
      "wait" => Box::new(WaitActivity),
      "set-output" => Box::new(SetOutputActivity),
      other => return Err(EngineError::UnknownActivityType(other.to_string())),
    };
    Ok(activity)
  }
}

/// Logs its "message" property and schedules the "done" successors.
struct LogActivity;

#[async_trait]
impl Activity for LogActivity {
  async fn execute(
    &self,
    ctx: &mut ActivityExecutionContext<'_, '_>,
  ) -> Result<Option<ActivityResult>, ActivityError> {
    let activity_id = ctx.activity().activity_id.clone();
    let message = ctx
      .property("message")
      .and_then(|v| v.as_str())
      .unwrap_or_default()
      .to_string();

    info!(activity_id = %activity_id, message = %message, "log_activity");

    let next = ctx.execution().outbound_activities(&activity_id, "done");
    Ok(Some(ActivityResult::Schedule(next)))
  }
}

/// Parks the run until an external resume targets this activity, then
/// schedules the "done" successors.
struct WaitActivity;

#[async_trait]
impl Activity for WaitActivity {
  async fn execute(
    &self,
    _ctx: &mut ActivityExecutionContext<'_, '_>,
  ) -> Result<Option<ActivityResult>, ActivityError> {
    Ok(Some(ActivityResult::Block))
  }

  async fn resume(
    &self,
    ctx: &mut ActivityExecutionContext<'_, '_>,
  ) -> Result<Option<ActivityResult>, ActivityError> {
    let activity_id = ctx.activity().activity_id.clone();
    let next = ctx.execution().outbound_activities(&activity_id, "done");
    Ok(Some(ActivityResult::Schedule(next)))
  }
}

/// Persists its "value" property (or its input) as the activity output,
/// then schedules the "done" successors.
struct SetOutputActivity;

#[async_trait]
impl Activity for SetOutputActivity {
  async fn execute(
    &self,
    ctx: &mut ActivityExecutionContext<'_, '_>,
  ) -> Result<Option<ActivityResult>, ActivityError> {
    let activity_id = ctx.activity().activity_id.clone();
    let value = ctx
      .property("value")
      .cloned()
      .or_else(|| ctx.input().cloned())
      .unwrap_or(serde_json::Value::Null);

    ctx.set_output(value).await?;

    let next = ctx.execution().outbound_activities(&activity_id, "done");
    Ok(Some(ActivityResult::Schedule(next)))
  }
}

/// Mirrors every lifecycle event into the log.
struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
  async fn handle(&self, event: &WorkflowEvent) -> Result<(), EventError> {
    info!(
      instance_id = %event.instance_id(),
      event = event.name(),
      "workflow_event"
    );
    Ok(())
  }
}
