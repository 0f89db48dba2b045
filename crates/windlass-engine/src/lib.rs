//! Windlass Engine
//!
//! The execution engine for windlass workflows: given a read-only
//! [`windlass_workflow::WorkflowBlueprint`] and a mutable
//! [`windlass_workflow::WorkflowInstance`], the [`WorkflowRunner`] drives
//! the instance forward one scheduled activity at a time, suspending on
//! blocking activities and resuming on external triggers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WorkflowRunner                         │
//! │  - run_workflow(blueprint, instance, activity?, input?)     │
//! │  - status dispatch: begin / continue / resume               │
//! │  - admission check (activity type + validator veto)         │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ExecutionContext                         │
//! │  - owns the instance for the call                           │
//! │  - LIFO scheduled-activity stack, blocking set              │
//! │  - execution-log buffer, status transitions                 │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                ActivityExecutionContext                     │
//! │  - one per pass: resolved input, resuming flag              │
//! │  - Activity::execute/resume → ActivityResult::apply         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each top-level call is strictly sequential; concurrency comes from
//! running many instances' calls in parallel, each with its own
//! `ExecutionContext`.

mod activity;
mod activity_context;
mod context;
mod context_manager;
mod error;
mod result;
mod runner;

pub use activity::{Activity, ActivityDescriptor, ActivityError, ActivityResolver};
pub use activity_context::ActivityExecutionContext;
pub use context::ExecutionContext;
pub use context_manager::{NoopContextManager, WorkflowContextManager};
pub use error::EngineError;
pub use result::{ActivityResult, RunResult};
pub use runner::{WorkflowRunner, WorkflowRunnerBuilder};
