//! Windlass Events
//!
//! Lifecycle events emitted while the engine drives a workflow instance.
//! Delivery is ordered and synchronous: [`EventBus::publish`] awaits every
//! handler in registration order before returning, so a handler may rely
//! on the side effects of the handlers before it (persistence-on-event is
//! the expected pattern). The per-invocation event sequence is a
//! compatibility contract for downstream consumers, not an incidental
//! detail.
//!
//! Events are immutable records carrying id/status snapshots. The veto
//! surface (admission observers) is the separate [`ExecutionValidator`]
//! trait.

mod bus;
mod event;
mod validator;

pub use bus::{ChannelEventHandler, EventBus, EventHandler};
pub use event::WorkflowEvent;
pub use validator::ExecutionValidator;

/// Error type for event delivery.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
  /// A handler failed; the failure propagates to the engine and faults
  /// the run.
  #[error("event handler failed: {message}")]
  Handler { message: String },
}
