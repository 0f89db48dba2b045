use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::event::WorkflowEvent;
use crate::EventError;

/// Trait for receiving lifecycle events.
///
/// Handlers run sequentially in registration order and are awaited, so an
/// implementation may perform side effects (persist the instance, trigger
/// schedulers) that handlers registered after it can rely on.
#[async_trait]
pub trait EventHandler: Send + Sync {
  async fn handle(&self, event: &WorkflowEvent) -> Result<(), EventError>;
}

/// Ordered, synchronous publish/subscribe for lifecycle events.
///
/// `publish` returns only after every handler has run; a handler error
/// aborts delivery to the remaining handlers and propagates to the caller.
#[derive(Clone, Default)]
pub struct EventBus {
  handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventBus {
  pub fn new() -> Self {
    Self {
      handlers: Vec::new(),
    }
  }

  /// Register a handler; registration order is delivery order.
  pub fn subscribe(&mut self, handler: Arc<dyn EventHandler>) {
    self.handlers.push(handler);
  }

  pub async fn publish(&self, event: &WorkflowEvent) -> Result<(), EventError> {
    for handler in &self.handlers {
      handler.handle(event).await?;
    }
    Ok(())
  }
}

/// A handler that forwards events into an unbounded channel.
///
/// Use this to consume events asynchronously (persist to a database,
/// stream to a UI) without blocking the engine on the consumer.
#[derive(Debug, Clone)]
pub struct ChannelEventHandler {
  sender: mpsc::UnboundedSender<WorkflowEvent>,
}

impl ChannelEventHandler {
  pub fn new(sender: mpsc::UnboundedSender<WorkflowEvent>) -> Self {
    Self { sender }
  }
}

#[async_trait]
impl EventHandler for ChannelEventHandler {
  async fn handle(&self, event: &WorkflowEvent) -> Result<(), EventError> {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(event.clone());
    Ok(())
  }
}
