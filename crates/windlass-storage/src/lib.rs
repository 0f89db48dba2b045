//! Windlass Storage
//!
//! This crate provides the storage boundary for windlass: activity input
//! and output payloads are kept out of the instance record and behind a
//! [`StorageProvider`], addressed by provider name plus a
//! [`StorageContext`] key. The [`StorageService`] is the named-provider
//! registry the engine talks to; it falls back to a well-known default
//! provider when a caller does not name one.
//!
//! The [`ExecutionLogStore`] receives the execution-log entries buffered
//! during a run, flushed once per top-level engine call.

mod log_store;
mod memory;
mod provider;
mod service;

pub use log_store::{ExecutionLogStore, MemoryExecutionLogStore};
pub use memory::MemoryStorageProvider;
pub use provider::{StorageContext, StorageProvider};
pub use service::{DEFAULT_PROVIDER, StorageService};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
  /// No provider is registered under the requested name.
  #[error("storage provider not found: {0}")]
  ProviderNotFound(String),

  /// The backing store failed.
  #[error("storage backend error: {message}")]
  Backend { message: String },
}
