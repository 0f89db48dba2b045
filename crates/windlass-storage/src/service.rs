use std::collections::HashMap;
use std::sync::Arc;

use crate::provider::{StorageContext, StorageProvider};
use crate::StorageError;

/// Name of the provider used when a caller does not specify one.
pub const DEFAULT_PROVIDER: &str = "memory";

/// Named-provider registry.
///
/// The engine addresses payloads by an optional provider name; unspecified
/// names fall back to [`DEFAULT_PROVIDER`]. Provider names are opaque
/// selectors that the registry does not interpret.
#[derive(Clone, Default)]
pub struct StorageService {
  providers: HashMap<String, Arc<dyn StorageProvider>>,
}

impl StorageService {
  pub fn new() -> Self {
    Self {
      providers: HashMap::new(),
    }
  }

  /// Register a provider under its own name, replacing any previous
  /// registration.
  pub fn register(&mut self, provider: Arc<dyn StorageProvider>) {
    self.providers.insert(provider.name().to_string(), provider);
  }

  /// Resolve a provider by name, falling back to the default provider.
  pub fn provider_or_default(
    &self,
    name: Option<&str>,
  ) -> Result<&Arc<dyn StorageProvider>, StorageError> {
    let name = name.unwrap_or(DEFAULT_PROVIDER);
    self
      .providers
      .get(name)
      .ok_or_else(|| StorageError::ProviderNotFound(name.to_string()))
  }

  /// Save a payload through the named (or default) provider.
  ///
  /// Returns the resolved provider name, for building storage references.
  pub async fn save(
    &self,
    provider_name: Option<&str>,
    context: &StorageContext,
    key: &str,
    value: serde_json::Value,
  ) -> Result<String, StorageError> {
    let provider = self.provider_or_default(provider_name)?;
    provider.save(context, key, value).await?;
    Ok(provider.name().to_string())
  }

  /// Load a payload through the named (or default) provider.
  pub async fn load(
    &self,
    provider_name: Option<&str>,
    context: &StorageContext,
    key: &str,
  ) -> Result<Option<serde_json::Value>, StorageError> {
    let provider = self.provider_or_default(provider_name)?;
    provider.load(context, key).await
  }
}
