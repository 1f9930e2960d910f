//! Plugin-based provider registry
//!
//! Zone providers are registered dynamically at runtime and selected
//! by configuration, avoiding hardcoded if-else chains in whatever
//! embeds the controller.
//!
//! ## Registration
//!
//! Implementations should register themselves during initialization:
//!
//! ```rust
//! use zonesync_core::ProviderRegistry;
//! use zonesync_core::config::ProviderConfig;
//! use zonesync_core::provider::memory;
//!
//! let registry = ProviderRegistry::new();
//! memory::register(&registry);
//!
//! let config = ProviderConfig::Memory { zones: vec!["example.com.".to_string()] };
//! let provider = registry.create_provider(&config).unwrap();
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{ZoneProvider, ZoneProviderFactory};

/// Registry of zone provider factories keyed by provider type name
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing
/// concurrent reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Box<dyn ZoneProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "memory", "route53")
    /// - `factory`: Factory object for creating provider instances
    pub fn register_provider(
        &self,
        name: impl Into<String>,
        factory: Box<dyn ZoneProviderFactory>,
    ) {
        let name = name.into();
        let mut providers = self.providers.write().unwrap();
        providers.insert(name, factory);
    }

    /// Create a zone provider from configuration
    ///
    /// Fails with a configuration error when the provider type is not
    /// registered.
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Arc<dyn ZoneProvider>> {
        let provider_type = config.type_name();
        let providers = self.providers.read().unwrap();

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("unknown provider type: {provider_type}")))?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap();
        providers.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self.providers.read().unwrap();
        providers.contains_key(name)
    }
}
