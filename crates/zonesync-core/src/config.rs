//! Configuration types for the zonesync controller
//!
//! This module defines all configuration structures used throughout the crate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Controller tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Sleep between reconcile iterations when idle or after success.
    /// DNS backends are typically slow anyway, so this doubles as a
    /// simple debounce of producer churn.
    #[serde(default = "default_debounce_interval_secs")]
    pub debounce_interval_secs: u64,

    /// Sleep after a failed iteration before retrying
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,

    /// TTL applied to every record set the controller authors
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u32,

    /// Capacity of the controller event channel
    ///
    /// When full, new events are dropped (with a warning log). This
    /// prevents unbounded memory growth when nobody drains the
    /// receiver.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl ControllerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.debounce_interval_secs == 0 {
            return Err(crate::Error::config("debounce interval must be > 0"));
        }
        if self.error_backoff_secs == 0 {
            return Err(crate::Error::config("error backoff must be > 0"));
        }
        if self.default_ttl_secs == 0 {
            return Err(crate::Error::config("default TTL must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event channel capacity must be > 0"));
        }
        Ok(())
    }

    /// Debounce interval as a [`Duration`]
    pub fn debounce_interval(&self) -> Duration {
        Duration::from_secs(self.debounce_interval_secs)
    }

    /// Error backoff as a [`Duration`]
    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce_interval_secs: default_debounce_interval_secs(),
            error_backoff_secs: default_error_backoff_secs(),
            default_ttl_secs: default_ttl_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_debounce_interval_secs() -> u64 {
    5
}

fn default_error_backoff_secs() -> u64 {
    10
}

fn default_ttl_secs() -> u32 {
    60
}

fn default_event_channel_capacity() -> usize {
    1000
}

/// Zone provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// In-memory provider (reference backend, not persistent)
    Memory {
        /// Hosted zone names to create at startup
        zones: Vec<String>,
    },

    /// Custom provider resolved through the registry
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Memory { zones } => {
                if zones.is_empty() {
                    return Err(crate::Error::config(
                        "memory provider requires at least one zone",
                    ));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config("custom provider config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Memory { .. } => "memory",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Memory { zones: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reconciler_contract() {
        let config = ControllerConfig::default();
        assert_eq!(config.debounce_interval(), Duration::from_secs(5));
        assert_eq!(config.error_backoff(), Duration::from_secs(10));
        assert_eq!(config.default_ttl_secs, 60);
        config.validate().unwrap();
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let config = ControllerConfig {
            debounce_interval_secs: 0,
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ControllerConfig {
            default_ttl_secs: 0,
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_config_validation() {
        let config = ProviderConfig::Memory { zones: vec![] };
        assert!(config.validate().is_err());

        let config = ProviderConfig::Memory {
            zones: vec!["example.com.".to_string()],
        };
        config.validate().unwrap();
        assert_eq!(config.type_name(), "memory");

        let config = ProviderConfig::Custom {
            factory: "route53".to_string(),
            config: serde_json::json!({"region": "us-east-1"}),
        };
        config.validate().unwrap();
        assert_eq!(config.type_name(), "route53");
    }
}
