//! Error types for the zonesync controller
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the zonesync controller
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at construction time)
    #[error("configuration error: {0}")]
    Config(String),

    /// Backend provider errors (transient, retried on the next cycle)
    #[error("provider error: {0}")]
    Provider(String),

    /// No hosted zone is a suffix of the given FQDN
    #[error("no suitable zone found for {fqdn:?}")]
    ZoneNotFound {
        /// The FQDN that failed zone resolution
        fqdn: String,
    },

    /// The zone exists but exposes no record-set operations
    #[error("zone {zone:?} does not support record sets")]
    RecordSetsUnsupported {
        /// Name of the offending zone
        zone: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a zone-not-found error
    pub fn zone_not_found(fqdn: impl Into<String>) -> Self {
        Self::ZoneNotFound { fqdn: fqdn.into() }
    }

    /// Create a record-sets-unsupported error
    pub fn record_sets_unsupported(zone: impl Into<String>) -> Self {
        Self::RecordSetsUnsupported { zone: zone.into() }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
