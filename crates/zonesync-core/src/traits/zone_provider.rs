// # Zone Provider Trait
//
// Defines the capability set a DNS backend exposes to the reconciler:
// list hosted zones; per zone, list / add / remove resource record
// sets. Implementations (Route53, Google Cloud DNS, ...) live in their
// own crates; `provider::memory` is the in-tree reference backend.
//
// Backends are assumed eventually consistent and potentially slow;
// multi-second operations are normal, which is why every operation
// that touches the network is async.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::RecordType;

/// A resource record set as submitted to (or listed from) a backend
///
/// The controller always authors whole record sets: for a given
/// (type, FQDN) pair a single set is submitted carrying every value.
/// `add` semantics are upsert-like: the backend replaces whatever set
/// currently exists under the same name and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Record set name (FQDN)
    pub name: String,

    /// Record type
    pub record_type: RecordType,

    /// Time-to-live in seconds
    pub ttl: u32,

    /// Record data values
    pub rdata: Vec<String>,
}

impl RecordSet {
    /// Create a new record set value
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        ttl: u32,
        rdata: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            ttl,
            rdata,
        }
    }
}

/// Trait for DNS backend implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Responsibilities
///
/// Providers execute single-shot backend calls and report success or
/// failure; all retry, backoff and scheduling decisions are owned by
/// the controller. Providers must not cache desired state or decide
/// whether an operation is needed.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    /// List the hosted zones this backend manages
    ///
    /// Called once per reconcile iteration; the controller caches the
    /// result for the duration of that iteration only, so zones created
    /// between iterations are picked up automatically.
    async fn list_zones(&self) -> Result<Vec<Box<dyn Zone>>>;

    /// Whether this backend supports hosted zones at all
    ///
    /// A provider answering `false` is rejected at controller
    /// construction time.
    fn supports_zones(&self) -> bool;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// A single hosted zone on the backend
pub trait Zone: Send + Sync {
    /// Zone name; canonicalized to end with `.` by the controller
    /// before use
    fn name(&self) -> String;

    /// Record-set operations for this zone, or `None` when the zone
    /// does not support resource record sets
    fn record_sets(&self) -> Option<Box<dyn RecordSetProvider>>;
}

/// Record-set operations within one zone
#[async_trait]
pub trait RecordSetProvider: Send + Sync {
    /// List all record sets in the zone
    async fn list(&self) -> Result<Vec<RecordSet>>;

    /// Submit a record set, replacing any existing set with the same
    /// name and type
    async fn add(&self, record_set: RecordSet) -> Result<RecordSet>;

    /// Remove a record set
    async fn remove(&self, record_set: &RecordSet) -> Result<()>;
}

/// Helper trait for constructing zone providers from configuration
///
/// Factories are registered with [`crate::registry::ProviderRegistry`]
/// under a provider type name and selected by
/// [`crate::config::ProviderConfig`] at construction time.
pub trait ZoneProviderFactory: Send + Sync {
    /// Create a ZoneProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<std::sync::Arc<dyn ZoneProvider>>;
}
