// # zonesync-core
//
// Core library for the zonesync DNS reconciliation controller.
//
// ## Architecture Overview
//
// Independent producers ("scopes") feed desired DNS records into a
// shared registry; a single reconciler task batches that state into
// consistent snapshots and drives an abstract DNS backend toward it:
//
// - **ZoneProvider**: Trait for DNS backends (list zones, list/add/
//   remove record sets)
// - **ScopeRegistry**: Thread-safe multi-producer store of record
//   intents with per-scope readiness gating
// - **DnsController**: The reconcile loop: snapshot, alias expansion,
//   incremental diff, failure-isolated apply
// - **ProviderRegistry**: Plugin-based registry for zone provider
//   factories
//
// ## Design Principles
//
// 1. **Single mutex, no I/O under it**: producers are never blocked on
//    DNS latency
// 2. **At-least-once apply**: a failed iteration keeps the old
//    baseline, so every failed key is retried until it converges
// 3. **Plugin-based**: backends are registered dynamically, no
//    hard-coded if-else
// 4. **Library-first**: the daemon is a thin wrapper; everything here
//    can be embedded

pub mod config;
pub mod controller;
pub mod error;
pub mod provider;
pub mod record;
pub mod registry;
pub mod scopes;
pub mod snapshot;
pub mod traits;

// Re-export core types for convenience
pub use config::{ControllerConfig, ProviderConfig};
pub use controller::{ControllerEvent, ControllerStatus, DnsController, ReconcileOutcome};
pub use error::{Error, Result};
pub use provider::memory::MemoryZoneProvider;
pub use record::{Record, RecordKey, RecordType, ensure_dot_suffix};
pub use registry::ProviderRegistry;
pub use scopes::ScopeRegistry;
pub use snapshot::Snapshot;
pub use traits::{RecordSet, RecordSetProvider, Zone, ZoneProvider, ZoneProviderFactory};
