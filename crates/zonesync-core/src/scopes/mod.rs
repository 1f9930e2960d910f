//! Multi-producer scope registry
//!
//! The registry is the single source of shared mutable state in the
//! controller: a map of per-producer scopes, a monotonic change
//! counter, and the last successfully applied snapshot. Every mutation
//! and every read crosses one mutex; nothing holds it across I/O.
//!
//! Producers own one scope each and feed it through
//! [`ScopeRegistry::replace`], flipping [`ScopeRegistry::mark_ready`]
//! once their initial synchronization is complete. The reconciler is
//! the only consumer of [`ScopeRegistry::snapshot_if_changed_and_ready`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::record::{Record, RecordType, ensure_dot_suffix};
use crate::snapshot::Snapshot;

/// A group of record intents owned by one producer
struct Scope {
    /// String id for this scope
    name: String,

    /// Set once the owning producer has performed an initial
    /// synchronization of records
    ready: bool,

    /// Record intents, keyed by a producer-chosen record name
    records: HashMap<String, Vec<Record>>,
}

struct RegistryInner {
    /// Scopes, created lazily on first reference and never destroyed
    scopes: HashMap<String, Scope>,

    /// Change counter; bumped on every record mutation so steady-state
    /// iterations can skip all work
    version: u64,

    /// The last snapshot successfully applied to the backend, kept as
    /// the incremental-diff baseline
    last_applied: Option<Arc<Snapshot>>,
}

impl RegistryInner {
    /// Retrieve or create a scope. The mutex must be held.
    fn scope_mut(&mut self, scope_name: &str) -> &mut Scope {
        self.scopes
            .entry(scope_name.to_string())
            .or_insert_with(|| Scope {
                name: scope_name.to_string(),
                ready: false,
                records: HashMap::new(),
            })
    }
}

/// Thread-safe store of per-scope record intents
///
/// All operations take `&self`; interior mutability is a single
/// [`Mutex`] held only for map manipulation, never across suspension
/// points.
pub struct ScopeRegistry {
    inner: Mutex<RegistryInner>,
}

impl ScopeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                scopes: HashMap::new(),
                version: 0,
                last_applied: None,
            }),
        }
    }

    /// Set a scope's readiness flag, creating the scope if absent
    ///
    /// Readiness changes do not bump the change counter: they re-gate
    /// snapshot production without forcing a reapply of unchanged
    /// records.
    pub fn mark_ready(&self, scope_name: &str, ready: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.scope_mut(scope_name).ready = ready;
    }

    /// Replace the records stored under `record_name` in a scope
    ///
    /// Passing an empty list removes the entry. FQDNs (and the target
    /// names carried by `ALIAS` records) are canonicalized to end
    /// with a trailing dot here, on entry.
    pub fn replace(&self, scope_name: &str, record_name: &str, records: Vec<Record>) {
        debug!("update {}/{}: {} record(s)", scope_name, record_name, records.len());

        let records: Vec<Record> = records
            .into_iter()
            .map(|mut r| {
                r.fqdn = ensure_dot_suffix(&r.fqdn);
                if r.record_type == RecordType::Alias {
                    r.value = ensure_dot_suffix(&r.value);
                }
                r
            })
            .collect();

        let mut inner = self.inner.lock().unwrap();
        let scope = inner.scope_mut(scope_name);
        if records.is_empty() {
            scope.records.remove(record_name);
        } else {
            scope.records.insert(record_name.to_string(), records);
        }
        inner.version += 1;
    }

    /// Current change-counter value
    pub fn version(&self) -> u64 {
        self.inner.lock().unwrap().version
    }

    /// Version of the last successfully applied snapshot, if any
    pub fn last_applied_version(&self) -> Option<u64> {
        let inner = self.inner.lock().unwrap();
        inner.last_applied.as_ref().map(|s| s.version())
    }

    /// Materialize a snapshot if state changed since the last apply and
    /// every scope is ready
    ///
    /// Returns `None` in steady state (version unchanged since the
    /// last successful apply) or while any scope is still syncing.
    /// The mutex is released before this returns; producers may mutate
    /// further during apply; the snapshot is a stable cut.
    pub(crate) fn snapshot_if_changed_and_ready(&self) -> Option<Snapshot> {
        let inner = self.inner.lock().unwrap();

        if let Some(last) = &inner.last_applied
            && last.version() == inner.version
        {
            debug!("no changes since DNS values last successfully applied");
            return None;
        }

        for scope in inner.scopes.values() {
            if !scope.ready {
                info!("scope not yet ready: {}", scope.name);
                return None;
            }
        }

        let mut records = Vec::new();
        let mut alias_targets: HashMap<String, Vec<Record>> = HashMap::new();
        for scope in inner.scopes.values() {
            for scope_records in scope.records.values() {
                for record in scope_records {
                    if record.alias_target {
                        alias_targets
                            .entry(record.fqdn.clone())
                            .or_default()
                            .push(record.clone());
                    } else {
                        records.push(record.clone());
                    }
                }
            }
        }

        Some(Snapshot::new(inner.version, records, alias_targets))
    }

    /// The last successfully applied snapshot, if any
    pub(crate) fn last_applied(&self) -> Option<Arc<Snapshot>> {
        self.inner.lock().unwrap().last_applied.clone()
    }

    /// Store a snapshot as the new incremental-diff baseline
    ///
    /// Snapshot versions are cut from the change counter, so the
    /// committed version never decreases over the life of the process.
    pub(crate) fn commit(&self, snapshot: Snapshot) {
        let mut inner = self.inner.lock().unwrap();
        inner.last_applied = Some(Arc::new(snapshot));
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
