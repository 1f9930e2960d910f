//! The DNS reconciliation controller
//!
//! The controller continuously aligns a backend's hosted zones with
//! the aggregate desired state held in the scope registry:
//!
//! 1. Cut a snapshot when state changed and every scope is ready
//! 2. Capture the backend's zone map for this iteration
//! 3. Expand aliases into the canonical per-key value map
//! 4. Diff against the last successfully applied snapshot
//! 5. Apply per-key creates/deletes with error isolation
//! 6. Commit the snapshot as the new baseline only on full success
//!
//! One bad record must not block the others: per-key errors are
//! collected, the iteration is reported failed, and the failed keys
//! are retried next cycle because the baseline was not advanced.
//!
//! ## Threading
//!
//! Producers call [`DnsController::replace`] and
//! [`DnsController::mark_ready`] from any task; a single reconciler
//! task runs [`DnsController::run`]. The registry mutex is held only
//! while cutting snapshots and committing baselines, never across
//! backend I/O, so producers are never blocked on DNS latency.

mod dnsop;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::error::{Error, Result};
use crate::record::{Record, RecordType};
use crate::scopes::ScopeRegistry;
use crate::snapshot::Snapshot;
use crate::traits::ZoneProvider;

use dnsop::DnsOp;

/// Events emitted by the controller for external monitoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The reconcile loop started
    Started,

    /// A snapshot passed gating and apply began
    ApplyStarted {
        /// Registry version the snapshot was cut at
        version: u64,
    },

    /// A record set was created/replaced on the backend
    RecordSetApplied {
        /// Canonical FQDN of the set
        fqdn: String,
        /// Type of the set
        record_type: RecordType,
    },

    /// A record set was removed from the backend
    RecordSetRemoved {
        /// Canonical FQDN of the set
        fqdn: String,
        /// Type of the set
        record_type: RecordType,
    },

    /// An iteration applied cleanly and committed its baseline
    ApplySucceeded {
        /// Committed snapshot version
        version: u64,
        /// Record sets created/replaced
        updated: usize,
        /// Record sets removed
        deleted: usize,
    },

    /// An iteration failed; the baseline was not advanced
    ApplyFailed {
        /// Version of the snapshot that failed to apply
        version: u64,
        /// First collected error
        error: String,
    },

    /// The reconcile loop exited
    Stopped {
        /// Why the loop exited
        reason: String,
    },
}

/// Result of a single reconcile iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing to do: state unchanged since the last successful apply,
    /// or some scope is not yet ready
    Idle,

    /// The snapshot applied cleanly and is now the baseline
    Applied {
        /// Record sets created/replaced
        updated: usize,
        /// Record sets removed
        deleted: usize,
    },

    /// A stop request interrupted the iteration; no baseline committed
    Cancelled,
}

/// Observable controller state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerStatus {
    /// Version of the last successfully applied snapshot
    pub last_applied_version: Option<u64>,

    /// Wall-clock time of the last successful apply
    pub last_applied_at: Option<DateTime<Utc>>,

    /// Failed iterations since the last success
    pub consecutive_errors: u64,
}

#[derive(Default)]
struct StatusInner {
    last_applied_at: Option<DateTime<Utc>>,
    consecutive_errors: u64,
}

/// The reconciliation controller
///
/// Constructed over an abstract [`ZoneProvider`]; see
/// [`crate::provider::memory`] for the reference backend and
/// [`crate::registry::ProviderRegistry`] for plugin selection.
pub struct DnsController {
    registry: ScopeRegistry,
    provider: Arc<dyn ZoneProvider>,
    config: ControllerConfig,
    stop: watch::Sender<bool>,
    event_tx: mpsc::Sender<ControllerEvent>,
    status: Mutex<StatusInner>,
}

impl DnsController {
    /// Create a controller over the given backend
    ///
    /// Fails fast on invalid configuration or a provider that does not
    /// support hosted zones.
    ///
    /// # Returns
    ///
    /// A tuple of (controller, event_receiver) where event_receiver
    /// yields [`ControllerEvent`]s. Dropping the receiver is fine; the
    /// controller never blocks on it.
    pub fn new(
        provider: Arc<dyn ZoneProvider>,
        config: ControllerConfig,
    ) -> Result<(Self, mpsc::Receiver<ControllerEvent>)> {
        config.validate()?;

        if !provider.supports_zones() {
            return Err(Error::config(format!(
                "DNS provider {:?} does not support zones",
                provider.provider_name()
            )));
        }

        let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity);
        let (stop, _) = watch::channel(false);

        let controller = Self {
            registry: ScopeRegistry::new(),
            provider,
            config,
            stop,
            event_tx,
            status: Mutex::new(StatusInner::default()),
        };

        Ok((controller, event_rx))
    }

    /// Set a scope's readiness flag, creating the scope if absent
    pub fn mark_ready(&self, scope_name: &str, ready: bool) {
        self.registry.mark_ready(scope_name, ready);
    }

    /// Replace the records stored under `record_name` in a scope;
    /// an empty list removes the entry
    pub fn replace(&self, scope_name: &str, record_name: &str, records: Vec<Record>) {
        self.registry.replace(scope_name, record_name, records);
    }

    /// The underlying scope registry, for embedders that hand
    /// producers a narrower handle
    pub fn registry(&self) -> &ScopeRegistry {
        &self.registry
    }

    /// Current observable state
    pub fn status(&self) -> ControllerStatus {
        let status = self.status.lock().unwrap();
        ControllerStatus {
            last_applied_version: self.registry.last_applied_version(),
            last_applied_at: status.last_applied_at,
            consecutive_errors: status.consecutive_errors,
        }
    }

    /// Request the reconcile loop to stop
    ///
    /// Idempotent. The loop observes the request between iterations
    /// and between per-key backend operations, so shutdown latency is
    /// bounded by one in-flight backend call.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    fn stop_requested(&self) -> bool {
        *self.stop.borrow()
    }

    /// Run the reconcile loop until [`DnsController::stop`] is called
    ///
    /// Iteration errors are logged and drive backoff; they are never
    /// returned from this method.
    pub async fn run(&self) -> Result<()> {
        info!(
            "starting DNS controller (provider: {})",
            self.provider.provider_name()
        );
        self.emit(ControllerEvent::Started);

        let mut stop_rx = self.stop.subscribe();
        loop {
            if self.stop_requested() {
                break;
            }

            let result = self.reconcile_once().await;

            if self.stop_requested() {
                break;
            }

            let delay = match result {
                Ok(ReconcileOutcome::Cancelled) => break,
                // Simple debouncing; DNS servers are typically pretty
                // slow anyway
                Ok(_) => self.config.debounce_interval(),
                Err(e) => {
                    warn!("unexpected error in DNS controller, will retry: {}", e);
                    self.config.error_backoff()
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = stop_rx.changed() => break,
            }
        }

        info!("shutting down DNS controller");
        self.emit(ControllerEvent::Stopped {
            reason: "stop requested".to_string(),
        });
        Ok(())
    }

    /// Perform a single reconcile iteration
    ///
    /// Public so embedders can drive one-shot synchronization (and so
    /// the loop timing can be taken out of tests). Returns the first
    /// collected error when any per-key operation failed; the
    /// snapshot is committed as the new baseline only when the
    /// iteration was error-free.
    pub async fn reconcile_once(&self) -> Result<ReconcileOutcome> {
        let Some(mut snapshot) = self.registry.snapshot_if_changed_and_ready() else {
            return Ok(ReconcileOutcome::Idle);
        };
        let version = snapshot.version();

        // Capture the zone map fresh each iteration so newly created
        // zones are picked up
        let op = match DnsOp::new(self.provider.as_ref()).await {
            Ok(op) => op,
            Err(e) => return Err(self.fail_iteration(version, e)),
        };

        snapshot.resolve_aliases();
        self.emit(ControllerEvent::ApplyStarted { version });

        let baseline = self.registry.last_applied();
        let old_values = baseline.as_deref().map(Snapshot::record_values);

        let ttl = self.config.default_ttl_secs;
        let mut errors: Vec<Error> = Vec::new();
        let mut updated = 0usize;
        let mut deleted = 0usize;

        // Check each key for changes and apply them
        for (key, new_values) in snapshot.record_values() {
            if self.stop_requested() {
                return Ok(ReconcileOutcome::Cancelled);
            }

            let old = old_values.and_then(|values| values.get(key));
            if old.map(Vec::as_slice) == Some(new_values.as_slice()) {
                debug!("no change to records for {}", key);
                continue;
            }

            match op.update_records(key, new_values, ttl).await {
                Ok(()) => {
                    updated += 1;
                    self.emit(ControllerEvent::RecordSetApplied {
                        fqdn: key.fqdn.clone(),
                        record_type: key.record_type,
                    });
                }
                Err(e) => {
                    warn!("error updating records for {}: {}", key, e);
                    errors.push(e);
                }
            }
        }

        // Look for deleted keys
        if let Some(old_map) = old_values {
            for key in old_map.keys() {
                if self.stop_requested() {
                    return Ok(ReconcileOutcome::Cancelled);
                }
                if snapshot.record_values().contains_key(key) {
                    continue;
                }

                match op.delete_records(key).await {
                    Ok(()) => {
                        deleted += 1;
                        self.emit(ControllerEvent::RecordSetRemoved {
                            fqdn: key.fqdn.clone(),
                            record_type: key.record_type,
                        });
                    }
                    Err(e) => {
                        warn!("error deleting records for {}: {}", key, e);
                        errors.push(e);
                    }
                }
            }
        }

        if !errors.is_empty() {
            let first = errors.swap_remove(0);
            return Err(self.fail_iteration(version, first));
        }

        // Success: store the snapshot as the new baseline
        self.registry.commit(snapshot);
        {
            let mut status = self.status.lock().unwrap();
            status.consecutive_errors = 0;
            status.last_applied_at = Some(Utc::now());
        }
        self.emit(ControllerEvent::ApplySucceeded {
            version,
            updated,
            deleted,
        });

        Ok(ReconcileOutcome::Applied { updated, deleted })
    }

    fn fail_iteration(&self, version: u64, error: Error) -> Error {
        {
            let mut status = self.status.lock().unwrap();
            status.consecutive_errors += 1;
        }
        self.emit(ControllerEvent::ApplyFailed {
            version,
            error: error.to_string(),
        });
        error
    }

    fn emit(&self, event: ControllerEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(
                    "event channel full, dropping event; consider increasing event_channel_capacity"
                );
            }
            // Nobody is listening; that's allowed
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
