//! Immutable per-iteration snapshots
//!
//! A [`Snapshot`] is a stable cut of the scope registry, taken under
//! the registry mutex and consumed outside it. Alias resolution turns
//! the raw record partition into the canonical per-key value map the
//! reconciler diffs and applies.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::record::{Record, RecordKey, RecordType};

/// An immutable cut of the registry, sufficient to compute all backend
/// operations for one reconcile iteration
///
/// Only the most recent *successfully applied* snapshot is retained
/// (as the diff baseline); all others are discarded at the end of
/// their iteration.
#[derive(Debug)]
pub struct Snapshot {
    version: u64,
    records: Vec<Record>,
    alias_targets: HashMap<String, Vec<Record>>,
    record_values: HashMap<RecordKey, Vec<String>>,
}

impl Snapshot {
    pub(crate) fn new(
        version: u64,
        records: Vec<Record>,
        alias_targets: HashMap<String, Vec<Record>>,
    ) -> Self {
        Self {
            version,
            records,
            alias_targets,
            record_values: HashMap::new(),
        }
    }

    /// Registry version this snapshot was cut at
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The canonical per-key value map; empty until
    /// [`Snapshot::resolve_aliases`] has run
    pub fn record_values(&self) -> &HashMap<RecordKey, Vec<String>> {
        &self.record_values
    }

    /// Values for a single key, if present
    pub fn values_for(&self, key: &RecordKey) -> Option<&[String]> {
        self.record_values.get(key).map(Vec::as_slice)
    }

    /// Expand alias records and build the sorted per-key value map
    ///
    /// For every non-alias record the value lands under the record's
    /// own (type, FQDN) key. An `Alias` record substitutes the record
    /// set of the alias-target group named by its value: each target
    /// contributes its value under (target type, alias FQDN). Chained
    /// aliases are unsupported: a target that is itself of type
    /// `Alias` is skipped, never dereferenced.
    ///
    /// The sorted form is the diff key: two snapshots are equal at a
    /// key exactly when their sorted value sequences are equal.
    pub(crate) fn resolve_aliases(&mut self) {
        let mut values: HashMap<RecordKey, Vec<String>> = HashMap::new();

        for record in &self.records {
            if record.record_type == RecordType::Alias {
                if record.value == record.fqdn {
                    warn!(
                        "alias record {} refers to itself; expanding to nothing",
                        record.fqdn
                    );
                    continue;
                }

                let targets = self
                    .alias_targets
                    .get(&record.value)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                if targets.is_empty() {
                    info!(
                        "alias in record specified {:?}, but no records were found for that name",
                        record.value
                    );
                }
                for target in targets {
                    if target.record_type == RecordType::Alias {
                        debug!(
                            "skipping alias target {} of type ALIAS (chains are unsupported)",
                            target.fqdn
                        );
                        continue;
                    }
                    let key = RecordKey::new(target.record_type, record.fqdn.clone());
                    values.entry(key).or_default().push(target.value.clone());
                }
            } else {
                let key = RecordKey::new(record.record_type, record.fqdn.clone());
                values.entry(key).or_default().push(record.value.clone());
            }
        }

        // Normalize: the sorted sequence is what gets diffed and applied
        for list in values.values_mut() {
            list.sort_unstable();
        }

        self.record_values = values;
    }
}
