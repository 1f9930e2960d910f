//! Per-iteration DNS operation
//!
//! A [`DnsOp`] captures the backend's zone map once at the start of a
//! reconcile iteration and performs all of that iteration's create and
//! delete calls against it. Each iteration rebuilds the op, so zones
//! created between iterations are picked up automatically.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::{RecordKey, ensure_dot_suffix};
use crate::traits::{RecordSet, Zone, ZoneProvider};

pub(crate) struct DnsOp {
    /// Zones keyed by canonical (dot-terminated) name
    zones: HashMap<String, Box<dyn Zone>>,
}

impl DnsOp {
    /// Enumerate and capture the backend's zones
    pub(crate) async fn new(provider: &dyn ZoneProvider) -> Result<Self> {
        let zones = provider
            .list_zones()
            .await
            .map_err(|e| Error::provider(format!("error querying for zones: {e}")))?;

        let mut zone_map = HashMap::new();
        for zone in zones {
            zone_map.insert(ensure_dot_suffix(&zone.name()), zone);
        }

        Ok(Self { zones: zone_map })
    }

    /// Find the hosted zone with the longest suffix match for `fqdn`
    ///
    /// Strips the leftmost label until a zone name equals the
    /// remaining suffix or no label remains.
    fn find_zone(&self, fqdn: &str) -> Option<&dyn Zone> {
        let canonical = ensure_dot_suffix(fqdn);
        let mut zone_name: &str = &canonical;
        loop {
            if let Some(zone) = self.zones.get(zone_name) {
                return Some(zone.as_ref());
            }
            let dot = zone_name.find('.')?;
            zone_name = &zone_name[dot + 1..];
        }
    }

    /// Author the whole record set for `key`
    ///
    /// No prior list or content diff: the backend's `add` is treated
    /// as whole-record-set upsert.
    pub(crate) async fn update_records(
        &self,
        key: &RecordKey,
        values: &[String],
        ttl: u32,
    ) -> Result<()> {
        debug!("updating records for {}: {:?}", key, values);

        let zone = self
            .find_zone(&key.fqdn)
            .ok_or_else(|| Error::zone_not_found(&key.fqdn))?;
        let record_sets = zone
            .record_sets()
            .ok_or_else(|| Error::record_sets_unsupported(zone.name()))?;

        info!("creating resource record set {}", key);
        let record_set = RecordSet::new(&key.fqdn, key.record_type, ttl, values.to_vec());
        record_sets.add(record_set).await.map_err(|e| {
            Error::provider(format!("error creating resource record set {key}: {e}"))
        })?;

        Ok(())
    }

    /// Remove every record set in `key`'s zone whose canonical name and
    /// type both match
    ///
    /// Per-record errors are collected; the first is returned after
    /// attempting all.
    pub(crate) async fn delete_records(&self, key: &RecordKey) -> Result<()> {
        debug!("deleting all records for {}", key);

        let zone = self
            .find_zone(&key.fqdn)
            .ok_or_else(|| Error::zone_not_found(&key.fqdn))?;
        let record_sets = zone
            .record_sets()
            .ok_or_else(|| Error::record_sets_unsupported(zone.name()))?;

        let existing = record_sets.list().await.map_err(|e| {
            Error::provider(format!(
                "error querying resource record sets for zone {:?}: {e}",
                zone.name()
            ))
        })?;

        let mut errors = Vec::new();
        for record_set in existing {
            let name = ensure_dot_suffix(&record_set.name);
            if name != key.fqdn {
                debug!("skipping delete of record set {:?} (name != {})", name, key.fqdn);
                continue;
            }
            if record_set.record_type != key.record_type {
                debug!(
                    "skipping delete of record set {:?} (type {} != {})",
                    name, record_set.record_type, key.record_type
                );
                continue;
            }

            info!("removing resource record set {} {}", name, record_set.record_type);
            if let Err(e) = record_sets.remove(&record_set).await {
                warn!("error removing resource record set {} {}: {}", name, record_set.record_type, e);
                errors.push(e);
            }
        }

        match errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }
}
