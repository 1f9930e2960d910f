// # Memory Zone Provider
//
// In-memory implementation of the zone provider capability set.
//
// ## Purpose
//
// Provides a simple, fast backend that doesn't persist across
// restarts. Useful for tests, demos, and deployments where the
// controller is the sole author of the zones and a restart merely
// replays the producers.
//
// ## Semantics
//
// - `add` is upsert: an existing record set with the same name and
//   type is replaced.
// - `remove` fails when no record set matches, mirroring backends that
//   reject deletes of unknown sets.
// - Zones can be added at runtime; the reconciler picks them up on its
//   next iteration because the zone map is re-captured per iteration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::record::ensure_dot_suffix;
use crate::registry::ProviderRegistry;
use crate::traits::{RecordSet, RecordSetProvider, Zone, ZoneProvider, ZoneProviderFactory};

/// In-memory zone provider
///
/// Cloning the provider (or listing its zones) hands out handles onto
/// the same shared record-set storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryZoneProvider {
    zones: Arc<RwLock<HashMap<String, MemoryZone>>>,
}

#[derive(Debug, Clone)]
struct MemoryZone {
    name: String,
    records: Arc<RwLock<Vec<RecordSet>>>,
}

impl MemoryZoneProvider {
    /// Create a provider hosting the given zones
    ///
    /// Zone names are canonicalized to end with a trailing dot.
    pub fn new<I, S>(zone_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let zones = zone_names
            .into_iter()
            .map(|name| {
                let name = ensure_dot_suffix(name.as_ref());
                (
                    name.clone(),
                    MemoryZone {
                        name,
                        records: Arc::new(RwLock::new(Vec::new())),
                    },
                )
            })
            .collect();

        Self {
            zones: Arc::new(RwLock::new(zones)),
        }
    }

    /// Add a hosted zone at runtime (no-op if it already exists)
    pub async fn add_zone(&self, name: &str) {
        let name = ensure_dot_suffix(name);
        let mut zones = self.zones.write().await;
        zones.entry(name.clone()).or_insert_with(|| MemoryZone {
            name,
            records: Arc::new(RwLock::new(Vec::new())),
        });
    }

    /// Snapshot of a zone's record sets, for assertions and debugging
    pub async fn record_sets_in(&self, zone_name: &str) -> Option<Vec<RecordSet>> {
        let zone_name = ensure_dot_suffix(zone_name);
        let zones = self.zones.read().await;
        let zone = zones.get(&zone_name)?;
        Some(zone.records.read().await.clone())
    }
}

#[async_trait]
impl ZoneProvider for MemoryZoneProvider {
    async fn list_zones(&self) -> Result<Vec<Box<dyn Zone>>> {
        let zones = self.zones.read().await;
        Ok(zones
            .values()
            .map(|zone| Box::new(zone.clone()) as Box<dyn Zone>)
            .collect())
    }

    fn supports_zones(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

impl Zone for MemoryZone {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn record_sets(&self) -> Option<Box<dyn RecordSetProvider>> {
        Some(Box::new(MemoryRecordSets {
            records: Arc::clone(&self.records),
            zone_name: self.name.clone(),
        }))
    }
}

struct MemoryRecordSets {
    records: Arc<RwLock<Vec<RecordSet>>>,
    zone_name: String,
}

#[async_trait]
impl RecordSetProvider for MemoryRecordSets {
    async fn list(&self) -> Result<Vec<RecordSet>> {
        Ok(self.records.read().await.clone())
    }

    async fn add(&self, record_set: RecordSet) -> Result<RecordSet> {
        let mut records = self.records.write().await;
        records.retain(|existing| {
            !(existing.name == record_set.name && existing.record_type == record_set.record_type)
        });
        records.push(record_set.clone());
        Ok(record_set)
    }

    async fn remove(&self, record_set: &RecordSet) -> Result<()> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|existing| {
            !(existing.name == record_set.name && existing.record_type == record_set.record_type)
        });
        if records.len() == before {
            return Err(Error::provider(format!(
                "record set {} {} not found in zone {}",
                record_set.name, record_set.record_type, self.zone_name
            )));
        }
        Ok(())
    }
}

/// Factory for [`MemoryZoneProvider`], selected by
/// [`ProviderConfig::Memory`]
pub struct MemoryZoneProviderFactory;

impl ZoneProviderFactory for MemoryZoneProviderFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Arc<dyn ZoneProvider>> {
        match config {
            ProviderConfig::Memory { zones } => Ok(Arc::new(MemoryZoneProvider::new(zones))),
            other => Err(Error::config(format!(
                "memory factory cannot build provider type {:?}",
                other.type_name()
            ))),
        }
    }
}

/// Register the memory provider factory under its type name
pub fn register(registry: &ProviderRegistry) {
    registry.register_provider("memory", Box::new(MemoryZoneProviderFactory));
}
