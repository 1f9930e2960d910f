//! Test doubles and common utilities for architecture contract tests
//!
//! The mock backend counts every list/add/remove call and supports
//! per-zone failure injection, so tests can assert exactly which
//! backend operations an iteration performed.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use zonesync_core::error::{Error, Result};
use zonesync_core::traits::{RecordSet, RecordSetProvider, Zone, ZoneProvider};
use zonesync_core::{ControllerConfig, DnsController, ensure_dot_suffix};

/// Per-zone mock state: stored record sets, call counters, and
/// failure switches
pub struct ZoneState {
    name: String,
    /// Current record sets in the zone
    pub records: Mutex<Vec<RecordSet>>,
    /// History of every record set passed to add()
    pub added: Mutex<Vec<RecordSet>>,
    /// Call counter for list()
    pub list_calls: AtomicUsize,
    /// Call counter for add()
    pub add_calls: AtomicUsize,
    /// Call counter for remove()
    pub remove_calls: AtomicUsize,
    /// When set, add() fails without touching the zone
    pub fail_adds: AtomicBool,
    /// When set, remove() fails without touching the zone
    pub fail_removes: AtomicBool,
}

impl ZoneState {
    fn new(name: String) -> Self {
        Self {
            name,
            records: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            add_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
            fail_adds: AtomicBool::new(false),
            fail_removes: AtomicBool::new(false),
        }
    }

    /// Snapshot of the zone's current record sets
    pub fn record_sets(&self) -> Vec<RecordSet> {
        self.records.lock().unwrap().clone()
    }

    /// Record sets added so far, in call order
    pub fn added_sets(&self) -> Vec<RecordSet> {
        self.added.lock().unwrap().clone()
    }

    /// add() calls plus remove() calls against this zone
    pub fn write_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst) + self.remove_calls.load(Ordering::SeqCst)
    }
}

/// A mock ZoneProvider with observable, injectable per-zone state
pub struct MockZoneProvider {
    zones: HashMap<String, Arc<ZoneState>>,
    /// Call counter for list_zones()
    pub list_zones_calls: AtomicUsize,
}

impl MockZoneProvider {
    /// Create a provider hosting the given zones
    pub fn new<'a>(zone_names: impl IntoIterator<Item = &'a str>) -> Self {
        let zones = zone_names
            .into_iter()
            .map(|name| {
                let name = ensure_dot_suffix(name);
                (name.clone(), Arc::new(ZoneState::new(name)))
            })
            .collect();
        Self {
            zones,
            list_zones_calls: AtomicUsize::new(0),
        }
    }

    /// Shared handle onto one zone's state
    pub fn zone(&self, name: &str) -> Arc<ZoneState> {
        Arc::clone(
            self.zones
                .get(&ensure_dot_suffix(name))
                .expect("zone exists in mock"),
        )
    }

    /// Total add() + remove() calls across every zone
    pub fn total_writes(&self) -> usize {
        self.zones.values().map(|z| z.write_calls()).sum()
    }

    /// Total backend calls of any kind (zone listing included)
    pub fn total_calls(&self) -> usize {
        self.list_zones_calls.load(Ordering::SeqCst)
            + self
                .zones
                .values()
                .map(|z| {
                    z.list_calls.load(Ordering::SeqCst)
                        + z.add_calls.load(Ordering::SeqCst)
                        + z.remove_calls.load(Ordering::SeqCst)
                })
                .sum::<usize>()
    }
}

#[async_trait]
impl ZoneProvider for MockZoneProvider {
    async fn list_zones(&self) -> Result<Vec<Box<dyn Zone>>> {
        self.list_zones_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .zones
            .values()
            .map(|state| {
                Box::new(MockZone {
                    state: Arc::clone(state),
                }) as Box<dyn Zone>
            })
            .collect())
    }

    fn supports_zones(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

struct MockZone {
    state: Arc<ZoneState>,
}

impl Zone for MockZone {
    fn name(&self) -> String {
        self.state.name.clone()
    }

    fn record_sets(&self) -> Option<Box<dyn RecordSetProvider>> {
        Some(Box::new(MockRecordSets {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockRecordSets {
    state: Arc<ZoneState>,
}

#[async_trait]
impl RecordSetProvider for MockRecordSets {
    async fn list(&self) -> Result<Vec<RecordSet>> {
        self.state.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.records.lock().unwrap().clone())
    }

    async fn add(&self, record_set: RecordSet) -> Result<RecordSet> {
        self.state.add_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_adds.load(Ordering::SeqCst) {
            return Err(Error::provider(format!(
                "injected add failure in zone {}",
                self.state.name
            )));
        }

        self.state.added.lock().unwrap().push(record_set.clone());

        let mut records = self.state.records.lock().unwrap();
        records.retain(|existing| {
            !(existing.name == record_set.name && existing.record_type == record_set.record_type)
        });
        records.push(record_set.clone());
        Ok(record_set)
    }

    async fn remove(&self, record_set: &RecordSet) -> Result<()> {
        self.state.remove_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_removes.load(Ordering::SeqCst) {
            return Err(Error::provider(format!(
                "injected remove failure in zone {}",
                self.state.name
            )));
        }

        let mut records = self.state.records.lock().unwrap();
        let before = records.len();
        records.retain(|existing| {
            !(existing.name == record_set.name && existing.record_type == record_set.record_type)
        });
        if records.len() == before {
            return Err(Error::provider(format!(
                "record set {} not found in zone {}",
                record_set.name, self.state.name
            )));
        }
        Ok(())
    }
}

/// Controller over a mock provider, with the event receiver dropped
pub fn controller_over(provider: &Arc<MockZoneProvider>) -> DnsController {
    let provider: Arc<dyn ZoneProvider> = Arc::clone(provider) as Arc<dyn ZoneProvider>;
    let (controller, _events) = DnsController::new(provider, ControllerConfig::default())
        .expect("controller construction succeeds");
    controller
}
