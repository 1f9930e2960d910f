//! Core traits for the zonesync controller
//!
//! This module defines the abstract backend interface the reconciler
//! drives. Backends plug in behind [`ZoneProvider`]; the controller
//! closes over the capability set and nothing else.

pub mod zone_provider;

pub use zone_provider::{RecordSet, RecordSetProvider, Zone, ZoneProvider, ZoneProviderFactory};
