//! Built-in zone provider implementations

pub mod memory;

pub use memory::MemoryZoneProvider;
