//! The record data model
//!
//! Producers describe desired DNS state as [`Record`] values grouped
//! under scope/record-name keys; the reconciler addresses the backend
//! by [`RecordKey`] (type + FQDN), the unit of record-set identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// DNS record type
///
/// `Alias` is controller-internal: an alias record names a group of
/// alias-target records to substitute at apply time, and is never
/// transmitted to the backend. The emitted key for an expanded alias
/// carries the *target's* type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
    /// CNAME record
    Cname,
    /// Controller-internal alias indirection
    Alias,
}

impl RecordType {
    /// Wire representation of the type, as submitted to backends
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Alias => "ALIAS",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single record intent supplied by a producer
///
/// Records are immutable values. The FQDN (and, for `Alias` records,
/// the target name in `value`) is canonicalized to end with a trailing
/// dot when the record enters the scope registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Fully qualified domain name this record is for
    pub fqdn: String,

    /// Record type
    pub record_type: RecordType,

    /// Record value. For `Alias` records this is the FQDN of the
    /// alias-target group to substitute.
    pub value: String,

    /// Marks this record as a candidate target for alias expansion.
    /// Alias targets are never emitted to the backend directly.
    #[serde(default)]
    pub alias_target: bool,
}

impl Record {
    /// Create a new record intent
    pub fn new(
        fqdn: impl Into<String>,
        record_type: RecordType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            fqdn: fqdn.into(),
            record_type,
            value: value.into(),
            alias_target: false,
        }
    }

    /// Mark or unmark this record as an alias-expansion target
    pub fn with_alias_target(mut self, alias_target: bool) -> Self {
        self.alias_target = alias_target;
        self
    }
}

/// The (type, FQDN) pair that uniquely identifies a backend record set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    /// Record type of the set
    pub record_type: RecordType,

    /// Canonical (dot-terminated) FQDN of the set
    pub fqdn: String,
}

impl RecordKey {
    /// Create a record key
    pub fn new(record_type: RecordType, fqdn: impl Into<String>) -> Self {
        Self {
            record_type,
            fqdn: fqdn.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.record_type, self.fqdn)
    }
}

/// Canonicalize a DNS name to end with a trailing dot
pub fn ensure_dot_suffix(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}
