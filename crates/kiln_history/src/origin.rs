//! Provenance of a unit of work's outputs.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use kiln_common::WorkId;
use serde::{Deserialize, Serialize};

/// Identifies one build invocation: every unit of work executed by the same
/// engine shares it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildInvocationId(String);

impl BuildInvocationId {
    /// Generates a fresh random 128-bit identifier.
    pub fn generate() -> Self {
        Self(format!("{:032x}", rand::random::<u128>()))
    }

    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildInvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for BuildInvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuildInvocationId({})", self.0)
    }
}

/// Where and when the outputs now considered current were produced.
///
/// A reused result carries the metadata of the run that originally produced
/// its outputs, not of the current invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginMetadata {
    build_invocation_id: BuildInvocationId,
    producer: WorkId,
    execution_time_ms: u64,
    created_at_ms: u64,
}

impl OriginMetadata {
    /// Records outputs produced now by `producer` during `invocation`.
    pub fn new(invocation: BuildInvocationId, producer: WorkId, execution_time: Duration) -> Self {
        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            build_invocation_id: invocation,
            producer,
            execution_time_ms: execution_time.as_millis() as u64,
            created_at_ms,
        }
    }

    /// The build invocation that produced the outputs.
    pub fn build_invocation_id(&self) -> &BuildInvocationId {
        &self.build_invocation_id
    }

    /// The unit of work that produced the outputs.
    pub fn producer(&self) -> &WorkId {
        &self.producer
    }

    /// How long the producing execution took.
    pub fn execution_time(&self) -> Duration {
        Duration::from_millis(self.execution_time_ms)
    }

    /// Milliseconds since the Unix epoch at which the outputs were recorded.
    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_ids_are_128_bit_hex() {
        let id = BuildInvocationId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, BuildInvocationId::generate());
    }

    #[test]
    fn origin_records_producer_and_duration() {
        let origin = OriginMetadata::new(
            BuildInvocationId::new("build-1"),
            WorkId::new(":compile"),
            Duration::from_millis(1500),
        );
        assert_eq!(origin.build_invocation_id().as_str(), "build-1");
        assert_eq!(origin.producer().as_str(), ":compile");
        assert_eq!(origin.execution_time(), Duration::from_millis(1500));
        assert!(origin.created_at_ms() > 0);
    }

    #[test]
    fn origin_roundtrips_through_serde() {
        let origin = OriginMetadata::new(
            BuildInvocationId::generate(),
            WorkId::new(":jar"),
            Duration::from_millis(12),
        );
        let json = serde_json::to_string(&origin).unwrap();
        let back: OriginMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(origin, back);
    }
}
