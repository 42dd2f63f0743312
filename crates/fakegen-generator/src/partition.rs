//! Partition assignment from partition-key values.
//!
//! The partition of a row is a pure function of its partition-key value:
//! FNV-1a 64 over the value's canonical bytes, modulo the partition count.
//! Integers hash as little-endian `i64`, strings as their UTF-8 bytes. No
//! randomness is consumed, so the same tenant always lands in the same
//! partition across runs and workers.

use crate::rng::fnv1a_64;
use fakegen_core::FieldValue;

/// Partition of `value` among `num_partitions`, or `None` when the value
/// cannot be a partition key.
pub fn assign(value: &FieldValue, num_partitions: u32) -> Option<u32> {
    if num_partitions == 0 {
        return None;
    }
    let hash = match value {
        FieldValue::Int(i) => fnv1a_64(&i.to_le_bytes()),
        FieldValue::String(s) => fnv1a_64(s.as_bytes()),
        _ => return None,
    };
    Some((hash % u64::from(num_partitions)) as u32)
}

/// Partition assigner bound to the partition-key field's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionAssigner {
    num_partitions: u32,
}

impl PartitionAssigner {
    /// Create an assigner over `num_partitions` partitions (at least one).
    pub fn new(num_partitions: u32) -> Self {
        Self {
            num_partitions: num_partitions.max(1),
        }
    }

    /// Partition count.
    pub fn num_partitions(&self) -> u32 {
        self.num_partitions
    }

    /// Partition of `value`.
    pub fn assign(&self, value: &FieldValue) -> Option<u32> {
        assign(value, self.num_partitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_is_stable() {
        let tenant = FieldValue::String("acme".to_string());
        let first = assign(&tenant, 128).unwrap();
        for _ in 0..10 {
            assert_eq!(assign(&tenant, 128), Some(first));
        }
        assert!(first < 128);
    }

    #[test]
    fn test_assign_canonical_bytes() {
        assert_eq!(
            assign(&FieldValue::Int(7), 1000),
            Some((fnv1a_64(&7i64.to_le_bytes()) % 1000) as u32)
        );
        assert_eq!(
            assign(&FieldValue::String("a".to_string()), 7),
            Some((0xaf63_dc4c_8601_ec8c_u64 % 7) as u32)
        );
    }

    #[test]
    fn test_non_key_values() {
        assert_eq!(assign(&FieldValue::Null, 8), None);
        assert_eq!(assign(&FieldValue::Float(1.5), 8), None);
        assert_eq!(assign(&FieldValue::Int(1), 0), None);
    }

    #[test]
    fn test_single_partition() {
        let assigner = PartitionAssigner::new(1);
        assert_eq!(assigner.assign(&FieldValue::Int(12345)), Some(0));
        assert_eq!(PartitionAssigner::new(0).num_partitions(), 1);
    }

    #[test]
    fn test_spread_over_partitions() {
        let assigner = PartitionAssigner::new(16);
        let mut used = std::collections::HashSet::new();
        for i in 0..1000 {
            used.insert(assigner.assign(&FieldValue::Int(i)).unwrap());
        }
        assert_eq!(used.len(), 16);
    }
}
