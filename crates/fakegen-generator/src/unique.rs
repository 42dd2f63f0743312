//! Primary-key uniqueness.
//!
//! Two strategies: a sequence (`auto_id`), which is unique by construction,
//! and collision-checked random draws with a bounded retry budget. The
//! random strategy remembers every key it has issued, so its memory grows
//! linearly with the row count.

use crate::error::GenerationError;
use crate::generators::{ValueGenerator, ValueSpec};
use fakegen_core::FieldValue;
use rand::Rng;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Hashable identity of a scalar value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyRepr {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float, compared by bit pattern
    Float(u64),
    /// String
    Str(String),
}

impl KeyRepr {
    /// Identity of a scalar value; `None` for nulls and composite values.
    pub fn of(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(b) => Some(Self::Bool(*b)),
            FieldValue::Int(i) => Some(Self::Int(*i)),
            FieldValue::Float(f) => Some(Self::Float(f.to_bits())),
            FieldValue::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

/// Seen set shared by several workers of one run.
pub type SharedKeys = Arc<Mutex<HashSet<KeyRepr>>>;

/// Keys issued so far, owned by one plan or shared across workers.
#[derive(Debug)]
pub enum SeenKeys {
    /// Private to this plan
    Owned(HashSet<KeyRepr>),
    /// Shared with other workers of the same run
    Shared(SharedKeys),
}

impl SeenKeys {
    /// Record a key; returns false if it was already issued.
    pub fn insert(&mut self, key: KeyRepr) -> bool {
        match self {
            Self::Owned(set) => set.insert(key),
            Self::Shared(set) => set
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key),
        }
    }

    /// Number of keys issued.
    pub fn len(&self) -> usize {
        match self {
            Self::Owned(set) => set.len(),
            Self::Shared(set) => set.lock().unwrap_or_else(PoisonError::into_inner).len(),
        }
    }

    /// Check if no key has been issued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Monotonic auto-id sequence: row `i` gets `base + i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequence {
    base: i64,
}

impl Sequence {
    /// Create a sequence starting at `base`.
    pub fn new(base: i64) -> Self {
        Self { base }
    }

    /// Id for the given row index.
    pub fn value_at(&self, field: &str, row_index: u64) -> Result<FieldValue, GenerationError> {
        i64::try_from(row_index)
            .ok()
            .and_then(|offset| self.base.checked_add(offset))
            .map(FieldValue::Int)
            .ok_or_else(|| {
                GenerationError::field_config(
                    field,
                    format!("auto id sequence from {} overflows Int64 at row {row_index}", self.base),
                )
            })
    }
}

/// Random keys checked against everything issued so far.
#[derive(Debug)]
pub struct UniqueKeys {
    generator: ValueSpec,
    seen: SeenKeys,
    max_attempts: u32,
}

impl UniqueKeys {
    /// Create an enforcer drawing from `generator`.
    pub fn new(generator: ValueSpec, seen: SeenKeys, max_attempts: u32) -> Self {
        Self {
            generator,
            seen,
            max_attempts,
        }
    }

    /// Issue a value not issued before in this run.
    pub fn next<R: Rng + ?Sized>(
        &mut self,
        field: &str,
        rng: &mut R,
        row_index: u64,
    ) -> Result<FieldValue, GenerationError> {
        for _ in 0..self.max_attempts {
            let candidate = self.generator.generate(rng);
            match KeyRepr::of(&candidate) {
                Some(key) => {
                    if self.seen.insert(key) {
                        return Ok(candidate);
                    }
                }
                None => return Ok(candidate),
            }
        }

        Err(GenerationError::ExhaustedKeyspace {
            field: field.to_string(),
            attempts: self.max_attempts,
            row_index: Some(row_index),
        })
    }

    /// Number of keys issued so far.
    pub fn issued(&self) -> usize {
        self.seen.len()
    }
}
