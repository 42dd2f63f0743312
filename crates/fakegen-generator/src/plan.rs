//! Compiled per-field generation plans.

use crate::error::GenerationError;
use crate::generators::{ValueGenerator, ValueSpec};
use crate::partition::PartitionAssigner;
use crate::pool::CardinalityPool;
use crate::unique::{Sequence, UniqueKeys};
use fakegen_core::FieldValue;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use std::sync::Arc;

/// How a field's non-null values are produced.
#[derive(Debug)]
pub enum Strategy {
    /// Auto-id sequence
    Sequence(Sequence),
    /// Draw from a closed enum domain
    Choice(ChoicePlan),
    /// Draw with replacement from a pre-built pool
    Pool(CardinalityPool),
    /// Collision-checked random primary keys
    UniqueRandom(UniqueKeys),
    /// Bounded random value for the field type
    Direct(ValueSpec),
}

impl Strategy {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sequence(_) => "sequence",
            Self::Choice(_) => "choice",
            Self::Pool(_) => "pool",
            Self::UniqueRandom(_) => "unique_random",
            Self::Direct(_) => "direct",
        }
    }
}

/// Closed enum domain with optional weights.
#[derive(Debug, Clone)]
pub struct ChoicePlan {
    values: Vec<FieldValue>,
    weights: Option<WeightedIndex<f64>>,
}

impl ChoicePlan {
    /// Uniform choice over `values`.
    pub fn uniform(values: Vec<FieldValue>) -> Self {
        Self {
            values,
            weights: None,
        }
    }

    /// Weighted choice; `weights` must match `values` in length.
    pub fn weighted(
        field: &str,
        values: Vec<FieldValue>,
        weights: &[f64],
    ) -> Result<Self, GenerationError> {
        if weights.len() != values.len() {
            return Err(GenerationError::field_config(
                field,
                format!(
                    "enum_weights has {} entries but enum_values has {}",
                    weights.len(),
                    values.len()
                ),
            ));
        }
        let index = WeightedIndex::new(weights.iter().copied()).map_err(|e| {
            GenerationError::field_config(field, format!("invalid enum_weights: {e}"))
        })?;
        Ok(Self {
            values,
            weights: Some(index),
        })
    }

    /// Members of the domain.
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> FieldValue {
        let idx = match &self.weights {
            Some(index) => index.sample(rng),
            None => rng.random_range(0..self.values.len()),
        };
        self.values[idx].clone()
    }
}

/// Generation plan bound to one field for the length of a run.
#[derive(Debug)]
pub struct FieldPlan {
    name: Arc<str>,
    null_probability: Option<f64>,
    strategy: Strategy,
    partitioner: Option<PartitionAssigner>,
}

impl FieldPlan {
    /// Create a plan. `null_probability` is `None` for non-nullable fields.
    pub fn new(name: &str, strategy: Strategy, null_probability: Option<f64>) -> Self {
        Self {
            name: Arc::from(name),
            null_probability,
            strategy,
            partitioner: None,
        }
    }

    /// Attach the partition assigner of the partition-key field.
    pub fn with_partitioner(mut self, partitioner: PartitionAssigner) -> Self {
        self.partitioner = Some(partitioner);
        self
    }

    /// Field name, shared with every row built from this plan.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Strategy in use.
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Null probability, if the field is nullable.
    pub fn null_probability(&self) -> Option<f64> {
        self.null_probability
    }

    /// Partition assigner, if this is the partition-key field.
    pub fn partitioner(&self) -> Option<&PartitionAssigner> {
        self.partitioner.as_ref()
    }

    /// Produce this field's value for row `row_index`.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        row_index: u64,
    ) -> Result<FieldValue, GenerationError> {
        if let Some(p) = self.null_probability {
            if rng.random_bool(p) {
                return Ok(FieldValue::Null);
            }
        }

        match &mut self.strategy {
            Strategy::Sequence(seq) => seq.value_at(&self.name, row_index),
            Strategy::Choice(choice) => Ok(choice.draw(rng)),
            Strategy::Pool(pool) => Ok(pool.draw(rng)),
            Strategy::UniqueRandom(keys) => keys.next(&self.name, rng, row_index),
            Strategy::Direct(spec) => Ok(spec.generate(rng)),
        }
    }
}
