//! Compiles schema fields into generation plans.
//!
//! Strategy priority, first match wins:
//!
//! 1. `auto_id` → sequence
//! 2. `enum_values` → uniform or weighted choice
//! 3. `cardinality_ratio` → pool sized to the rows the plan will cover
//! 4. primary key without `auto_id` → unique random
//! 5. otherwise → direct bounded random for the type
//!
//! Nullability wraps whichever strategy was chosen.

use crate::config::RunConfig;
use crate::error::GenerationError;
use crate::generators::ValueSpec;
use crate::partition::PartitionAssigner;
use crate::plan::{ChoicePlan, FieldPlan, Strategy};
use crate::pool::CardinalityPool;
use crate::rng::{derive_seed, rng_from_seed};
use crate::unique::{SeenKeys, Sequence, SharedKeys, UniqueKeys};
use fakegen_core::{EnumValue, FieldDefinition, FieldValue, SchemaDefinition};
use std::collections::HashSet;
use tracing::debug;

/// Everything outside a field definition that shapes its plan.
#[derive(Debug, Clone)]
pub struct ResolveContext<'a> {
    /// Run configuration
    pub config: &'a RunConfig,
    /// Rows cardinality pools are sized for
    pub pool_rows: u64,
    /// Seed pool streams are derived from
    pub pool_seed: u64,
    /// Partition count for the partition-key field
    pub num_partitions: u32,
    /// Seen set shared with other workers, for random-mode primary keys
    pub shared_keys: Option<SharedKeys>,
}

impl<'a> ResolveContext<'a> {
    /// Context for a single-worker run over `config.total_rows` rows.
    pub fn new(schema: &SchemaDefinition, config: &'a RunConfig, seed: u64) -> Self {
        Self {
            config,
            pool_rows: config.total_rows,
            pool_seed: seed,
            num_partitions: effective_partitions(schema, config),
            shared_keys: None,
        }
    }
}

/// Partition count: the run config, else the schema, else 1.
pub fn effective_partitions(schema: &SchemaDefinition, config: &RunConfig) -> u32 {
    config
        .num_partitions
        .or(schema.num_partitions)
        .unwrap_or(1)
        .max(1)
}

/// Compile one field into its plan.
pub fn resolve_field(
    field: &FieldDefinition,
    ctx: &ResolveContext<'_>,
) -> Result<FieldPlan, GenerationError> {
    let strategy = if field.auto_id {
        Strategy::Sequence(Sequence::new(ctx.config.id_base))
    } else if let Some(members) = &field.enum_values {
        Strategy::Choice(resolve_choice(field, members)?)
    } else if let Some(ratio) = field.cardinality_ratio {
        Strategy::Pool(resolve_pool(field, ratio, ctx)?)
    } else if field.is_primary {
        let seen = match &ctx.shared_keys {
            Some(shared) => SeenKeys::Shared(shared.clone()),
            None => SeenKeys::Owned(HashSet::new()),
        };
        Strategy::UniqueRandom(UniqueKeys::new(
            ValueSpec::from_field(field, ctx.config)?,
            seen,
            ctx.config.max_unique_attempts,
        ))
    } else {
        Strategy::Direct(ValueSpec::from_field(field, ctx.config)?)
    };

    let null_probability = field
        .nullable
        .then(|| field.null_probability.unwrap_or(ctx.config.null_probability));

    debug!(
        field = %field.name,
        strategy = strategy.kind(),
        null_probability = ?null_probability,
        "Resolved field plan"
    );

    let plan = FieldPlan::new(&field.name, strategy, null_probability);
    Ok(if field.is_partition_key {
        plan.with_partitioner(PartitionAssigner::new(ctx.num_partitions))
    } else {
        plan
    })
}

/// Compile every field of a validated schema, in schema order.
pub fn resolve_schema(
    schema: &SchemaDefinition,
    ctx: &ResolveContext<'_>,
) -> Result<Vec<FieldPlan>, GenerationError> {
    schema
        .fields
        .iter()
        .map(|field| resolve_field(field, ctx))
        .collect()
}

fn resolve_choice(
    field: &FieldDefinition,
    members: &[EnumValue],
) -> Result<ChoicePlan, GenerationError> {
    if members.is_empty() {
        return Err(GenerationError::field_config(
            &field.name,
            "enum_values must not be empty",
        ));
    }
    let values: Vec<FieldValue> = members
        .iter()
        .map(|member| match member {
            EnumValue::Int(i) => FieldValue::Int(*i),
            EnumValue::Str(s) => FieldValue::String(s.clone()),
        })
        .collect();

    match &field.enum_weights {
        Some(weights) => ChoicePlan::weighted(&field.name, values, weights),
        None => Ok(ChoicePlan::uniform(values)),
    }
}

fn resolve_pool(
    field: &FieldDefinition,
    ratio: f64,
    ctx: &ResolveContext<'_>,
) -> Result<CardinalityPool, GenerationError> {
    if ctx.pool_rows == 0 {
        return Err(GenerationError::field_config(
            &field.name,
            "cardinality_ratio needs a known, positive row count",
        ));
    }
    let spec = ValueSpec::from_field(field, ctx.config)?;
    let size = CardinalityPool::pool_size(ratio, ctx.pool_rows);
    let mut rng = rng_from_seed(derive_seed(ctx.pool_seed, &field.name));
    let pool = CardinalityPool::build(
        &field.name,
        &spec,
        size,
        &mut rng,
        ctx.config.max_unique_attempts,
    )?;

    debug!(field = %field.name, ratio, pool_size = pool.len(), "Built cardinality pool");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RowStreams;
    use fakegen_core::FieldType;

    fn schema() -> SchemaDefinition {
        SchemaDefinition::from_yaml(
            r#"
collection_name: tenants
num_partitions: 16
fields:
  - name: id
    type: Int64
    is_primary: true
    auto_id: true
  - name: tenant
    type: VarChar
    max_length: 12
    is_partition_key: true
    cardinality_ratio: 0.01
  - name: tier
    type: VarChar
    max_length: 16
    enum_values: [free, pro]
  - name: score
    type: Float
    nullable: true
    null_probability: 0.3
  - name: note
    type: VarChar
    max_length: 32
    nullable: true
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_strategy_priority() {
        let schema = schema();
        let config = RunConfig::new(1000).with_seed(1);
        let ctx = ResolveContext::new(&schema, &config, 1);
        let plans = resolve_schema(&schema, &ctx).unwrap();

        let kinds: Vec<&str> = plans.iter().map(|p| p.strategy().kind()).collect();
        assert_eq!(kinds, ["sequence", "pool", "choice", "direct", "direct"]);

        assert_eq!(plans[1].partitioner().unwrap().num_partitions(), 16);
        assert!(plans[0].partitioner().is_none());

        assert_eq!(plans[0].null_probability(), None);
        assert_eq!(plans[3].null_probability(), Some(0.3));
        assert_eq!(plans[4].null_probability(), Some(0.1));

        match plans[1].strategy() {
            Strategy::Pool(pool) => assert_eq!(pool.len(), 10),
            other => panic!("Expected pool, got {other:?}"),
        }
    }

    #[test]
    fn test_primary_without_auto_id_is_unique_random() {
        let schema = SchemaDefinition::from_yaml(
            "collection_name: c\nfields:\n  - {name: pk, type: VarChar, max_length: 16, is_primary: true}\n",
        )
        .unwrap();
        let config = RunConfig::new(10);
        let ctx = ResolveContext::new(&schema, &config, 0);
        let plan = resolve_field(&schema.fields[0], &ctx).unwrap();
        assert_eq!(plan.strategy().kind(), "unique_random");

        let direct = resolve_field(&FieldDefinition::new("flag", FieldType::Bool), &ctx).unwrap();
        assert_eq!(direct.strategy().kind(), "direct");
    }

    #[test]
    fn test_config_partitions_override_schema() {
        let schema = schema();
        let config = RunConfig::new(10).with_num_partitions(4);
        assert_eq!(effective_partitions(&schema, &config), 4);
        assert_eq!(effective_partitions(&schema, &RunConfig::new(10)), 16);
    }

    #[test]
    fn test_pool_without_rows_is_rejected() {
        let schema = schema();
        let config = RunConfig::new(10);
        let mut ctx = ResolveContext::new(&schema, &config, 0);
        ctx.pool_rows = 0;

        let err = resolve_field(&schema.fields[1], &ctx).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidConfiguration { field: Some(ref f), .. } if f == "tenant"
        ));
    }

    #[test]
    fn test_pool_larger_than_domain_fails_resolution() {
        let schema = SchemaDefinition::from_yaml(
            r#"
collection_name: c
fields:
  - {name: id, type: Int64, is_primary: true, auto_id: true}
  - {name: bucket, type: Int8, min: 0, max: 9, cardinality_ratio: 0.5}
"#,
        )
        .unwrap();
        let config = RunConfig::new(100);
        let err = resolve_schema(&schema, &ResolveContext::new(&schema, &config, 0)).unwrap_err();
        assert!(err.to_string().contains("bucket"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let schema = schema();
        let config = RunConfig::new(500).with_seed(99);
        let ctx = ResolveContext::new(&schema, &config, 99);
        let mut first = resolve_schema(&schema, &ctx).unwrap();
        let mut second = resolve_schema(&schema, &ctx).unwrap();

        let streams = RowStreams::new(99);
        for row in 0..200 {
            let mut a = streams.for_row(row);
            let mut b = streams.for_row(row);
            for (x, y) in first.iter_mut().zip(second.iter_mut()) {
                assert_eq!(
                    x.generate(&mut a, row).unwrap(),
                    y.generate(&mut b, row).unwrap()
                );
            }
        }
    }
}
