//! End-to-end properties of generated data.

use fakegen_core::{FieldValue, Row, SchemaDefinition};
use fakegen_generator::{
    run_partitioned, CancelToken, CollectSink, CrossRowScope, DataGenerator, GenerationError,
    RunConfig, RunError,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

fn generate(schema: &SchemaDefinition, config: &RunConfig) -> Vec<Row> {
    let mut generator = DataGenerator::new(schema, config).unwrap();
    let mut sink = CollectSink::new();
    generator.run(&mut sink, &CancelToken::new()).unwrap();
    sink.into_rows()
}

#[test]
fn test_auto_id_with_varchar() {
    let schema = SchemaDefinition::from_yaml(
        r#"
collection_name: documents
fields:
  - name: id
    type: Int64
    is_primary: true
    auto_id: true
  - name: title
    type: VarChar
    max_length: 100
"#,
    )
    .unwrap();

    let rows = generate(&schema, &RunConfig::new(10).with_seed(42));
    assert_eq!(rows.len(), 10);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.get("id"), Some(&FieldValue::Int(i as i64)));
        let len = row.get("title").unwrap().as_str().unwrap().chars().count();
        assert!((1..=100).contains(&len), "title length {len}");
    }
}

#[test]
fn test_nullable_float_null_fraction() {
    let schema = SchemaDefinition::from_yaml(
        r#"
collection_name: ratings
fields:
  - {name: id, type: Int64, is_primary: true, auto_id: true}
  - name: rating
    type: Float
    min: 1.0
    max: 5.0
    nullable: true
    null_probability: 0.5
"#,
    )
    .unwrap();

    let rows = generate(&schema, &RunConfig::new(1000).with_seed(7));
    let mut nulls = 0;
    for row in &rows {
        match row.get("rating").unwrap() {
            FieldValue::Null => nulls += 1,
            FieldValue::Float(x) => assert!((1.0..=5.0).contains(x), "rating {x}"),
            other => panic!("Expected Float or Null, got {other:?}"),
        }
    }
    let fraction = nulls as f64 / rows.len() as f64;
    assert!((0.4..=0.6).contains(&fraction), "null fraction {fraction}");
}

#[test]
fn test_tenant_partitioning() {
    let schema = SchemaDefinition::from_yaml(
        r#"
collection_name: multi_tenant
num_partitions: 128
fields:
  - {name: id, type: Int64, is_primary: true, auto_id: true}
  - name: tenant
    type: VarChar
    max_length: 16
    is_partition_key: true
    cardinality_ratio: 0.005
"#,
    )
    .unwrap();

    let rows = generate(&schema, &RunConfig::new(100_000).with_seed(42).with_batch_size(5000));
    assert_eq!(rows.len(), 100_000);

    let mut tenant_partition: HashMap<String, u32> = HashMap::new();
    for row in &rows {
        let tenant = row.get("tenant").unwrap().as_str().unwrap().to_string();
        let partition = row.partition.unwrap();
        assert!(partition < 128);
        let previous = *tenant_partition.entry(tenant).or_insert(partition);
        assert_eq!(previous, partition, "tenant moved between partitions");
    }

    let tenants = tenant_partition.len();
    assert!((475..=500).contains(&tenants), "distinct tenants {tenants}");
}

#[test]
fn test_two_primaries_reported() {
    let err = SchemaDefinition::from_yaml(
        r#"
collection_name: broken
fields:
  - {name: id_a, type: Int64, is_primary: true}
  - {name: id_b, type: VarChar, max_length: 10, is_primary: true}
"#,
    )
    .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("id_a"), "{message}");
    assert!(message.contains("id_b"), "{message}");
}

#[test]
fn test_values_respect_declared_bounds() {
    let schema = SchemaDefinition::from_yaml(
        r#"
collection_name: everything
fields:
  - {name: pk, type: VarChar, max_length: 24, is_primary: true}
  - {name: small, type: Int8, min: -5, max: 5}
  - {name: count, type: Int32, min: 10, max: 20}
  - {name: price, type: Double, min: 0.5, max: 9.5, precision: 2}
  - {name: flag, type: Bool}
  - {name: code, type: VarChar, max_length: 6}
  - {name: tags, type: Array, element_type: VarChar, max_capacity: 4, max_length: 5}
  - {name: scores, type: Array, element_type: Int16, max_capacity: 3, min: 0, max: 9}
  - {name: doc, type: JSON}
  - {name: dense, type: FloatVector, dim: 16, normalize: true}
  - {name: bits, type: BinaryVector, dim: 64}
  - {name: fp16, type: Float16Vector, dim: 10}
  - {name: bf16, type: BFloat16Vector, dim: 6, normalize: true}
  - {name: sparse, type: SparseFloatVector, dim: 50}
  - {name: tier, type: VarChar, max_length: 10, enum_values: [free, pro, max], enum_weights: [1, 2, 3]}
"#,
    )
    .unwrap();

    let rows = generate(&schema, &RunConfig::new(500).with_seed(1));
    let mut keys = HashSet::new();
    for row in &rows {
        assert!(keys.insert(row.get("pk").unwrap().as_str().unwrap().to_string()));

        let small = row.get("small").unwrap().as_i64().unwrap();
        assert!((-5..=5).contains(&small));
        let count = row.get("count").unwrap().as_i64().unwrap();
        assert!((10..=20).contains(&count));
        let price = row.get("price").unwrap().as_f64().unwrap();
        assert!((0.5..=9.5).contains(&price));
        assert!(((price * 100.0).round() - price * 100.0).abs() < 1e-6);
        assert!(row.get("flag").unwrap().as_bool().is_some());
        assert!(row.get("code").unwrap().as_str().unwrap().chars().count() <= 6);

        let tags = row.get("tags").unwrap().as_array().unwrap();
        assert!(tags.len() <= 4);
        assert!(tags.iter().all(|t| t.as_str().unwrap().chars().count() <= 5));
        let scores = row.get("scores").unwrap().as_array().unwrap();
        assert!(scores.len() <= 3);
        assert!(scores.iter().all(|s| (0..=9).contains(&s.as_i64().unwrap())));

        let doc = row.get("doc").unwrap().as_json().unwrap().as_object().unwrap();
        assert!((2..=4).contains(&doc.len()));

        let dense = row.get("dense").unwrap().as_float_vector().unwrap();
        assert_eq!(dense.len(), 16);
        let norm: f32 = dense.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm {norm}");

        match row.get("bits").unwrap() {
            FieldValue::BinaryVector(bytes) => assert_eq!(bytes.len(), 8),
            other => panic!("Expected BinaryVector, got {other:?}"),
        }
        match row.get("fp16").unwrap() {
            FieldValue::Float16Vector(bytes) => assert_eq!(bytes.len(), 20),
            other => panic!("Expected Float16Vector, got {other:?}"),
        }
        match row.get("bf16").unwrap() {
            FieldValue::BFloat16Vector(bytes) => assert_eq!(bytes.len(), 12),
            other => panic!("Expected BFloat16Vector, got {other:?}"),
        }
        match row.get("sparse").unwrap() {
            FieldValue::SparseFloatVector(entries) => {
                assert!((1..=16).contains(&entries.len()));
                for (index, value) in entries {
                    assert!(*index < 50);
                    assert!(*value > 0.0 && *value <= 1.0);
                }
            }
            other => panic!("Expected SparseFloatVector, got {other:?}"),
        }

        let tier = row.get("tier").unwrap().as_str().unwrap();
        assert!(["free", "pro", "max"].contains(&tier));
    }
}

#[test]
fn test_cardinality_converges() {
    let schema = SchemaDefinition::from_yaml(
        r#"
collection_name: users
fields:
  - {name: id, type: Int64, is_primary: true, auto_id: true}
  - {name: city, type: VarChar, max_length: 12, cardinality_ratio: 0.05}
  - {name: zip, type: Int32, min: 10000, max: 99999, cardinality_ratio: 0.05}
"#,
    )
    .unwrap();

    let total = 20_000;
    let rows = generate(&schema, &RunConfig::new(total).with_seed(5));
    let target = 0.05 * total as f64;

    for field in ["city", "zip"] {
        let distinct: HashSet<String> = rows
            .iter()
            .map(|row| format!("{:?}", row.get(field).unwrap()))
            .collect();
        let error = (distinct.len() as f64 - target).abs() / target;
        assert!(error <= 0.05, "{field}: {} distinct, target {target}", distinct.len());
    }
}

#[test]
fn test_same_seed_same_rows() {
    let schema = SchemaDefinition::from_yaml(
        r#"
collection_name: docs
fields:
  - {name: pk, type: Int64, is_primary: true}
  - {name: body, type: VarChar, max_length: 64, nullable: true}
  - {name: v, type: FloatVector, dim: 8}
  - {name: meta, type: JSON}
"#,
    )
    .unwrap();
    let config = RunConfig::new(300).with_seed(1234).with_batch_size(64);

    assert_eq!(generate(&schema, &config), generate(&schema, &config));
    assert_ne!(
        generate(&schema, &config),
        generate(&schema, &config.clone().with_seed(4321))
    );
}

#[test]
fn test_keyspace_exhaustion_names_field() {
    let schema = SchemaDefinition::from_yaml(
        r#"
collection_name: tiny
fields:
  - {name: pk, type: Int64, is_primary: true, min: 0, max: 9}
"#,
    )
    .unwrap();
    let mut config = RunConfig::new(20).with_seed(1);
    config.max_unique_attempts = 1000;

    let mut generator = DataGenerator::new(&schema, &config).unwrap();
    let err = generator
        .run(CollectSink::new(), &CancelToken::new())
        .unwrap_err();
    match err {
        RunError::Generation(GenerationError::ExhaustedKeyspace {
            field,
            attempts,
            row_index,
        }) => {
            assert_eq!(field, "pk");
            assert_eq!(attempts, 1000);
            assert_eq!(row_index, Some(10));
        }
        other => panic!("Expected ExhaustedKeyspace, got {other:?}"),
    }
}

#[test]
fn test_shared_keys_unique_across_workers() {
    let schema = SchemaDefinition::from_yaml(
        r#"
collection_name: docs
fields:
  - {name: pk, type: VarChar, max_length: 3, is_primary: true}
"#,
    )
    .unwrap();
    let config = RunConfig::new(4000).with_seed(9).with_batch_size(250);

    let keys: Mutex<Vec<String>> = Mutex::new(Vec::new());
    struct KeySink<'a>(&'a Mutex<Vec<String>>);
    impl fakegen_generator::BatchSink for KeySink<'_> {
        fn accept(
            &mut self,
            batch: fakegen_core::Batch,
        ) -> Result<(), fakegen_generator::SinkError> {
            let mut keys = self.0.lock().unwrap();
            for row in batch.rows {
                keys.push(row.get("pk").unwrap().as_str().unwrap().to_string());
            }
            Ok(())
        }
    }

    let summaries = run_partitioned(
        &schema,
        &config,
        4,
        CrossRowScope::default(),
        |_| Ok(KeySink(&keys)),
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(summaries.len(), 4);

    let keys = keys.into_inner().unwrap();
    assert_eq!(keys.len(), 4000);
    let distinct: HashSet<&String> = keys.iter().collect();
    assert_eq!(distinct.len(), 4000);
}
