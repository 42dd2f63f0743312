//! Synthetic JSON document generator.
//!
//! Documents follow the configured [`JsonShape`]: a handful of distinct
//! keys from the catalogue, each holding a small scalar.

use super::numeric::round_to_places;
use super::string::alphanumeric;
use crate::config::JsonShape;
use fakegen_core::FieldValue;
use rand::seq::index;
use rand::Rng;
use serde_json::{Map, Value};

/// Generate one JSON object following `shape`.
pub fn generate_json<R: Rng + ?Sized>(rng: &mut R, shape: &JsonShape) -> FieldValue {
    let key_count = rng.random_range(shape.min_keys..=shape.max_keys);
    let mut object = Map::new();

    for key_index in index::sample(rng, shape.keys.len(), key_count) {
        let value = random_scalar(rng);
        object.insert(shape.keys[key_index].clone(), value);
    }

    FieldValue::Json(Value::Object(object))
}

fn random_scalar<R: Rng + ?Sized>(rng: &mut R) -> Value {
    match rng.random_range(0..4u8) {
        0 => Value::from(rng.random_range(0..=1000i64)),
        1 => Value::from(round_to_places(rng.random::<f64>(), 4)),
        2 => Value::Bool(rng.random_bool(0.5)),
        _ => Value::String(alphanumeric(rng, 8)),
    }
}
