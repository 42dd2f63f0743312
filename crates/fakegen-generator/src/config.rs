//! Run configuration.
//!
//! `RunConfig` holds everything about a generation run that is not part of
//! the schema. It deserializes from YAML with defaults for every key, so a
//! config file only needs the values it wants to change.

use crate::error::GenerationError;
use fakegen_core::schema::MAX_FLOAT_PRECISION;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default number of rows per batch.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Largest batch a run may request.
pub const MAX_BATCH_SIZE: usize = 100_000;

/// Default probability that a nullable field is null.
pub const DEFAULT_NULL_PROBABILITY: f64 = 0.1;

/// Default retry budget for unique values.
pub const DEFAULT_MAX_UNIQUE_ATTEMPTS: u32 = 100;

/// Configuration of a single generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Number of rows to generate
    pub total_rows: u64,

    /// Rows per batch handed to the sink
    pub batch_size: usize,

    /// Seed for the random source; a wall-clock seed is used when absent
    pub seed: Option<u64>,

    /// Null probability for nullable fields without their own override
    pub null_probability: f64,

    /// Partition count, overriding the schema's `num_partitions`
    pub num_partitions: Option<u32>,

    /// Decimal places for float fields without their own `precision`
    pub float_precision: Option<u32>,

    /// Shape of generated JSON documents
    pub json_shape: JsonShape,

    /// First value of auto-id sequences
    pub id_base: i64,

    /// Draws allowed per unique value before giving up
    pub max_unique_attempts: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            total_rows: 1000,
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
            null_probability: DEFAULT_NULL_PROBABILITY,
            num_partitions: None,
            float_precision: None,
            json_shape: JsonShape::default(),
            id_base: 0,
            max_unique_attempts: DEFAULT_MAX_UNIQUE_ATTEMPTS,
        }
    }
}

impl RunConfig {
    /// Create a config for `total_rows` rows with every other value defaulted.
    pub fn new(total_rows: u64) -> Self {
        Self {
            total_rows,
            ..Self::default()
        }
    }

    /// Parse a config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the default null probability.
    pub fn with_null_probability(mut self, probability: f64) -> Self {
        self.null_probability = probability;
        self
    }

    /// Override the partition count.
    pub fn with_num_partitions(mut self, num_partitions: u32) -> Self {
        self.num_partitions = Some(num_partitions);
        self
    }

    /// Check the configuration before any plan is resolved.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.total_rows == 0 {
            return Err(GenerationError::config("total_rows must be greater than 0"));
        }
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(GenerationError::config(format!(
                "batch_size must be in [1, {MAX_BATCH_SIZE}], got {}",
                self.batch_size
            )));
        }
        if !(0.0..=1.0).contains(&self.null_probability) {
            return Err(GenerationError::config(format!(
                "null_probability must be in [0, 1], got {}",
                self.null_probability
            )));
        }
        if self.num_partitions == Some(0) {
            return Err(GenerationError::config("num_partitions must be greater than 0"));
        }
        if let Some(precision) = self.float_precision {
            if precision > MAX_FLOAT_PRECISION {
                return Err(GenerationError::config(format!(
                    "float_precision must be at most {MAX_FLOAT_PRECISION}, got {precision}"
                )));
            }
        }
        if self.max_unique_attempts == 0 {
            return Err(GenerationError::config(
                "max_unique_attempts must be greater than 0",
            ));
        }
        self.json_shape.validate()
    }
}

/// Shape of synthetic JSON documents.
///
/// Each document is an object with between `min_keys` and `max_keys`
/// distinct keys drawn from `keys`. Every value is independently one of: an
/// integer in `[0, 1000]`, a float in `[0, 1)` rounded to 4 places, a bool,
/// or an 8-character alphanumeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JsonShape {
    /// Fewest keys per document
    pub min_keys: usize,

    /// Most keys per document
    pub max_keys: usize,

    /// Key catalogue
    pub keys: Vec<String>,
}

impl Default for JsonShape {
    fn default() -> Self {
        Self {
            min_keys: 2,
            max_keys: 4,
            keys: ["id", "name", "score", "active", "tag", "count"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl JsonShape {
    fn validate(&self) -> Result<(), GenerationError> {
        if self.keys.is_empty() {
            return Err(GenerationError::config("json_shape.keys must not be empty"));
        }
        let unique: HashSet<&String> = self.keys.iter().collect();
        if unique.len() != self.keys.len() {
            return Err(GenerationError::config("json_shape.keys must be distinct"));
        }
        if self.min_keys > self.max_keys || self.max_keys > self.keys.len() {
            return Err(GenerationError::config(format!(
                "json_shape needs min_keys <= max_keys <= {} (catalogue size), got {}..{}",
                self.keys.len(),
                self.min_keys,
                self.max_keys
            )));
        }
        Ok(())
    }
}
