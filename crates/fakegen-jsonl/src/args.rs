//! CLI argument definitions for dataset generation.

use clap::Args;
use fakegen_generator::RunConfig;
use std::path::PathBuf;

/// Arguments shared by every command that generates rows.
///
/// Unset options fall back to the `--config` file, then to the defaults of
/// [`RunConfig`].
#[derive(Args, Clone, Debug)]
pub struct CommonGenerateArgs {
    /// Path to schema file (YAML or JSON)
    #[arg(long, short = 's', env = "FAKEGEN_SCHEMA")]
    pub schema: PathBuf,

    /// Number of rows to generate
    #[arg(long, env = "FAKEGEN_ROWS")]
    pub rows: Option<u64>,

    /// Rows per batch handed to the sink
    #[arg(long, env = "FAKEGEN_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Random seed for deterministic generation (same seed = same data)
    #[arg(long, env = "FAKEGEN_SEED")]
    pub seed: Option<u64>,

    /// Null probability for nullable fields without their own override
    #[arg(long)]
    pub null_probability: Option<f64>,

    /// Partition count, overriding the schema's num_partitions
    #[arg(long)]
    pub num_partitions: Option<u32>,

    /// Run configuration file (YAML); flags take precedence over it
    #[arg(long, short = 'c', env = "FAKEGEN_CONFIG")]
    pub config: Option<PathBuf>,
}

impl CommonGenerateArgs {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, mut config: RunConfig) -> RunConfig {
        if let Some(rows) = self.rows {
            config.total_rows = rows;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(p) = self.null_probability {
            config.null_probability = p;
        }
        if let Some(n) = self.num_partitions {
            config.num_partitions = Some(n);
        }
        config
    }
}

/// JSONL-specific generation arguments.
#[derive(Args, Clone, Debug)]
pub struct JsonlGenerateArgs {
    /// Output directory for data files and meta.json
    #[arg(long, short = 'o', env = "FAKEGEN_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Rows per data file before rotating to the next one
    #[arg(long, default_value_t = crate::sink::DEFAULT_ROWS_PER_FILE)]
    pub rows_per_file: u64,

    /// Worker threads; each writes its own contiguous slice of rows
    #[arg(long, default_value = "1")]
    pub workers: usize,

    #[command(flatten)]
    pub common: CommonGenerateArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CommonGenerateArgs {
        CommonGenerateArgs {
            schema: PathBuf::from("schema.yaml"),
            rows: None,
            batch_size: None,
            seed: None,
            null_probability: None,
            num_partitions: None,
            config: None,
        }
    }

    #[test]
    fn test_unset_flags_keep_config_values() {
        let mut file_config = RunConfig::new(500);
        file_config.seed = Some(9);
        file_config.batch_size = 50;

        let config = args().apply(file_config.clone());
        assert_eq!(config, file_config);
    }

    #[test]
    fn test_flags_override_config() {
        let mut args = args();
        args.rows = Some(10);
        args.seed = Some(1);
        args.num_partitions = Some(4);

        let config = args.apply(RunConfig::new(500).with_seed(9));
        assert_eq!(config.total_rows, 10);
        assert_eq!(config.seed, Some(1));
        assert_eq!(config.num_partitions, Some(4));
    }
}
