//! Command-line interface for vecdb-fakegen
//!
//! # Usage Examples
//!
//! ## Validate
//! ```bash
//! vecdb-fakegen validate --schema collection.yaml
//! ```
//!
//! ## Preview
//! ```bash
//! vecdb-fakegen preview --schema collection.yaml --rows 5 --seed 42
//! ```
//!
//! ## Generate
//! ```bash
//! # 100k rows, 128 partitions, files rotated every 25k rows
//! vecdb-fakegen generate \
//!   --schema collection.yaml \
//!   --output-dir ./out \
//!   --rows 100000 --seed 42 \
//!   --num-partitions 128 --rows-per-file 25000
//!
//! # Same dataset from a run config file, with flags taking precedence
//! vecdb-fakegen generate --schema collection.yaml --output-dir ./out --config run.yaml --workers 4
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use fakegen_core::{SchemaDefinition, SchemaError};
use fakegen_generator::CancelToken;
use fakegen_jsonl::{CommonGenerateArgs, JsonlGenerateArgs, OutputOptions};
use std::path::PathBuf;
use vecdb_fakegen::{load_run_config, write_dataset, write_preview, DEFAULT_PREVIEW_ROWS};

#[derive(Parser)]
#[command(name = "vecdb-fakegen")]
#[command(about = "Generate schema-conformant synthetic datasets for vector databases")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a schema and report every violation
    Validate {
        /// Path to schema file (YAML or JSON)
        #[arg(long, short = 's')]
        schema: PathBuf,
    },

    /// Print generated rows as JSON lines to stdout
    Preview {
        #[command(flatten)]
        args: CommonGenerateArgs,
    },

    /// Write a dataset as JSONL files plus meta.json
    Generate {
        #[command(flatten)]
        args: JsonlGenerateArgs,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { schema } => run_validate(schema),
        Commands::Preview { args } => run_preview(args),
        Commands::Generate { args } => run_generate(args),
    }
}

fn run_validate(path: PathBuf) -> anyhow::Result<()> {
    match SchemaDefinition::from_file(&path) {
        Ok(schema) => {
            println!(
                "Schema '{}' is valid: {} fields",
                schema.collection_name,
                schema.fields.len()
            );
            Ok(())
        }
        Err(SchemaError::Invalid(violations)) => {
            println!("Schema {path:?} has {} violation(s):", violations.0.len());
            println!("{violations}");
            anyhow::bail!("schema validation failed")
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load schema from {path:?}")),
    }
}

fn run_preview(args: CommonGenerateArgs) -> anyhow::Result<()> {
    let schema = SchemaDefinition::from_file(&args.schema)
        .with_context(|| format!("Failed to load schema from {:?}", args.schema))?;
    let mut config = load_run_config(&args)?;
    if args.rows.is_none() && args.config.is_none() {
        config.total_rows = DEFAULT_PREVIEW_ROWS;
    }

    let stdout = std::io::stdout();
    write_preview(&schema, &config, stdout.lock()).context("Failed to generate preview")?;
    Ok(())
}

fn run_generate(args: JsonlGenerateArgs) -> anyhow::Result<()> {
    let schema = SchemaDefinition::from_file(&args.common.schema)
        .with_context(|| format!("Failed to load schema from {:?}", args.common.schema))?;
    let config = load_run_config(&args.common)?;

    tracing::info!(
        "Generating {} rows for '{}' (seed={:?}, workers={})",
        config.total_rows,
        schema.collection_name,
        config.seed,
        args.workers
    );

    let mut options = OutputOptions::new(&args.output_dir);
    options.rows_per_file = args.rows_per_file;
    options.workers = args.workers;

    let manifest = write_dataset(&schema, &config, &options, &CancelToken::new())
        .with_context(|| format!("Failed to write dataset to {:?}", args.output_dir))?;

    println!(
        "Wrote {} rows in {} files to {} (seed={}{})",
        manifest.generation.rows_written,
        manifest.files.len(),
        args.output_dir.display(),
        manifest.generation.seed,
        if manifest.generation.reproducible {
            ""
        } else {
            ", not reproducible"
        }
    );
    Ok(())
}
