//! Run configuration loading for the CLI.

use anyhow::Context;
use fakegen_generator::RunConfig;
use fakegen_jsonl::CommonGenerateArgs;

/// Build the run configuration: the `--config` file if given, then flags.
pub fn load_run_config(args: &CommonGenerateArgs) -> anyhow::Result<RunConfig> {
    let base = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read run config from {path:?}"))?;
            RunConfig::from_yaml(&raw)
                .with_context(|| format!("Failed to parse run config from {path:?}"))?
        }
        None => RunConfig::default(),
    };
    let config = args.apply(base);
    config.validate().context("Invalid run configuration")?;
    Ok(config)
}
