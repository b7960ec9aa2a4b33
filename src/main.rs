//! topsis-diagnose - Inspect a TOPSIS run over a weighted data file.
//!
//! Loads an entity/indicator matrix from JSON or YAML and prints a
//! diagnostic report, an input check, or a stage-by-stage calculation
//! trace as JSON on stdout. Logs go to stderr.
//!
//! Usage:
//!   topsis-diagnose data/regions.yaml --model 12 --step disaster_rank
//!   topsis-diagnose data/regions.json --expression "@TOPSIS_NEGATIVE:cost,risk"
//!   topsis-diagnose data/regions.json --trace

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use topsis_evaluator::adapters::WeightedDataLoader;
use topsis_evaluator::config::{init_tracing, AppConfig};
use topsis_evaluator::domain::foundation::{ModelId, StepId};
use topsis_evaluator::domain::topsis::{
    TopsisCalculator, TopsisConfiguration, TopsisDiagnostics, TopsisResultValidator,
    TOPSIS_ALGORITHM_CODE,
};

/// Diagnose TOPSIS scoring over a weighted data file.
#[derive(Parser)]
#[command(name = "topsis-diagnose")]
struct Args {
    /// Weighted data file (.json, .yaml or .yml).
    data: PathBuf,

    /// Model the data belongs to.
    #[arg(long, default_value_t = 0)]
    model: i64,

    /// Step code reported in the output.
    #[arg(long, default_value = "adhoc")]
    step: String,

    /// Configuration expression; all observed indicators are used when absent.
    #[arg(long)]
    expression: Option<String>,

    /// Output param for `--expression`; defaults to the configured one.
    #[arg(long)]
    output_param: Option<String>,

    /// Print the calculation trace instead of the report.
    #[arg(long, conflicts_with = "check_input")]
    trace: bool,

    /// Only inspect the input data.
    #[arg(long)]
    check_input: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    init_tracing(&config.logging)?;

    let data = WeightedDataLoader::new()
        .load(&args.data)
        .await
        .with_context(|| format!("failed to load {}", args.data.display()))?;
    info!(path = %args.data.display(), entities = data.len(), "Loaded weighted data");

    let diagnostics = TopsisDiagnostics::new(
        TopsisCalculator::new(config.topsis.calculator_settings()),
        TopsisResultValidator::new(config.topsis.validator_settings()),
    );
    let model_id = ModelId::new(args.model);

    let output = if args.check_input {
        serde_json::to_string_pretty(&diagnostics.validate_input_data(&data))?
    } else if args.trace {
        serde_json::to_string_pretty(&diagnostics.generate_calculation_log(&data, model_id, &args.step))?
    } else if let Some(expression) = args.expression.as_deref() {
        let output_param = args
            .output_param
            .clone()
            .unwrap_or_else(|| config.topsis.default_output_param.clone());
        let Some(configuration) = TopsisConfiguration::from_expression(
            Some(StepId::DETACHED),
            TOPSIS_ALGORITHM_CODE,
            output_param,
            expression,
        ) else {
            bail!("expression '{expression}' is not a valid TOPSIS directive");
        };
        let configuration = configuration.located_at(model_id, args.step.clone());
        serde_json::to_string_pretty(&diagnostics.diagnose_with_config(
            &data,
            model_id,
            &args.step,
            &configuration,
        ))?
    } else {
        serde_json::to_string_pretty(&diagnostics.diagnose(&data, model_id, &args.step))?
    };

    println!("{output}");
    Ok(())
}
