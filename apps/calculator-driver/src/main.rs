//! Calculator driver binary.
//!
//! `calculator-driver [NUMBERS]...` runs every call shape once against the
//! calculator service and exits non-zero on the first failure.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use calcstream_bootstrap::init_logging;
use calculator_driver::{DEFAULT_OPERANDS, Driver, DriverConfig, DriverInputs};
use calculator_sdk::{CalculatorGrpcClient, Operation};

/// Calculator driver
#[derive(Parser)]
#[command(name = "calculator-driver", version, about)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Calculator service URI, overrides the configuration
    #[arg(long)]
    endpoint: Option<String>,

    /// Per-call deadline in milliseconds, overrides the configuration
    #[arg(long)]
    call_timeout_ms: Option<u64>,

    /// Operations for the unary and client-streaming calls (e.g. `sum,division`)
    #[arg(long, value_delimiter = ',')]
    operations: Option<Vec<Operation>>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Operands: the first two are `a` and `b`, all of them are streamed
    #[arg(allow_negative_numbers = true)]
    numbers: Vec<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = DriverConfig::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(call_timeout_ms) = cli.call_timeout_ms {
        config.call_timeout_ms = call_timeout_ms;
    }
    config.logging = config.logging.with_verbosity(cli.verbose);

    init_logging(&config.logging)?;

    let client = CalculatorGrpcClient::connect(config.endpoint.clone(), &config.grpc_client_config())
        .await
        .with_context(|| format!("did not connect to {}", config.endpoint))?;

    let mut inputs = DriverInputs::from_args(cli.numbers, DEFAULT_OPERANDS);
    if let Some(operations) = cli.operations {
        inputs = inputs.with_operations(operations);
    }
    let driver = Driver::new(Arc::new(client));

    if let Err(e) = driver.run(&inputs).await {
        tracing::error!(error = %e, "calculator run aborted");
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_operations_and_numbers() {
        let cli = Cli::try_parse_from([
            "calculator-driver",
            "--operations",
            "sum,Division",
            "1",
            "-2",
        ])
        .unwrap();

        assert_eq!(
            cli.operations,
            Some(vec![Operation::Sum, Operation::Division])
        );
        assert_eq!(cli.numbers, vec![1.0, -2.0]);
    }

    #[test]
    fn test_rejects_unknown_operation() {
        let result = Cli::try_parse_from(["calculator-driver", "--operations", "modulo"]);
        assert!(result.is_err());
    }
}
