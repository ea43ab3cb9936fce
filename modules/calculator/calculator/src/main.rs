//! Calculator server binary.
//!
//! Configuration is layered: defaults, then `--config <file.yaml>`, then
//! `CALCULATOR__*` environment variables, then command-line flags.

use std::path::PathBuf;

use clap::Parser;

use calcstream_bootstrap::{init_logging, shutdown_token};
use calcstream_transport_grpc::ReadySignal;
use calculator::{CalculatorModule, CalculatorServerConfig};

/// Calculator gRPC server
#[derive(Parser)]
#[command(name = "calculator-server", version, about)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the configuration (e.g. 127.0.0.1:50051)
    #[arg(long)]
    listen_addr: Option<String>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CalculatorServerConfig::load(cli.config.as_deref())?;
    if let Some(listen_addr) = cli.listen_addr {
        config.listen_addr = listen_addr;
    }
    config.logging = config.logging.with_verbosity(cli.verbose);

    init_logging(&config.logging)?;
    tracing::info!(listen_addr = %config.listen_addr, "calculator server starting");

    let listen = config.listen()?;
    let cancel = shutdown_token();
    let (ready, ready_rx) = ReadySignal::channel();

    let module = CalculatorModule::new();
    let server = tokio::spawn(async move { module.serve(listen, cancel, ready).await });

    if let Ok(endpoint) = ready_rx.await {
        tracing::info!(%endpoint, "Server started ...");
    }

    server.await??;
    tracing::info!("calculator server stopped");
    Ok(())
}
