use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use voxgate::bootstrap::build_state;
use voxgate::config::{self, default_config_path};
use voxgate::logging::init_tracing;
use voxgate::{GatewayResult, Server};

#[derive(Debug, Parser)]
#[command(name = "voxgate", version, about = "Voice and text command gateway")]
struct Cli {
    /// Config file; created with defaults when missing.
    #[arg(long, env = "VOXGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding the config file.
    #[arg(long)]
    bind: Option<String>,

    /// Log level when RUST_LOG is not set.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            eprintln!("voxgate: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> GatewayResult<()> {
    let path = cli.config.unwrap_or_else(default_config_path);
    let mut config = config::load(&path)?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_tracing(&config.logging);
    tracing::info!("using config {}", path.display());

    let state = build_state(&config).await?;
    let server = Server::start(config.bind_addr()?, state).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.stop().await
}
