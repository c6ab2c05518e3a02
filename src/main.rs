use clap::Parser;
use marquee::marquee_config::{AppConfig, Validate};
use marquee::marquee_log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// Marquee payments server
#[derive(Parser, Debug)]
#[command(name = "marquee", version, about)]
struct Cli {
    /// Env file to load before reading the environment (default: ./.env if present)
    #[arg(long, env = "MARQUEE_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Bind host, overrides MARQUEE_HOST
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides MARQUEE_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    marquee::marquee_log::init();

    let mut config = match AppConfig::load(cli.env_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid command-line override");
        return ExitCode::FAILURE;
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Marquee payments");

    match marquee::serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
