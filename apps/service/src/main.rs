mod config;
mod probes;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use pulse::Scheduler;
use tracing::{error, info};

use config::{Network, Settings};

/// Polls chain RPC endpoints in jittered, never-overlapping cycles
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Deployment variant to monitor
    #[arg(long, value_enum, default_value_t = Network::Mainnet)]
    network: Network,

    /// Load environment variables from this file instead of `./.env`
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Axelar transaction hash file, overrides AXELAR_TX_FILE. Relative paths,
    /// including the default axelar.txt / axelar_testnet.txt, are resolved
    /// against the working directory
    #[arg(long, value_name = "PATH")]
    tx_file: Option<PathBuf>,

    /// Validate the configuration, print it and exit
    #[arg(long)]
    check_config: bool,
}

fn load_env_file(path: Option<&Path>) -> Result<(), dotenvy::Error> {
    match path {
        Some(path) => dotenvy::from_path(path),
        None => allow_missing(dotenvy::dotenv()),
    }
}

/// A missing `./.env` is fine, the environment may be set directly.
fn allow_missing<T>(loaded: Result<T, dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match loaded {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load before the subscriber so RUST_LOG from the file applies
    let env_loaded = load_env_file(cli.env_file.as_deref());
    logger::init();

    if let Err(e) = env_loaded {
        error!("Failed to load environment file: {e}");
        return ExitCode::FAILURE;
    }

    let settings = match Settings::from_env(cli.network) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let settings = match cli.tx_file {
        Some(tx_file) => settings.with_tx_file(tx_file),
        None => settings,
    };

    let client = match probes::http_client(settings.probe_timeout) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let descriptors = probes::build_probes(&settings, &client);
    let names: Vec<&str> = descriptors.iter().map(|d| d.name()).collect();

    info!("\n{settings}");
    info!(network = %settings.network, "Probe set: {}", names.join(", "));

    if cli.check_config {
        return ExitCode::SUCCESS;
    }

    let scheduler = Scheduler::new(descriptors, settings.scheduler_config());
    match scheduler.run().await {}
}
