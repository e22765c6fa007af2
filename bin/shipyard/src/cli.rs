use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shipyard_deploy::config::LOCAL_PROFILE;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "shipyard")]
#[command(
    author,
    version,
    about = "Deploy a smart contract to a named network"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, global = true, env = "SHIPYARD_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to a Shipyard.toml configuration file.
    ///
    /// If not provided, ./Shipyard.toml is used when it exists.
    #[arg(long, global = true, alias = "conf", env = "SHIPYARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Private key signing transactions on remote networks.
    ///
    /// Ignored by networks that do not require one.
    #[arg(long, global = true, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy the configured contract and print its address.
    Deploy {
        /// The network profile to deploy to.
        #[arg(short, long, env = "SHIPYARD_NETWORK", default_value = LOCAL_PROFILE)]
        network: String,

        /// Contract to deploy, overriding `deployment.contract`.
        #[arg(long)]
        contract: Option<String>,

        /// Build artifacts directory, overriding `deployment.artifacts`.
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },

    /// List the known network profiles.
    Networks,
}
