//! shipyard deploys a smart contract to one of a set of named networks.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use shipyard_deploy::{
    ArtifactDir, DeploymentRequest, ProfileResolver, RpcContractClient, Sequencer,
    ShipyardConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, stdout only carries the deployed address.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    let mut config =
        ShipyardConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Networks => {
            for (name, settings) in &config.networks {
                println!("{name}\t{}", settings.url);
            }
            Ok(())
        }
        Command::Deploy {
            network,
            contract,
            artifacts,
        } => {
            if let Some(contract) = contract {
                config.deployment.contract = contract;
            }
            if let Some(artifacts) = artifacts {
                config.deployment.artifacts = artifacts;
            }

            let resolver = ProfileResolver::new(config.networks, cli.private_key);
            let profile = resolver.resolve(&network)?;

            let request = DeploymentRequest::from_settings(&config.deployment)
                .context("Invalid deployment settings")?;
            let client = RpcContractClient::new(&profile)
                .context("Failed to create the RPC client")?;
            let artifacts = ArtifactDir::new(config.deployment.artifacts.clone());

            tracing::info!(
                network = %profile.name,
                contract = %request.contract_name(),
                artifacts = %artifacts.root().display(),
                sender = ?client.sender(),
                "Deploying contract..."
            );

            let mut sequencer = Sequencer::new(profile, client, artifacts);
            let result = sequencer.deploy(&request).await?;

            println!("{}", result.contract_address);
            Ok(())
        }
    }
}
