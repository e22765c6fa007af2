//! The deployment sequence: resolve the factory, submit, wait, report.

mod state;

pub use state::{DeploymentState, Outcome};

use alloy_core::primitives::{Address, B256};
use state::StateTracker;

use crate::{
    DeployError, DeploymentRequest,
    artifact::ArtifactSource,
    client::ContractClient,
    config::NetworkProfile,
    factory::ContractFactory,
};

/// A contract that was deployed and confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    pub contract_name: String,
    pub contract_address: Address,
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    /// Name of the network profile deployed to.
    pub network: String,
}

/// Runs one deployment against one network.
///
/// A sequencer is single-use: once it reported an outcome, further calls to
/// [`Sequencer::deploy`] fail with [`DeployError::AlreadyUsed`].
pub struct Sequencer<C, A> {
    profile: NetworkProfile,
    client: C,
    artifacts: A,
    tracker: StateTracker,
}

impl<C: ContractClient, A: ArtifactSource> Sequencer<C, A> {
    pub fn new(profile: NetworkProfile, client: C, artifacts: A) -> Self {
        Self {
            profile,
            client,
            artifacts,
            tracker: StateTracker::new(),
        }
    }

    pub fn profile(&self) -> &NetworkProfile {
        &self.profile
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Current state.
    pub fn state(&self) -> DeploymentState {
        self.tracker.current()
    }

    /// Every state entered so far, starting with [`DeploymentState::Idle`].
    pub fn history(&self) -> &[DeploymentState] {
        self.tracker.history()
    }

    /// Deploy `request` and wait for it to be included.
    pub async fn deploy(
        &mut self,
        request: &DeploymentRequest,
    ) -> Result<DeploymentResult, DeployError> {
        if self.state() != DeploymentState::Idle {
            return Err(DeployError::AlreadyUsed);
        }

        tracing::info!(
            network = %self.profile.name,
            endpoint = %self.profile.endpoint,
            contract = %request.contract_name(),
            "Starting deployment"
        );

        let outcome = run(
            &self.profile,
            &self.client,
            &self.artifacts,
            &mut self.tracker,
            request,
        )
        .await;

        match &outcome {
            Ok(result) => {
                self.tracker
                    .advance(DeploymentState::Reported(Outcome::Success));
                tracing::info!(
                    network = %result.network,
                    contract = %result.contract_name,
                    address = %result.contract_address,
                    tx_hash = %result.transaction_hash,
                    "Contract deployed"
                );
            }
            Err(e) => {
                let failed_in = self.state();
                self.tracker
                    .advance(DeploymentState::Reported(Outcome::Failure));
                tracing::error!(
                    network = %self.profile.name,
                    contract = %request.contract_name(),
                    state = %failed_in,
                    error = %e,
                    "Deployment failed"
                );
            }
        }

        outcome
    }
}

async fn run<C: ContractClient, A: ArtifactSource>(
    profile: &NetworkProfile,
    client: &C,
    artifacts: &A,
    tracker: &mut StateTracker,
    request: &DeploymentRequest,
) -> Result<DeploymentResult, DeployError> {
    if let Some(block_gas_limit) = profile.block_gas_limit {
        if profile.gas_limit > block_gas_limit {
            return Err(DeployError::GasLimitExceedsBlock {
                network: profile.name.clone(),
                gas_limit: profile.gas_limit,
                block_gas_limit,
            });
        }
    }

    let contract = request.contract_name();
    let artifact = artifacts
        .load(contract)
        .map_err(|source| DeployError::FactoryResolution {
            contract: contract.to_string(),
            source,
        })?;
    let factory = ContractFactory::new(client, artifact, profile.gas_limit);
    tracker.advance(DeploymentState::FactoryResolved);

    let tx = factory
        .deployment_transaction(request)
        .map_err(|source| DeployError::InvalidArguments {
            contract: contract.to_string(),
            source,
        })?;

    let pending = factory.deploy(tx).await?;
    tracker.advance(DeploymentState::Submitted);
    tracing::info!(
        network = %profile.name,
        tx_hash = %pending.tx_hash(),
        timeout = ?profile.confirmation_timeout,
        "Deployment submitted, waiting for confirmation"
    );

    let deployed = pending
        .await_deployment(profile.confirmation_timeout, profile.poll_interval)
        .await?;
    tracker.advance(DeploymentState::Confirmed);

    Ok(DeploymentResult {
        contract_name: factory.contract_name().to_string(),
        contract_address: deployed.address,
        transaction_hash: deployed.tx_hash,
        block_number: deployed.block_number,
        network: profile.name.clone(),
    })
}
