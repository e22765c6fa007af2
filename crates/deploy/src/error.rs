//! Error types surfaced by profile resolution and the deployment sequence.

use std::{path::PathBuf, time::Duration};

use alloy_core::primitives::B256;

use crate::{
    artifact::ArtifactError, client::ClientError, config::EndpointError, request::RequestError,
};

/// Errors raised while loading configuration or resolving a network profile.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown network profile '{name}' (known profiles: {known})")]
    UnknownProfile { name: String, known: String },

    #[error(
        "network profile '{profile}' requires a signing key, set the PRIVATE_KEY environment variable"
    )]
    MissingSecret { profile: String },

    #[error("PRIVATE_KEY is not a valid secp256k1 private key (required by network profile '{profile}')")]
    InvalidSigningKey { profile: String },

    #[error("invalid endpoint for network profile '{profile}'")]
    InvalidEndpoint {
        profile: String,
        #[source]
        source: EndpointError,
    },

    #[error("invalid setting for network profile '{profile}': {reason}")]
    InvalidSetting {
        profile: String,
        reason: &'static str,
    },

    #[error("configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to load configuration")]
    Load(#[source] Box<figment::Error>),
}

/// Terminal failures of a deployment attempt.
///
/// Nothing is retried: every variant ends the attempt and is reported to the operator.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to resolve contract factory '{contract}'")]
    FactoryResolution {
        contract: String,
        #[source]
        source: ArtifactError,
    },

    #[error("invalid constructor arguments for '{contract}'")]
    InvalidArguments {
        contract: String,
        #[source]
        source: RequestError,
    },

    #[error(
        "gas limit {gas_limit} of network profile '{network}' exceeds its block gas limit {block_gas_limit}"
    )]
    GasLimitExceedsBlock {
        network: String,
        gas_limit: u64,
        block_gas_limit: u64,
    },

    #[error("failed to submit deployment transaction")]
    Submission(#[source] ClientError),

    #[error("deployment transaction {tx_hash} was not confirmed within {timeout:?}")]
    ConfirmationTimeout { tx_hash: B256, timeout: Duration },

    #[error("deployment transaction {tx_hash} reverted")]
    DeploymentReverted { tx_hash: B256 },

    #[error("receipt of deployment transaction {tx_hash} carries no contract address")]
    MissingContractAddress { tx_hash: B256 },

    #[error("this sequencer already ran a deployment")]
    AlreadyUsed,
}
