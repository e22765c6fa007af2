//! shipyard-deploy - Smart contract deployment library.
//!
//! This crate resolves named network profiles (endpoint, signing key, gas limit) and
//! runs a single contract deployment against one of them: factory lookup, submission,
//! confirmation and report.

mod artifact;
pub use artifact::{ArtifactDir, ArtifactError, ArtifactSource, ContractArtifact};

mod client;
pub use client::{
    ClientError, ContractClient, DeploymentTransaction, RpcContractClient, TransactionReceipt,
};

pub mod config;
pub use config::{
    EndpointError, NetworkProfile, NetworkSettings, ProfileResolver, ShipyardConfig, SigningKey,
};

mod error;
pub use error::{ConfigError, DeployError};

mod factory;
pub use factory::{ContractFactory, DeployedContract, PendingDeployment};

mod request;
pub use request::{DeploymentRequest, RequestError};

mod rpc;

mod sequencer;
pub use sequencer::{DeploymentResult, DeploymentState, Outcome, Sequencer};
