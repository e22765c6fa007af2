//! The boundary to the chain: submitting a contract creation and reading receipts.

use std::{fmt, future::Future};

use alloy_core::primitives::{Address, B256, Bytes};
use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_transport::TransportError;

use crate::{config::NetworkProfile, rpc};

/// Errors raised by a [`ContractClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to create HTTP client")]
    HttpClient(#[source] alloy_transport_http::reqwest::Error),

    #[error("{method} failed")]
    Rpc {
        method: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("endpoint reports chain id {actual}, but the network profile expects {expected}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    #[error("node exposes no unlocked account to send an unsigned deployment from")]
    NoUnlockedAccount,
}

impl ClientError {
    fn rpc(method: &'static str) -> impl FnOnce(TransportError) -> Self {
        move |source| Self::Rpc { method, source }
    }
}

/// A contract creation transaction, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTransaction {
    /// Creation bytecode followed by the ABI-encoded constructor arguments.
    pub input: Bytes,
    /// Gas limit attached to the transaction.
    pub gas_limit: u64,
}

/// The parts of a transaction receipt a deployment cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub contract_address: Option<Address>,
    /// `false` when the transaction reverted.
    pub success: bool,
    pub block_number: Option<u64>,
}

impl From<alloy_rpc_types_eth::TransactionReceipt> for TransactionReceipt {
    fn from(receipt: alloy_rpc_types_eth::TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            contract_address: receipt.contract_address,
            success: receipt.status(),
            block_number: receipt.block_number,
        }
    }
}

/// A chain that contracts can be deployed to.
pub trait ContractClient {
    /// Submit a contract creation transaction and return its hash.
    fn submit_deployment(
        &self,
        tx: DeploymentTransaction,
    ) -> impl Future<Output = Result<B256, ClientError>> + Send;

    /// Fetch the receipt of a transaction, `None` while it is still pending.
    fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> impl Future<Output = Result<Option<TransactionReceipt>, ClientError>> + Send;
}

/// [`ContractClient`] over an alloy provider.
///
/// The provider carries the recommended fillers, so nonce, fees and chain id come
/// from the node. With a signing key, a wallet signs locally and the transaction is
/// sent raw. Without one, the node's first unlocked account sends it, which is how
/// local development nodes (Hardhat, Anvil) work.
#[derive(Clone)]
pub struct RpcContractClient {
    provider: DynProvider,
    sender: Option<Address>,
    expected_chain_id: Option<u64>,
}

impl fmt::Debug for RpcContractClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcContractClient")
            .field("sender", &self.sender)
            .field("expected_chain_id", &self.expected_chain_id)
            .finish_non_exhaustive()
    }
}

impl RpcContractClient {
    /// Create a client bound to a network profile.
    pub fn new(profile: &NetworkProfile) -> Result<Self, ClientError> {
        let client = rpc::connect(&profile.endpoint).map_err(ClientError::HttpClient)?;

        let (provider, sender) = match &profile.signing_key {
            Some(key) => {
                let signer = key.signer();
                let sender = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_client(client)
                    .erased();
                (provider, Some(sender))
            }
            None => (ProviderBuilder::new().connect_client(client).erased(), None),
        };

        Ok(Self {
            provider,
            sender,
            expected_chain_id: profile.chain_id,
        })
    }

    /// Address transactions are signed with, if signing locally.
    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    /// Query the chain id and compare it with the one the profile expects.
    async fn checked_chain_id(&self) -> Result<u64, ClientError> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(ClientError::rpc("eth_chainId"))?;

        match self.expected_chain_id {
            Some(expected) if expected != chain_id => Err(ClientError::ChainIdMismatch {
                expected,
                actual: chain_id,
            }),
            _ => Ok(chain_id),
        }
    }

    async fn unlocked_account(&self) -> Result<Address, ClientError> {
        let accounts = self
            .provider
            .get_accounts()
            .await
            .map_err(ClientError::rpc("eth_accounts"))?;
        accounts.first().copied().ok_or(ClientError::NoUnlockedAccount)
    }
}

impl ContractClient for RpcContractClient {
    async fn submit_deployment(&self, tx: DeploymentTransaction) -> Result<B256, ClientError> {
        let mut request = TransactionRequest::default()
            .with_deploy_code(tx.input)
            .with_gas_limit(tx.gas_limit);

        // Signing always pins the chain id, so a wrong endpoint is caught first.
        if self.sender.is_some() || self.expected_chain_id.is_some() {
            request.set_chain_id(self.checked_chain_id().await?);
        }

        let (from, method) = match self.sender {
            Some(sender) => (sender, "eth_sendRawTransaction"),
            None => (self.unlocked_account().await?, "eth_sendTransaction"),
        };
        request.set_from(from);

        tracing::debug!(
            from = %from,
            gas_limit = tx.gas_limit,
            signed = self.sender.is_some(),
            "Sending deployment transaction"
        );

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(ClientError::rpc(method))?;

        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, ClientError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(ClientError::rpc("eth_getTransactionReceipt"))?;
        Ok(receipt.map(TransactionReceipt::from))
    }
}
