//! Contract factories and pending deployments.

use std::time::Duration;

use alloy_core::primitives::{Address, B256};
use backon::{ConstantBuilder, Retryable};

use crate::{
    ContractArtifact, DeployError, DeploymentRequest,
    client::{ClientError, ContractClient, DeploymentTransaction, TransactionReceipt},
    request::RequestError,
};

/// A contract template bound to a client, able to deploy new instances.
pub struct ContractFactory<'a, C> {
    client: &'a C,
    artifact: ContractArtifact,
    gas_limit: u64,
}

impl<'a, C: ContractClient> ContractFactory<'a, C> {
    pub fn new(client: &'a C, artifact: ContractArtifact, gas_limit: u64) -> Self {
        Self {
            client,
            artifact,
            gas_limit,
        }
    }

    pub fn contract_name(&self) -> &str {
        &self.artifact.contract_name
    }

    /// Build the creation transaction for `request`: bytecode followed by the encoded
    /// constructor arguments.
    pub fn deployment_transaction(
        &self,
        request: &DeploymentRequest,
    ) -> Result<DeploymentTransaction, RequestError> {
        let args = request.encode_constructor_args(&self.artifact.abi)?;
        let input = [self.artifact.bytecode.as_ref(), args.as_ref()].concat();

        Ok(DeploymentTransaction {
            input: input.into(),
            gas_limit: self.gas_limit,
        })
    }

    /// Send the creation transaction. Returns once the node accepted it.
    pub async fn deploy(
        &self,
        tx: DeploymentTransaction,
    ) -> Result<PendingDeployment<'a, C>, DeployError> {
        let tx_hash = self
            .client
            .submit_deployment(tx)
            .await
            .map_err(DeployError::Submission)?;

        Ok(PendingDeployment {
            client: self.client,
            contract_name: self.artifact.contract_name.clone(),
            tx_hash,
        })
    }
}

/// A submitted deployment waiting for inclusion.
pub struct PendingDeployment<'a, C> {
    client: &'a C,
    contract_name: String,
    tx_hash: B256,
}

/// A contract instance that made it on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    pub address: Address,
    pub tx_hash: B256,
    pub block_number: Option<u64>,
}

/// Why a receipt poll did not yield a receipt.
#[derive(Debug)]
enum ReceiptPoll {
    Pending,
    Failed(ClientError),
}

impl<C: ContractClient> PendingDeployment<'_, C> {
    pub fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    /// Wait until the deployment is included, polling every `poll_interval`.
    ///
    /// Gives up with [`DeployError::ConfirmationTimeout`] once `timeout` elapsed. The
    /// transaction itself stays in the network and may still be included later.
    pub async fn await_deployment(
        &self,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<DeployedContract, DeployError> {
        let attempts = (timeout.as_millis() / poll_interval.as_millis().max(1)) as usize + 1;
        let backoff = ConstantBuilder::default()
            .with_delay(poll_interval)
            .with_max_times(attempts);

        let client = self.client;
        let tx_hash = self.tx_hash;
        let poll = move || async move {
            match client.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => Ok(receipt),
                Ok(None) => Err(ReceiptPoll::Pending),
                Err(e) => Err(ReceiptPoll::Failed(e)),
            }
        };

        let waiting = poll.retry(backoff).notify(|err, after| match err {
            ReceiptPoll::Pending => {
                tracing::trace!(tx_hash = %self.tx_hash, ?after, "Deployment not included yet");
            }
            ReceiptPoll::Failed(e) => {
                tracing::warn!(tx_hash = %self.tx_hash, error = %e, "Failed to fetch receipt, polling again");
            }
        });

        let timed_out = DeployError::ConfirmationTimeout {
            tx_hash: self.tx_hash,
            timeout,
        };

        let receipt = match tokio::time::timeout(timeout, waiting).await {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(_)) | Err(_) => return Err(timed_out),
        };

        self.deployed(receipt)
    }

    fn deployed(&self, receipt: TransactionReceipt) -> Result<DeployedContract, DeployError> {
        if !receipt.success {
            return Err(DeployError::DeploymentReverted {
                tx_hash: self.tx_hash,
            });
        }

        let address = receipt
            .contract_address
            .ok_or(DeployError::MissingContractAddress {
                tx_hash: self.tx_hash,
            })?;

        tracing::debug!(
            contract = %self.contract_name,
            address = %address,
            block_number = ?receipt.block_number,
            "Deployment included"
        );

        Ok(DeployedContract {
            address,
            tx_hash: self.tx_hash,
            block_number: receipt.block_number,
        })
    }
}
