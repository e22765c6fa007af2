//! Shared utilities for talking to Ethereum JSON-RPC endpoints.

use std::time::Duration;

use alloy_rpc_client::RpcClient;
use alloy_transport_http::{Http, reqwest};
use url::Url;

use crate::config::is_loopback;

/// Default timeout for a single RPC request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()
}

/// Create a JSON-RPC client for `endpoint` on top of [`create_client`].
///
/// Loopback endpoints are flagged as local, which shortens alloy's own polling.
pub fn connect(endpoint: &Url) -> Result<RpcClient, reqwest::Error> {
    let transport = Http::with_client(create_client()?, endpoint.clone());
    Ok(RpcClient::new(transport, is_loopback(endpoint)))
}
