//! HTTP clients for the chain and lightning backends of a currency.
//!
//! [`JsonRpcChainClient`] talks bitcoind-style JSON-RPC and only needs
//! `getblockchaininfo`. [`LndRestClient`] reads `GET /v1/getinfo` from an
//! LND REST gateway.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use sprig_core::error::ClientError;
use sprig_core::traits::{ChainClient, LightningClient};
use sprig_core::types::LightningInfo;

/// Request timeout for every backend call.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Header LND expects the hex-encoded macaroon in.
const MACAROON_HEADER: &str = "Grpc-Metadata-macaroon";

fn build_client() -> Result<Client, ClientError> {
    Client::builder()
        .timeout(RPC_TIMEOUT)
        .build()
        .map_err(|e| ClientError::Transport(e.to_string()))
}

/// Pull `result` out of a JSON-RPC response body, surfacing `error`.
pub(crate) fn extract_result<T: DeserializeOwned>(resp: Value) -> Result<T, ClientError> {
    if let Some(err) = resp.get("error") {
        if !err.is_null() {
            return Err(ClientError::Rpc(err.to_string()));
        }
    }
    let result = resp
        .get("result")
        .cloned()
        .ok_or_else(|| ClientError::InvalidResponse("missing result".into()))?;
    serde_json::from_value(result).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct BlockchainInfo {
    blocks: u64,
}

/// JSON-RPC client for a bitcoind-compatible chain backend.
pub struct JsonRpcChainClient {
    client: Client,
    endpoint: String,
    auth: Option<(String, String)>,
}

impl JsonRpcChainClient {
    pub fn new(endpoint: &str, auth: Option<(String, String)>) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client()?,
            endpoint: endpoint.to_owned(),
            auth,
        })
    }

    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ClientError> {
        let body = json!({
            "jsonrpc": "1.0",
            "method": method,
            "params": params,
            "id": "sprig"
        });
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some((user, password)) = &self.auth {
            request = request.basic_auth(user, Some(password));
        }
        // bitcoind answers RPC errors with a non-2xx status and a JSON body,
        // so the body is parsed regardless of status.
        let resp: Value = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        extract_result(resp)
    }
}

#[async_trait]
impl ChainClient for JsonRpcChainClient {
    async fn current_height(&self) -> Result<u64, ClientError> {
        let info: BlockchainInfo = self.call("getblockchaininfo", json!([])).await?;
        Ok(info.blocks)
    }
}

#[derive(Deserialize)]
struct GetInfoResponse {
    #[serde(default)]
    alias: String,
    #[serde(default)]
    block_height: u64,
    #[serde(default)]
    synced_to_chain: bool,
}

impl From<GetInfoResponse> for LightningInfo {
    fn from(resp: GetInfoResponse) -> Self {
        Self {
            alias: resp.alias,
            block_height: resp.block_height,
            synced_to_chain: resp.synced_to_chain,
        }
    }
}

/// REST client for an LND node.
pub struct LndRestClient {
    client: Client,
    base_url: String,
    macaroon_hex: Option<String>,
}

impl LndRestClient {
    pub fn new(base_url: &str, macaroon_path: Option<&Path>) -> Result<Self, ClientError> {
        let macaroon_hex = macaroon_path
            .map(|path| {
                std::fs::read(path)
                    .map(hex::encode)
                    .map_err(|e| ClientError::Transport(format!("{}: {e}", path.display())))
            })
            .transpose()?;
        Ok(Self {
            client: build_client()?,
            base_url: base_url.trim_end_matches('/').to_owned(),
            macaroon_hex,
        })
    }
}

#[async_trait]
impl LightningClient for LndRestClient {
    async fn get_info(&self) -> Result<LightningInfo, ClientError> {
        let mut request = self.client.get(format!("{}/v1/getinfo", self.base_url));
        if let Some(macaroon) = &self.macaroon_hex {
            request = request.header(MACAROON_HEADER, macaroon);
        }
        let resp = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| ClientError::Rpc(e.to_string()))?;
        let info: GetInfoResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(info.into())
    }
}
