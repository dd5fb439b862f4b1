//! JSON-RPC chain client.
//!
//! Talks to a node over HTTP with two methods:
//!
//! - `getbalance [address]` returns `{ "native": u64, "tokens": [..] }`
//! - `sendpayload [payload_hex, pubkey_hex, signature_hex]` returns the txid

use async_trait::async_trait;
use jsonrpsee::core::client::{ClientT, Error as ClientError};
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use sigil_core::address::Address;
use sigil_core::error::ChainError;
use sigil_core::traits::ChainClient;
use sigil_core::types::{Balance, SignedPayload};
use tracing::debug;

pub struct RpcChainClient {
    client: HttpClient,
    endpoint: String,
}

impl RpcChainClient {
    pub fn new(endpoint: &str) -> Result<Self, ChainError> {
        let client = HttpClientBuilder::default()
            .build(endpoint)
            .map_err(|e| ChainError::Unavailable(format!("{endpoint}: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn get_balance(&self, address: &Address) -> Result<Balance, ChainError> {
        let mut params = ArrayParams::new();
        params
            .insert(address.encode())
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        debug!(endpoint = %self.endpoint, %address, "getbalance");
        self.client
            .request("getbalance", params)
            .await
            .map_err(map_client_error)
    }

    async fn broadcast(&self, signed: &SignedPayload) -> Result<String, ChainError> {
        let mut params = ArrayParams::new();
        for value in [
            hex::encode(&signed.payload),
            signed.public_key.to_string(),
            hex::encode(&signed.signature),
        ] {
            params
                .insert(value)
                .map_err(|e| ChainError::Rpc(e.to_string()))?;
        }
        debug!(endpoint = %self.endpoint, bytes = signed.payload.len(), "sendpayload");
        self.client
            .request("sendpayload", params)
            .await
            .map_err(|e| match e {
                ClientError::Call(obj) => ChainError::Rejected(obj.message().to_string()),
                other => map_client_error(other),
            })
    }
}

fn map_client_error(e: ClientError) -> ChainError {
    match e {
        ClientError::Transport(e) => ChainError::Unavailable(e.to_string()),
        ClientError::RequestTimeout => ChainError::Unavailable("request timed out".into()),
        ClientError::ParseError(e) => ChainError::InvalidResponse(e.to_string()),
        other => ChainError::Rpc(other.to_string()),
    }
}
