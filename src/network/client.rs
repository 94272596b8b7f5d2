use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use thiserror::Error;

use crate::api::models::ChainPayload;
use crate::blockchain::Block;

/// Errors from talking to a single peer. Callers treat every variant as
/// "this peer contributed nothing" and move on to the next one.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("peer answered with status {status}")]
    Rejected { status: u16, body: String },
}

/// HTTP client for the peer wire protocol.
///
/// One instance is shared by the whole node. Every request carries connect
/// and overall timeouts so a dead peer delays a scan instead of wedging it.
pub struct PeerClient {
    client: Client,
}

impl PeerClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .expect("construct HTTP client");
        Self { client }
    }

    /// GET `{peer}/chain/`: fetch the peer's full chain payload.
    pub async fn fetch_chain(&self, peer: &str) -> Result<ChainPayload, PeerError> {
        let response = self.client.get(format!("{peer}/chain/")).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// POST `{peer}/add_block/`: offer a freshly mined block.
    pub async fn push_block(&self, peer: &str, block: &Block) -> Result<(), PeerError> {
        let response = self
            .client
            .post(format!("{peer}/add_block/"))
            .json(block)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// GET `{peer}/add_peer/?node_address=`: gossip a newcomer's address.
    pub async fn push_peer(&self, peer: &str, node_address: &str) -> Result<(), PeerError> {
        let response = self
            .client
            .get(format!("{peer}/add_peer/"))
            .query(&[("node_address", node_address)])
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// POST `{remote}/register_node/`: register ourselves and receive the
    /// remote's chain payload. A non-success answer carries the remote's
    /// status and body so the caller can forward them verbatim.
    pub async fn register_node(
        &self,
        remote: &str,
        self_address: &str,
    ) -> Result<ChainPayload, PeerError> {
        let response = self
            .client
            .post(format!("{remote}/register_node/"))
            .json(&json!({ "node_address": self_address }))
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PeerError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(PeerError::Rejected { status, body })
    }
}

impl Default for PeerClient {
    fn default() -> Self {
        Self::new()
    }
}
