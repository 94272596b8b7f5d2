use std::collections::HashSet;
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};

use crate::blockchain::{Block, Blockchain};
use crate::network::PeerClient;
use crate::transaction::Transaction;

/// Shared node context: in-memory chain, transaction pool and peer set.
///
/// The chain sits behind a tokio mutex because a mining cycle holds the
/// writer lock across await points (blocking-pool proof-of-work, peer
/// consensus); everything chain-mutating happens under that single writer.
/// The pool and peer set only see short synchronous critical sections.
pub struct AppState {
    pub chain: tokio::sync::Mutex<Blockchain>,
    pub pool: Mutex<Vec<Transaction>>,
    pub peers: RwLock<HashSet<String>>,
    pub peer_client: PeerClient,
    pub self_address: String,
}

impl AppState {
    pub fn new(self_address: String) -> Self {
        Self {
            chain: tokio::sync::Mutex::new(Blockchain::new()),
            pool: Mutex::new(Vec::new()),
            peers: RwLock::new(HashSet::new()),
            peer_client: PeerClient::new(),
            self_address: self_address.trim_end_matches('/').to_string(),
        }
    }
}

/* ---------- Chain / wire models ---------- */

/// Full chain payload: the get-chain response, which doubles as the wire
/// form exchanged during consensus and registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChainPayload {
    pub length: usize,
    pub chain: Vec<Block>,
    pub peers: Vec<String>,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub mined_index: Option<u64>,
    pub message: String,
}

#[derive(Serialize)]
pub struct DifficultyResponse {
    pub difficulty: u32,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
}

#[derive(Deserialize)]
pub struct ValidateQuery {
    #[serde(default)]
    pub strict: bool,
}

/* ---------- Peer API models ---------- */

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub node_address: String,
}

#[derive(Deserialize)]
pub struct AddPeerQuery {
    pub node_address: String,
}
