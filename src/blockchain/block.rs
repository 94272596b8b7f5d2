use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::transaction::{Transaction, unix_now};

/// Sentinel `previous_hash` carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// A single block in the ledger.
///
/// The hash is intentionally not stored: mining mutates `nonce`, so identity
/// is always recomputed from the current field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub timestamp: f64, // Unix seconds (sub-second precision)
    pub previous_hash: String,
    pub nonce: u64,
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis() -> Self {
        Self {
            index: 0,
            transactions: Vec::new(),
            timestamp: unix_now(),
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            nonce: 0,
        }
    }

    /// Create a new unmined block on top of the given predecessor hash.
    pub fn new(index: u64, transactions: Vec<Transaction>, previous_hash: String) -> Self {
        Self {
            index,
            transactions,
            timestamp: unix_now(),
            previous_hash,
            nonce: 0,
        }
    }

    /// Compute the SHA-256 hash of this block's five fields.
    ///
    /// The preimage is the canonical JSON encoding: object keys sorted
    /// lexicographically at every nesting level (serde_json maps are
    /// BTreeMap-backed, so `json!` already emits sorted keys), UTF-8 bytes,
    /// digest hex-encoded lowercase.
    pub fn compute_hash(&self) -> String {
        let preimage = json!({
            "index": self.index,
            "nonce": self.nonce,
            "previous_hash": self.previous_hash,
            "timestamp": self.timestamp,
            "transactions": self.transactions,
        });
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(&preimage).expect("serialize block preimage"));
        hex::encode(hasher.finalize())
    }
}
