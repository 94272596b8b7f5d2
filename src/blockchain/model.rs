use log::debug;

use super::block::GENESIS_PREVIOUS_HASH;
use super::{Block, INITIAL_DIFFICULTY};

/// In-memory hash-linked chain with length-derived difficulty.
#[derive(Debug, Default)]
pub struct Blockchain {
    pub chain: Vec<Block>,
}

impl Blockchain {
    /// Start with an empty chain; genesis creation is a separate explicit
    /// operation.
    pub fn new() -> Self {
        Self { chain: Vec::new() }
    }

    /// Append the genesis block. A no-op when the chain already has one.
    pub fn create_genesis_block(&mut self) {
        if self.chain.is_empty() {
            self.chain.push(Block::genesis());
        }
    }

    /// The most recently appended block, or `None` before genesis.
    pub fn last_block(&self) -> Option<&Block> {
        self.chain.last()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Required count of leading hex zeros, derived from chain length as
    /// floor(log2(len)) + 2.
    ///
    /// Deriving on demand instead of storing the value means a wholesale
    /// chain replacement can never leave the difficulty stale.
    pub fn difficulty(&self) -> u32 {
        match self.chain.len() {
            0 => INITIAL_DIFFICULTY,
            n => (n as u64).ilog2() + 2,
        }
    }

    /// Validate `block` against the current tip and the claimed `proof`,
    /// appending on success. Returns false (chain untouched) on any
    /// validation failure; rejection is a reported outcome, never an error.
    pub fn add_block(&mut self, block: Block, proof: &str) -> bool {
        let Some(last) = self.chain.last() else {
            // Bootstrap path: an empty chain accepts any block whose claimed
            // proof matches its recomputed hash. Normally unreached since
            // genesis creation is explicit.
            if proof == block.compute_hash() {
                self.chain.push(block);
                return true;
            }
            return false;
        };

        if block.previous_hash != last.compute_hash() {
            debug!(
                "reject block #{}: previous_hash does not match the tip",
                block.index
            );
            return false;
        }
        if !self.is_valid_proof(&block, proof) {
            debug!(
                "reject block #{}: proof fails difficulty or hash binding",
                block.index
            );
            return false;
        }

        self.chain.push(block);
        true
    }

    /// A proof is valid when it carries the required leading zeros for the
    /// current difficulty AND equals the block's recomputed hash. The second
    /// check binds the claimed proof to the actual block contents.
    pub fn is_valid_proof(&self, block: &Block, proof: &str) -> bool {
        let target_prefix = "0".repeat(self.difficulty() as usize);
        proof.starts_with(&target_prefix) && proof == block.compute_hash()
    }

    /// Walk `chain` checking hash linkage only, starting from the genesis
    /// sentinel. Per-block difficulty is deliberately not re-checked here;
    /// see [`Blockchain::check_chain_validity_strict`] for that.
    pub fn check_chain_validity(chain: &[Block]) -> bool {
        let mut previous_hash = GENESIS_PREVIOUS_HASH.to_string();
        for block in chain {
            if block.previous_hash != previous_hash {
                return false;
            }
            previous_hash = block.compute_hash();
        }
        true
    }

    /// Linkage plus per-position proof-of-work: every non-genesis block's
    /// recomputed hash must meet the difficulty that was in force when the
    /// chain had `position` blocks.
    pub fn check_chain_validity_strict(chain: &[Block]) -> bool {
        if !Self::check_chain_validity(chain) {
            return false;
        }
        for (position, block) in chain.iter().enumerate().skip(1) {
            let difficulty = (position as u64).ilog2() + 2;
            let target_prefix = "0".repeat(difficulty as usize);
            if !block.compute_hash().starts_with(&target_prefix) {
                return false;
            }
        }
        true
    }

    /// Replace the chain wholesale when `candidate` is strictly longer and
    /// passes the linkage check. The adopted blocks' proof-of-work is not
    /// re-verified; a peer vouches for its own chain in this exchange.
    pub fn replace_if_longer(&mut self, candidate: Vec<Block>) -> bool {
        if candidate.len() > self.chain.len() && Self::check_chain_validity(&candidate) {
            self.chain = candidate;
            return true;
        }
        false
    }
}
