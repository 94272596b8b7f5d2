use super::Block;

/// Brute-force the smallest nonce whose block hash carries at least
/// `difficulty` leading hex zeros. Resets and then mutates `block.nonce`,
/// returning the winning hash.
///
/// Runtime is unbounded by design; expected cost grows as 16^difficulty
/// hash evaluations.
pub fn solve(block: &mut Block, difficulty: u32) -> String {
    let target_prefix = "0".repeat(difficulty as usize);
    block.nonce = 0;
    let mut hash = block.compute_hash();
    while !hash.starts_with(&target_prefix) {
        block.nonce += 1;
        hash = block.compute_hash();
    }
    hash
}
