use std::collections::HashSet;

use log::{debug, info, warn};

use super::client::PeerClient;
use crate::blockchain::{Block, Blockchain};

/// Longest-chain consensus: poll every known peer and adopt the longest
/// reported chain that is strictly longer than ours. Returns true when the
/// local chain was replaced.
///
/// Unreachable peers and malformed payloads are logged and skipped; one bad
/// peer never aborts the scan. The adopted chain is linkage-checked but its
/// proof-of-work is not re-verified.
pub async fn resolve(
    bc: &mut Blockchain,
    client: &PeerClient,
    peers: &HashSet<String>,
    self_address: &str,
) -> bool {
    let mut longest: Option<Vec<Block>> = None;
    let mut current_len = bc.len();

    for peer in peers {
        if peer == self_address {
            continue;
        }
        match client.fetch_chain(peer).await {
            Ok(payload) => {
                debug!("consensus: {peer} reports chain length {}", payload.length);
                if payload.length > current_len {
                    current_len = payload.length;
                    longest = Some(payload.chain);
                }
            }
            Err(err) => warn!("consensus: skipping peer {peer}: {err}"),
        }
    }

    match longest {
        Some(chain) => {
            if bc.replace_if_longer(chain) {
                info!("consensus: adopted a longer chain, height now {}", bc.len());
                true
            } else {
                warn!("consensus: longest reported chain failed validation, keeping ours");
                false
            }
        }
        None => false,
    }
}

/// Broadcast a freshly mined block to every peer except ourselves. Each
/// peer validates and appends independently; a rejection or network failure
/// stays local to that peer.
pub async fn announce(
    client: &PeerClient,
    peers: &HashSet<String>,
    self_address: &str,
    block: &Block,
) {
    for peer in peers {
        if peer == self_address {
            continue;
        }
        match client.push_block(peer, block).await {
            Ok(()) => debug!("announce: {peer} took block #{}", block.index),
            Err(err) => warn!("announce: {peer} did not take block #{}: {err}", block.index),
        }
    }
}

/// Full-mesh gossip: tell every known peer except ourselves about a
/// newcomer's address. Failures are logged and skipped.
pub async fn gossip_peer(
    client: &PeerClient,
    peers: &HashSet<String>,
    self_address: &str,
    node_address: &str,
) {
    for peer in peers {
        if peer == self_address {
            continue;
        }
        if let Err(err) = client.push_peer(peer, node_address).await {
            warn!("gossip: peer {peer} unreachable: {err}");
        }
    }
}
