use actix_web::{HttpResponse, Responder, get, http::StatusCode, post, web};
use log::{info, warn};

use super::chain::chain_payload;
use super::models::{AddPeerQuery, AppState, RegisterRequest};
use crate::blockchain::Block;
use crate::network::{PeerError, sync};

fn normalize(address: &str) -> String {
    address.trim().trim_end_matches('/').to_string()
}

/// A remote node registers itself here. Both addresses land in the peer
/// set, every other known peer learns about the newcomer, and the response
/// carries our full chain so the newcomer can catch up.
#[post("/register_node/")]
pub async fn register_node(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    let node_address = normalize(&body.node_address);
    if node_address.is_empty() {
        return HttpResponse::BadRequest().body("node_address required");
    }

    let gossip_targets = {
        let mut peers = state.peers.write().expect("peers lock poisoned");
        peers.insert(state.self_address.clone());
        peers.insert(node_address.clone());
        peers.clone()
    };
    info!("registered peer {node_address}");
    sync::gossip_peer(
        &state.peer_client,
        &gossip_targets,
        &state.self_address,
        &node_address,
    )
    .await;

    let bc = state.chain.lock().await;
    HttpResponse::Ok().json(chain_payload(&bc, &state))
}

/// Gossip target: learn a single new peer address.
#[get("/add_peer/")]
pub async fn add_peer(
    state: web::Data<AppState>,
    query: web::Query<AddPeerQuery>,
) -> impl Responder {
    let node_address = normalize(&query.node_address);
    if node_address.is_empty() {
        return HttpResponse::BadRequest().body("node_address required");
    }
    let mut peers = state.peers.write().expect("peers lock poisoned");
    peers.insert(node_address);
    HttpResponse::Ok().body("success")
}

/// Join an existing network: register with the remote node, then adopt its
/// chain and peer set. A remote-side rejection is forwarded verbatim.
#[post("/register_with/")]
pub async fn register_with(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    let remote = normalize(&body.node_address);
    if remote.is_empty() {
        return HttpResponse::BadRequest().body("node_address required");
    }

    let payload = match state
        .peer_client
        .register_node(&remote, &state.self_address)
        .await
    {
        Ok(payload) => payload,
        Err(PeerError::Rejected { status, body }) => {
            warn!("registration rejected by {remote} with status {status}");
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return HttpResponse::build(status).body(body);
        }
        Err(err) => {
            warn!("could not reach {remote}: {err}");
            return HttpResponse::BadGateway().body(format!("could not reach {remote}: {err}"));
        }
    };

    {
        let mut bc = state.chain.lock().await;
        let adopted = bc.replace_if_longer(payload.chain);
        info!(
            "registered with {remote} (chain adopted: {adopted}, height {})",
            bc.len()
        );
    }
    {
        let mut peers = state.peers.write().expect("peers lock poisoned");
        peers.insert(remote);
        peers.extend(payload.peers.into_iter().map(|p| normalize(&p)));
    }
    HttpResponse::Ok().body("Registration successful")
}

/// A peer announces a freshly mined block; validate and append it.
#[post("/add_block/")]
pub async fn add_block(state: web::Data<AppState>, body: web::Json<Block>) -> impl Responder {
    let block = body.into_inner();
    let index = block.index;
    let proof = block.compute_hash();

    let mut bc = state.chain.lock().await;
    if bc.add_block(block, &proof) {
        info!("accepted announced block #{index}, height now {}", bc.len());
        HttpResponse::Ok().body("Block added to the chain")
    } else {
        warn!("discarded announced block #{index}");
        HttpResponse::BadRequest().body("The block was discarded by the node")
    }
}

/// Current peer set.
#[get("/get_peers/")]
pub async fn get_peers(state: web::Data<AppState>) -> impl Responder {
    let peers = state.peers.read().expect("peers lock poisoned");
    HttpResponse::Ok().json(peers.iter().cloned().collect::<Vec<_>>())
}
