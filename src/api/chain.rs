use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{
    AppState, ChainPayload, DifficultyResponse, MineResponse, ValidateQuery, ValidateResponse,
};
use crate::blockchain::{Block, Blockchain, pow};
use crate::network::sync;

/// Full chain with the current peer set, in wire form.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let bc = state.chain.lock().await;
    HttpResponse::Ok().json(chain_payload(&bc, &state))
}

pub(super) fn chain_payload(bc: &Blockchain, state: &AppState) -> ChainPayload {
    let peers = state.peers.read().expect("peers lock poisoned");
    ChainPayload {
        length: bc.len(),
        chain: bc.chain.clone(),
        peers: peers.iter().cloned().collect(),
    }
}

/// Create the genesis block; idempotent.
#[post("/init/")]
pub async fn init_chain(state: web::Data<AppState>) -> impl Responder {
    let mut bc = state.chain.lock().await;
    if bc.is_empty() {
        bc.create_genesis_block();
        info!("genesis block created");
    }
    HttpResponse::Ok().body("success")
}

/// Mine the pending transactions into a new block.
///
/// The whole cycle runs under the chain writer lock: drain the pool, search
/// for a proof on the blocking pool, append, reconcile with peers, and only
/// when consensus left our chain untouched, announce the new block.
#[post("/mine/")]
pub async fn mine(state: web::Data<AppState>) -> impl Responder {
    let mut bc = state.chain.lock().await;

    let (index, previous_hash, difficulty) = match bc.last_block() {
        Some(last) => (last.index + 1, last.compute_hash(), bc.difficulty()),
        None => {
            return HttpResponse::Conflict()
                .body("node not initialized: create the genesis block first");
        }
    };

    let transactions = {
        let mut pool = state.pool.lock().expect("pool lock poisoned");
        std::mem::take(&mut *pool)
    };
    if transactions.is_empty() {
        return HttpResponse::Ok().json(MineResponse {
            mined_index: None,
            message: "no transactions to mine".to_string(),
        });
    }

    let mut block = Block::new(index, transactions, previous_hash);
    let solved = web::block(move || {
        let proof = pow::solve(&mut block, difficulty);
        (block, proof)
    })
    .await;
    let (block, proof) = match solved {
        Ok(pair) => pair,
        Err(err) => {
            warn!("mining worker failed: {err}");
            return HttpResponse::InternalServerError().body("mining worker failed");
        }
    };

    let nonce = block.nonce;
    if !bc.add_block(block, &proof) {
        warn!("freshly mined block #{index} was rejected, work discarded");
        return HttpResponse::Ok().json(MineResponse {
            mined_index: None,
            message: "mined block was rejected".to_string(),
        });
    }
    info!("mined block #{index} (difficulty {difficulty}, nonce {nonce})");

    let length_after_mine = bc.len();
    let peers = state.peers.read().expect("peers lock poisoned").clone();
    sync::resolve(&mut bc, &state.peer_client, &peers, &state.self_address).await;
    if bc.len() == length_after_mine {
        let last = bc.last_block().expect("chain is non-empty after append");
        sync::announce(&state.peer_client, &peers, &state.self_address, last).await;
    }

    HttpResponse::Ok().json(MineResponse {
        mined_index: Some(index),
        message: format!("Block #{index} is mined"),
    })
}

/// Current proof-of-work difficulty.
#[get("/difficulty/")]
pub async fn get_difficulty(state: web::Data<AppState>) -> impl Responder {
    let bc = state.chain.lock().await;
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: bc.difficulty(),
    })
}

/// Validate the chain: linkage by default, linkage plus per-position
/// proof-of-work with `?strict=true`.
#[get("/validate/")]
pub async fn validate_chain(
    state: web::Data<AppState>,
    query: web::Query<ValidateQuery>,
) -> impl Responder {
    let bc = state.chain.lock().await;
    let valid = if query.strict {
        Blockchain::check_chain_validity_strict(&bc.chain)
    } else {
        Blockchain::check_chain_validity(&bc.chain)
    };
    HttpResponse::Ok().json(ValidateResponse {
        valid,
        length: bc.len(),
    })
}
