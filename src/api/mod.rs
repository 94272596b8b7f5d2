mod chain;
mod health;
pub mod models;
mod peers;
mod tx;

use actix_web::web::ServiceConfig;

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(health::health_check)
        .service(chain::get_chain)
        .service(chain::init_chain)
        .service(chain::mine)
        .service(chain::get_difficulty)
        .service(chain::validate_chain)
        .service(tx::new_transaction)
        .service(tx::pending_tx)
        .service(peers::register_node)
        .service(peers::add_peer)
        .service(peers::register_with)
        .service(peers::add_block)
        .service(peers::get_peers);
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    use super::{AppState, init_routes};
    use crate::blockchain::Block;

    fn test_state() -> web::Data<AppState> {
        web::Data::new(AppState::new("http://127.0.0.1:0".to_string()))
    }

    macro_rules! node {
        ($state:ident) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .configure(init_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn submit_then_pending_shows_stamped_transaction() {
        let state = test_state();
        let app = node!(state);

        let req = test::TestRequest::post()
            .uri("/new_transaction/")
            .set_json(json!({"from": "a", "to": "b", "amount": 5}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/pending_tx/").to_request();
        let pending: Value = test::call_and_read_body_json(&app, req).await;
        let list = pending.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["from"], json!("a"));
        assert!(list[0]["timestamp"].is_f64());
    }

    #[actix_web::test]
    async fn submit_rejects_non_primitive_values() {
        let state = test_state();
        let app = node!(state);

        let req = test::TestRequest::post()
            .uri("/new_transaction/")
            .set_json(json!({"from": "a", "meta": {"nested": true}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::post()
            .uri("/new_transaction/")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn mine_requires_genesis() {
        let state = test_state();
        let app = node!(state);

        let req = test::TestRequest::post().uri("/mine/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);
    }

    #[actix_web::test]
    async fn mine_with_empty_pool_changes_nothing() {
        let state = test_state();
        let app = node!(state);

        let req = test::TestRequest::post().uri("/init/").to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::post().uri("/mine/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mined_index"], Value::Null);

        assert_eq!(state.chain.lock().await.len(), 1);
    }

    #[actix_web::test]
    async fn mine_cycle_drains_pool_and_appends_one_block() {
        let state = test_state();
        let app = node!(state);

        let req = test::TestRequest::post().uri("/init/").to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        for amount in [5, 7] {
            let req = test::TestRequest::post()
                .uri("/new_transaction/")
                .set_json(json!({"from": "a", "to": "b", "amount": amount}))
                .to_request();
            assert!(test::call_service(&app, req).await.status().is_success());
        }

        let req = test::TestRequest::post().uri("/mine/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mined_index"], json!(1));

        let bc = state.chain.lock().await;
        assert_eq!(bc.len(), 2);
        let tip = bc.last_block().unwrap();
        assert_eq!(tip.transactions.len(), 2);
        assert_eq!(tip.previous_hash, bc.chain[0].compute_hash());
        assert!(tip.compute_hash().starts_with("00"));
        drop(bc);

        assert!(state.pool.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn chain_payload_has_wire_shape() {
        let state = test_state();
        let app = node!(state);

        let req = test::TestRequest::post().uri("/init/").to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::get().uri("/chain/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["length"], json!(1));
        assert_eq!(body["chain"][0]["previous_hash"], json!("0"));
        assert!(body["peers"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn announced_block_is_validated_before_append() {
        let state = test_state();
        let app = node!(state);

        let req = test::TestRequest::post().uri("/init/").to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        // A block that does not extend our tip is discarded.
        let orphan = Block::new(9, Vec::new(), "ff".repeat(32));
        let req = test::TestRequest::post()
            .uri("/add_block/")
            .set_json(&orphan)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        // A properly mined successor is accepted.
        let (previous_hash, difficulty) = {
            let bc = state.chain.lock().await;
            (bc.last_block().unwrap().compute_hash(), bc.difficulty())
        };
        let mut block = Block::new(1, Vec::new(), previous_hash);
        crate::blockchain::pow::solve(&mut block, difficulty);
        let req = test::TestRequest::post()
            .uri("/add_block/")
            .set_json(&block)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(state.chain.lock().await.len(), 2);
    }

    #[actix_web::test]
    async fn add_peer_and_get_peers_round_trip() {
        let state = test_state();
        let app = node!(state);

        let req = test::TestRequest::get()
            .uri("/add_peer/?node_address=http://127.0.0.1:9001")
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::get().uri("/get_peers/").to_request();
        let peers: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(peers, vec!["http://127.0.0.1:9001".to_string()]);
    }

    #[actix_web::test]
    async fn difficulty_endpoint_tracks_chain_length() {
        let state = test_state();
        let app = node!(state);

        let req = test::TestRequest::get().uri("/difficulty/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["difficulty"], json!(2));

        // Grow to length 2; difficulty becomes floor(log2(2)) + 2 = 3.
        {
            let mut bc = state.chain.lock().await;
            bc.create_genesis_block();
            let last = bc.last_block().unwrap();
            let mut block = Block::new(1, Vec::new(), last.compute_hash());
            let proof = crate::blockchain::pow::solve(&mut block, bc.difficulty());
            assert!(bc.add_block(block, &proof));
        }
        let req = test::TestRequest::get().uri("/difficulty/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["difficulty"], json!(3));
    }

    #[actix_web::test]
    async fn validate_reports_weak_and_strict_modes() {
        let state = test_state();
        let app = node!(state);

        {
            let mut bc = state.chain.lock().await;
            bc.create_genesis_block();
            // Link a successor without doing the work.
            let last = bc.last_block().unwrap();
            let mut block = Block::new(1, Vec::new(), last.compute_hash());
            while block.compute_hash().starts_with("0") {
                block.nonce += 1;
            }
            bc.chain.push(block);
        }

        let req = test::TestRequest::get().uri("/validate/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["valid"], json!(true));

        let req = test::TestRequest::get()
            .uri("/validate/?strict=true")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["valid"], json!(false));
    }
}
