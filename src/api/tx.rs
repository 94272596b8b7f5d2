use actix_web::{HttpResponse, Responder, get, post, web};
use log::debug;
use serde_json::Value;

use super::models::AppState;
use crate::transaction::Transaction;

/// Submit a transaction into the pool. The payload is any non-empty JSON
/// object of primitive values; the pool stamps it with the submission time.
#[post("/new_transaction/")]
pub async fn new_transaction(state: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    let Value::Object(fields) = body.into_inner() else {
        return HttpResponse::BadRequest().body("transaction must be a JSON object");
    };
    if fields.is_empty() {
        return HttpResponse::BadRequest().body("transaction must have at least one field");
    }
    if fields
        .values()
        .any(|v| !matches!(v, Value::String(_) | Value::Number(_)))
    {
        return HttpResponse::BadRequest().body("transaction values must be strings or numbers");
    }

    let tx = Transaction::stamped(fields);
    {
        let mut pool = state.pool.lock().expect("pool lock poisoned");
        pool.push(tx);
        debug!("transaction accepted, pool size now {}", pool.len());
    }
    HttpResponse::Ok().body("success")
}

/// The unconfirmed transactions waiting for the next block.
#[get("/pending_tx/")]
pub async fn pending_tx(state: web::Data<AppState>) -> impl Responder {
    let pool = state.pool.lock().expect("pool lock poisoned");
    HttpResponse::Ok().json(&*pool)
}
