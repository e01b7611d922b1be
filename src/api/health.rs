use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

use crate::{state::AppState, storage::SharedStore};

pub fn setup_route() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(store): State<SharedStore>) -> Json<Value> {
    Json(json!({ "status": "ok", "backend": store.backend() }))
}
