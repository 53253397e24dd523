pub mod reporter;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::adapters::http::state::HttpState;
use crate::adapters::http::ws::ws_handler;

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/api/config", get(routes::get_config))
        .route("/api/model", get(routes::model_info))
        .route("/api/classify", post(routes::classify_upload))
        .route("/api/classify/batch", post(routes::classify_batch))
        .route("/api/samples/:name", post(routes::classify_sample))
        .route("/ws/events", get(ws_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CatchPanicLayer::custom(routes::panic_response))
        .with_state(state)
}
