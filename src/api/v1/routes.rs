/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - v1 配下はすべて gate を通す (route ごとの例外は作らない)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::context::context;
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let router = Router::new().route("/context", get(context));

    middleware::gate::apply(router, state)
}
