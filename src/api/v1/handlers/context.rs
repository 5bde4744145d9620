/*
 * Responsibility
 * - GET /api/v1/context
 * - gate が載せた GateCtx をそのまま返す (realm / token_payload / validation の確認用)
 */
use axum::Json;

use crate::api::v1::extractors::{GateCtx, GateCtxExtractor};

pub async fn context(GateCtxExtractor(ctx): GateCtxExtractor) -> Json<GateCtx> {
    tracing::debug!(realm = %ctx.realm(), "serving gate context");
    Json(ctx)
}
