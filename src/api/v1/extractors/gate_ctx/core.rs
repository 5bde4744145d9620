use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use super::GateCtx;

/// Handler で GateCtx を受け取るための extractor
/// middleware が GateCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（gate がかかってない・ミドルウェア未設定）
pub struct GateCtxExtractor(pub GateCtx);

impl<S> FromRequestParts<S> for GateCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<GateCtx>()
            .cloned()
            .map(GateCtxExtractor)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
