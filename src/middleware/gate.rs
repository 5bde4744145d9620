//! Bearer credential → gatekeeper check → GateCtx in extensions → handler → usage report.
//!
//! - Extract and authorize are fail-fast: the handler never runs after a 401/403/500.
//! - The usage report is handed to `UsageReporter` after the handler returns and is
//!   never awaited here.

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::GateCtx;
use crate::error::GateError;
use crate::services::credential;
use crate::services::policy::{PolicyError, PolicyRequest};
use crate::state::AppState;

/// Put every route of `router` behind the gate.
///
/// 例：
/// ```ignore
/// let v1 = Router::new().route("/context", get(context));
/// let v1 = middleware::gate::apply(v1, state.clone());
/// let app = Router::new().nest("/api/v1", v1).with_state(state);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, gate_middleware))
}

async fn gate_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, GateError> {
    let credential = credential::extract(req.headers()).map_err(|err| {
        tracing::warn!(error = %err, "bearer credential rejected");
        GateError::from(err)
    })?;

    // Nested routers strip their prefix from `req.uri()`; the gatekeeper sees the full path.
    let policy_request = PolicyRequest::new(
        credential.realm(),
        req.method().as_str(),
        original_uri.path(),
    );
    let (realm, claims) = credential.into_parts();

    let validation = match state.policy.check_authorization(&policy_request).await {
        Ok(decision) => decision,
        Err(err) => {
            match &err {
                PolicyError::Denied { status } => tracing::warn!(
                    realm = %policy_request.organization,
                    method = %policy_request.method,
                    path = %policy_request.path,
                    status,
                    "gatekeeper denied request"
                ),
                PolicyError::Upstream(reason) => tracing::error!(
                    realm = %policy_request.organization,
                    error = %reason,
                    "gatekeeper validation error"
                ),
            }
            return Err(err.into());
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut()
        .insert(GateCtx::new(realm, claims, validation));

    let response = next.run(req).await;

    state.usage.submit(policy_request);

    Ok(response)
}
