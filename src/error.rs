/*
 * Responsibility
 * - gate の失敗を 401 / 403 / 500 に変換する GateError
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - usage 報告の失敗 (UsageError) はここには入らない
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::credential::CredentialError;
use crate::services::policy::PolicyError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    InvalidCredential(#[from] CredentialError),
    #[error("Unauthorized by gatekeeper")]
    Denied,
    #[error("Gatekeeper validation failed: {0}")]
    UpstreamUnavailable(String),
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::InvalidCredential(_) => StatusCode::UNAUTHORIZED,
            GateError::Denied => StatusCode::FORBIDDEN,
            GateError::UpstreamUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            GateError::InvalidCredential(_) => "UNAUTHORIZED",
            GateError::Denied => "FORBIDDEN",
            GateError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
        }
    }
}

impl From<PolicyError> for GateError {
    fn from(e: PolicyError) -> Self {
        match e {
            PolicyError::Denied { .. } => GateError::Denied,
            PolicyError::Upstream(reason) => GateError::UpstreamUnavailable(reason),
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        };

        (self.status(), Json(body)).into_response()
    }
}
