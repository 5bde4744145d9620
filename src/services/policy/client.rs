//! Policy service interface used by the gate middleware and the usage reporter.
use async_trait::async_trait;
use thiserror::Error;

use crate::services::document::Decision;
use crate::services::policy::PolicyRequest;

/// Failure of the authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The gatekeeper answered with anything other than 200.
    #[error("gatekeeper denied the request (status {status})")]
    Denied { status: u16 },
    /// The gatekeeper could not be reached or the exchange broke mid-way.
    #[error("{0}")]
    Upstream(String),
}

/// Failure of a usage report.
///
/// Kept apart from `PolicyError` so the report path cannot turn into a request error;
/// these only ever end up in a log line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("usage transport error: {0}")]
    Transport(String),
    #[error("usage rejected with status {status}")]
    Rejected { status: u16 },
}

/// Remote authorization + metering.
///
/// Implementations are shared across all in-flight requests and must be safe for
/// concurrent use without external locking.
#[async_trait]
pub trait PolicyService: Send + Sync + 'static {
    // POST {base}/validate. Ok only on HTTP 200.
    async fn check_authorization(&self, request: &PolicyRequest) -> Result<Decision, PolicyError>;

    // POST {base}/recordUsage. Single attempt; the caller only logs the outcome.
    async fn report_usage(&self, request: &PolicyRequest) -> Result<(), UsageError>;
}
