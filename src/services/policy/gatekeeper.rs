//! HTTP gatekeeper client.
//!
//! One `reqwest::Client` (and therefore one connection pool) is built per process and
//! shared by every request; cloning `GatekeeperClient` only bumps reference counts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::services::document::{Decision, Document};
use crate::services::policy::{PolicyError, PolicyRequest, PolicyService, UsageError};

pub const VALIDATE_PATH: &str = "/validate";
pub const RECORD_USAGE_PATH: &str = "/recordUsage";

#[derive(Clone, Debug)]
pub struct GatekeeperClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    check_timeout: Duration,
}

impl GatekeeperClient {
    /// Build a client with its own connection pool.
    ///
    /// `check_timeout` bounds every `/validate` round-trip. Usage reports are bounded
    /// by the reporter instead.
    pub fn new(base_url: &str, check_timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(check_timeout)
            .build()?;

        Ok(Self::with_client(http, base_url, check_timeout))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, check_timeout: Duration) -> Self {
        Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            check_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl PolicyService for GatekeeperClient {
    async fn check_authorization(&self, request: &PolicyRequest) -> Result<Decision, PolicyError> {
        tracing::debug!(
            realm = %request.organization,
            method = %request.method,
            path = %request.path,
            "calling gatekeeper"
        );

        let response = self
            .http
            .post(self.endpoint(VALIDATE_PATH))
            .timeout(self.check_timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| PolicyError::Upstream(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PolicyError::Denied {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PolicyError::Upstream(e.to_string()))?;

        Ok(decode_decision(&body))
    }

    async fn report_usage(&self, request: &PolicyRequest) -> Result<(), UsageError> {
        let response = self
            .http
            .post(self.endpoint(RECORD_USAGE_PATH))
            .json(request)
            .send()
            .await
            .map_err(|e| UsageError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UsageError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

/// A 200 with an unusable body still authorizes; it just carries no attributes.
fn decode_decision(body: &[u8]) -> Decision {
    match serde_json::from_slice::<Document>(body) {
        Ok(doc) => Decision::from(doc),
        Err(err) => {
            tracing::debug!(error = %err, "gatekeeper decision is not a JSON object; using empty decision");
            Decision::default()
        }
    }
}
