/// Factory: build the process-level gatekeeper services from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::policy::{GatekeeperClient, PolicyService};
use crate::services::usage::UsageReporter;

pub fn build_policy_service(config: &Config) -> Result<Arc<dyn PolicyService>, reqwest::Error> {
    let client = GatekeeperClient::new(&config.gatekeeper_url, config.gatekeeper_timeout)?;
    tracing::info!(
        base_url = %client.base_url(),
        check_timeout_ms = config.gatekeeper_timeout.as_millis() as u64,
        "gatekeeper client ready"
    );
    Ok(Arc::new(client))
}

/// Must be called from inside the tokio runtime (the worker is spawned immediately).
pub fn build_usage_reporter(config: &Config, policy: Arc<dyn PolicyService>) -> UsageReporter {
    UsageReporter::spawn(policy, config.usage)
}
