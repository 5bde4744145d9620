use serde::Serialize;

/// Body sent to both gatekeeper endpoints.
///
/// `organization` is always the credential's realm; `method` and `path` mirror the
/// inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRequest {
    #[serde(rename = "organization_name")]
    pub organization: String,
    pub method: String,
    pub path: String,
}

impl PolicyRequest {
    pub fn new(
        organization: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            method: method.into(),
            path: path.into(),
        }
    }
}
