//! Opaque JSON documents passed through the gate.
//!
//! Token claims and gatekeeper decisions are never interpreted here beyond the
//! `realm` claim, so both are kept as order-preserving JSON objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Order-preserving JSON object (`serde_json` is built with `preserve_order`).
pub type Document = serde_json::Map<String, Value>;

/// Decoded bearer token payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Document);

impl Claims {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Document> for Claims {
    fn from(doc: Document) -> Self {
        Self(doc)
    }
}

/// Decision attributes returned by the gatekeeper's `/validate` endpoint.
///
/// An empty decision means the gatekeeper answered 200 without a usable JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decision(Document);

impl Decision {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Document> for Decision {
    fn from(doc: Document) -> Self {
        Self(doc)
    }
}
