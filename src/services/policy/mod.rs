/*
 * Responsibility
 * - gatekeeper (policy service) との通信を一箇所に閉じ込める
 * - middleware は PolicyService trait だけを見る (テストでは fake に差し替え)
 */
mod client;
mod gatekeeper;
mod types;

pub use client::{PolicyError, PolicyService, UsageError};
pub use gatekeeper::{GatekeeperClient, RECORD_USAGE_PATH, VALIDATE_PATH};
pub use types::PolicyRequest;
