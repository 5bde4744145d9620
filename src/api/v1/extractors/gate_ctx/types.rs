/*
 * Responsibility
 * - Handler から見える「gate 通過済みコンテキスト」の型
 * - middleware が組み立てて request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - フィールドは private。handler は読むだけで書き換えられない
 * - claims / decision の中身はここでは解釈しない
 */
use serde::Serialize;

use crate::services::document::{Claims, Decision};

/// Context attached to every request that passed the gate.
///
/// - `realm`: tenant taken from the bearer token
/// - `token_payload`: the full decoded claim set, unverified
/// - `validation`: the gatekeeper's decision (empty when the 200 body was unusable)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateCtx {
    realm: String,
    token_payload: Claims,
    validation: Decision,
}

impl GateCtx {
    pub fn new(realm: String, token_payload: Claims, validation: Decision) -> Self {
        Self {
            realm,
            token_payload,
            validation,
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn token_payload(&self) -> &Claims {
        &self.token_payload
    }

    pub fn validation(&self) -> &Decision {
        &self.validation
    }
}
