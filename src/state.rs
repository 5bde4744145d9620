/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - policy: gatekeeper クライアント (接続プールを全リクエストで共有)
 *   - usage: usage 報告ワーカーへのハンドル
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::policy::PolicyService;
use crate::services::usage::UsageReporter;

#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<dyn PolicyService>,
    pub usage: UsageReporter,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(policy: Arc<dyn PolicyService>, usage: UsageReporter) -> Self {
        Self { policy, usage }
    }
}
