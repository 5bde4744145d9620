/*
 * Responsibility
 * - middleware の公開インターフェース
 * - gate: bearer → gatekeeper → GateCtx → usage 報告
 * - http: request-id / trace / body limit / timeout
 */
pub mod gate;
pub mod http;
