/*!
 * Gate context extractor
 *
 * Responsibility:
 * - gate を通過したリクエストのコンテキスト（GateCtx）を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - GateCtx
 * - GateCtxExtractor
 */

mod core;
mod types;

pub use self::core::GateCtxExtractor;
pub use self::types::GateCtx;
