//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping  GET   存活检查
//! - /api/tts   POST  校验文本并说明服务端合成不可用（501）
//! - /api/tts   GET   服务元数据（限制、参数范围、导出方式）

use axum::{routing::get, Router};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/tts", get(handlers::tts_info).post(handlers::synthesize))
}
