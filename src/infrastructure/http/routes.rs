//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                 GET   健康检查
//! - /api/detect-mood          POST  从图片识别情绪
//! - /api/detect-mood-python   POST  同上（旧前端使用的路径）

use axum::{
    routing::{get, post},
    Router,
};
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
        .route("/detect-mood", post(handlers::detect_mood))
        .route("/detect-mood-python", post(handlers::detect_mood))
}
