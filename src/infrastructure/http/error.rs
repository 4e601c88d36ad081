//! HTTP Error Handling
//!
//! 失败结果到 HTTP 状态码与响应体的映射：
//!
//! | 错误                 | 状态 | 响应体              |
//! |----------------------|------|---------------------|
//! | 请求校验失败         | 400  | `{ error }`         |
//! | 请求体超出上限       | 413  | `{ error }`         |
//! | worker 输出异常      | 500  | `{ error, detail }` |
//! | worker 非零退出      | 500  | `{ error, detail }` |
//! | worker 启动失败      | 500  | `{ error, detail }` |
//! | stdin 写入失败       | 500  | `{ error, detail }` |
//! | worker 超时          | 504  | `{ error, detail }` |

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::{ApplicationError, WorkerFailure};

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PayloadTooLarge(String),
    Worker(WorkerFailure),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Worker(WorkerFailure::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let response = match &self {
            ApiError::BadRequest(msg) | ApiError::PayloadTooLarge(msg) => {
                tracing::warn!(status = status.as_u16(), error = %msg, "Bad request");
                ErrorResponse::new(msg.clone())
            }
            ApiError::Worker(failure) => {
                tracing::error!(
                    status = status.as_u16(),
                    kind = failure.kind(),
                    detail = %failure.detail(),
                    "Mood worker failure"
                );
                ErrorResponse::new(failure.summary()).with_detail(failure.detail())
            }
        };

        (status, Json(response)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::Worker(failure) => ApiError::Worker(failure),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge(format!(
                "Request body too large: {}",
                rejection.body_text()
            ));
        }
        ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}
