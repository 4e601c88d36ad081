//! HTTP Middleware
//!
//! 4xx/5xx 响应日志中间件

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// 记录 4xx/5xx 响应及其耗时
///
/// worker 失败的具体诊断在 ApiError::into_response() 中记录，这里只记录请求维度信息
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use tower::util::ServiceExt;

    async fn bad_request() -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    async fn gateway_timeout() -> StatusCode {
        StatusCode::GATEWAY_TIMEOUT
    }

    fn create_test_router() -> Router {
        Router::new()
            .route("/bad", post(bad_request))
            .route("/slow", post(gateway_timeout))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    #[tokio::test]
    async fn test_status_passes_through() {
        for (uri, expected) in [
            ("/bad", StatusCode::BAD_REQUEST),
            ("/slow", StatusCode::GATEWAY_TIMEOUT),
            ("/missing", StatusCode::NOT_FOUND),
        ] {
            let request = HttpRequest::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap();

            let response = create_test_router().oneshot(request).await.unwrap();
            assert_eq!(response.status(), expected);
        }
    }
}
