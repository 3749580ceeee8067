use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::utils::{error_codes, error_to_api_response};

#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    InternalServerError,
    /// 超出限流预算，携带策略额度与窗口释放时刻
    RateLimited {
        action: String,
        limit: u32,
        reset_at: i64,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                error_to_api_response::<()>(error_codes::AUTH_FAILED, "未授权访问".into()),
            )
                .into_response(),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response::<()>(error_codes::INTERNAL_ERROR, "内部服务器错误".into()),
            )
                .into_response(),
            AppError::RateLimited {
                action,
                limit,
                reset_at,
            } => {
                let body = error_to_api_response::<()>(
                    error_codes::RATE_LIMIT,
                    format!("操作 {} 过于频繁，请稍后重试", action),
                );
                let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                let headers = response.headers_mut();
                headers.insert("X-RateLimit-Limit", HeaderValue::from(limit));
                headers.insert("X-RateLimit-Reset", HeaderValue::from(reset_at));
                response
            }
        }
    }
}
