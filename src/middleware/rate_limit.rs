use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use thiserror::Error;

use crate::{
    cache::keys::rate_limit_keys,
    error::AppError,
    middleware::CurrentUser,
    store::{Store, StoreError},
};

/// 单个动作的限流策略
/// 同一主体按动作独立计预算，多个命名策略可以共存
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub requests_allowed: u32,
    pub window_secs: i64,
}

/// 限流判定结果
/// 拒绝不是错误，而是预期内的业务结果，携带窗口释放时刻
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Denied { retry_after: i64 },
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    /// 调用方约定错误: 要求按用户限流却没有用户身份
    #[error("missing authenticated subject for user-scoped rate limit")]
    MissingSubject,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 滑动窗口限流器
/// 进程启动时构造一次，以句柄传入各请求处理路径
pub struct RateLimiter {
    store: Arc<dyn Store>,
    // 同一秒内的多次尝试也要有互不相同的集合成员
    seq: AtomicU64,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            seq: AtomicU64::new(0),
        }
    }

    /// 按已认证用户限流，缺少用户身份属于调用方错误
    pub async fn check_user(
        &self,
        user_id: Option<u64>,
        action: &str,
        policy: &RateLimitPolicy,
    ) -> Result<Admission, RateLimitError> {
        let user_id = user_id.ok_or(RateLimitError::MissingSubject)?;
        let key = rate_limit_keys::user_key(user_id, action);
        Ok(self.check_and_record(&key, policy).await?)
    }

    /// 按客户端IP限流
    pub async fn check_ip(
        &self,
        ip: &str,
        action: &str,
        policy: &RateLimitPolicy,
    ) -> Result<Admission, RateLimitError> {
        let key = rate_limit_keys::ip_key(ip, action);
        Ok(self.check_and_record(&key, policy).await?)
    }

    /// 优先按用户限流，未认证时退回IP维度
    pub async fn check_user_or_ip(
        &self,
        user_id: Option<u64>,
        ip: &str,
        action: &str,
        policy: &RateLimitPolicy,
    ) -> Result<Admission, RateLimitError> {
        let key = match user_id {
            Some(id) => rate_limit_keys::user_key(id, action),
            None => rate_limit_keys::ip_key(ip, action),
        };
        Ok(self.check_and_record(&key, policy).await?)
    }

    /// 滑动窗口核心检查
    /// "清理-计数-记录-续期"以单个原子批次提交，计数读到的是
    /// 本次尝试之前窗口内的事件数
    pub async fn check_and_record(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
    ) -> Result<Admission, StoreError> {
        self.check_at(key, policy, Utc::now().timestamp()).await
    }

    async fn check_at(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now: i64,
    ) -> Result<Admission, StoreError> {
        let window_start = now - policy.window_secs;
        let ttl = policy.window_secs.max(0) as u64;
        let member = format!("{}-{}", now, self.seq.fetch_add(1, Ordering::Relaxed));

        let prior_count = self
            .store
            .slide_window(key, window_start, now, &member, ttl)
            .await?;

        if prior_count >= policy.requests_allowed as u64 {
            // 被拒绝的尝试不应计入后续窗口，尽力移除刚写入的成员；
            // 移除失败只会造成轻微多计，不影响判定结果
            if let Err(e) = self.store.remove_window_member(key, &member).await {
                tracing::warn!("failed to roll back denied attempt for {}: {}", key, e);
            }
            return Ok(Admission::Denied {
                retry_after: now + policy.window_secs,
            });
        }

        Ok(Admission::Allowed)
    }
}

/// 路由上绑定的限流动作与策略
#[derive(Clone)]
pub struct ActionLimit {
    pub action: &'static str,
    pub policy: RateLimitPolicy,
}

/// 按已认证用户限流的中间件
pub async fn by_user(
    State((limiter, limit)): State<(Arc<RateLimiter>, ActionLimit)>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let outcome = limiter
        .check_user(current_user_id(&req), limit.action, &limit.policy)
        .await;
    finish(outcome, &limit, req, next).await
}

/// 按客户端IP限流的中间件
pub async fn by_ip(
    State((limiter, limit)): State<(Arc<RateLimiter>, ActionLimit)>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);
    let outcome = limiter.check_ip(&ip, limit.action, &limit.policy).await;
    finish(outcome, &limit, req, next).await
}

/// 优先用户、退回IP的中间件
pub async fn by_user_or_ip(
    State((limiter, limit)): State<(Arc<RateLimiter>, ActionLimit)>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);
    let outcome = limiter
        .check_user_or_ip(current_user_id(&req), &ip, limit.action, &limit.policy)
        .await;
    finish(outcome, &limit, req, next).await
}

async fn finish(
    outcome: Result<Admission, RateLimitError>,
    limit: &ActionLimit,
    req: Request<Body>,
    next: Next,
) -> Response {
    match outcome {
        Ok(Admission::Allowed) => next.run(req).await,
        Ok(Admission::Denied { retry_after }) => AppError::RateLimited {
            action: limit.action.to_string(),
            limit: limit.policy.requests_allowed,
            reset_at: retry_after,
        }
        .into_response(),
        Err(RateLimitError::MissingSubject) => AppError::Unauthorized.into_response(),
        Err(RateLimitError::Store(e)) => {
            // 存储故障不能当成放行，也不能当成超限: 拒绝请求(fail closed)
            tracing::error!("rate limit store failure for {}: {}", limit.action, e);
            AppError::InternalServerError.into_response()
        }
    }
}

fn current_user_id(req: &Request<Body>) -> Option<u64> {
    req.extensions().get::<CurrentUser>().map(|user| user.0)
}

/// 从请求头或连接信息推导客户端IP
fn client_ip(req: &Request<Body>) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}
