use std::env;

use crate::middleware::rate_limit::RateLimitPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub rate_limit_window_secs: i64,
    pub rate_limit_requests: u32,
    pub timeline_cache_ttl_secs: u64,
    pub post_cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            redis_url: env::var("REDIS_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW")
                .unwrap_or_default()
                .parse()
                .unwrap_or(60),
            rate_limit_requests: env::var("RATE_LIMIT_REQUESTS")
                .unwrap_or_default()
                .parse()
                .unwrap_or(100),
            // 时间线缓存5分钟，单帖缓存10分钟，均可通过环境变量调整
            timeline_cache_ttl_secs: env::var("TIMELINE_CACHE_TTL")
                .unwrap_or_default()
                .parse()
                .unwrap_or(300),
            post_cache_ttl_secs: env::var("POST_CACHE_TTL")
                .unwrap_or_default()
                .parse()
                .unwrap_or(600),
        })
    }

    /// 默认限流策略，按路由可被更严格的策略覆盖
    pub fn default_rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            requests_allowed: self.rate_limit_requests,
            window_secs: self.rate_limit_window_secs,
        }
    }
}
