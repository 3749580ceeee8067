mod error_handler;
pub mod rate_limit;

pub use error_handler::log_errors;
pub use rate_limit::{ActionLimit, RateLimiter};

/// 认证中间件解析出的当前用户身份，写入请求扩展
/// 认证逻辑在本核心之外完成，这里只定义边界类型
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub u64);
