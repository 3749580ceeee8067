/// 按认证用户维度的限流键
/// 主体、身份空间与动作三段分隔，不同动作的预算互不影响
pub fn user_key(user_id: u64, action: &str) -> String {
    format!("rate_limit:user:{}:{}", user_id, action)
}

/// 按客户端IP维度的限流键
pub fn ip_key(ip: &str, action: &str) -> String {
    format!("rate_limit:ip:{}:{}", ip, action)
}
