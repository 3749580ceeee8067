/// 用户时间线缓存键
pub fn timeline_key(user_id: u64) -> String {
    format!("timeline:{}", user_id)
}

/// 单帖缓存键
pub fn post_key(post_id: u64) -> String {
    format!("post:{}", post_id)
}
