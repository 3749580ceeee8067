// 缓存键模块
// 提供各种缓存键生成函数

pub mod rate_limit_keys;
pub mod view_keys;

pub use view_keys::{post_key, timeline_key};
