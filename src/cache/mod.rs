// 缓存模块
// 读旁路缓存(cache-aside): 读路径未命中时由调用方回源填充，写路径显式失效

pub mod keys;
pub mod models;
pub mod operations;

pub use models::{CachedPostView, CachedUserView};

use std::sync::Arc;

use crate::store::Store;

/// 时间线与单帖视图缓存
/// 缓存项是可丢弃的优化，关系库才是权威数据源；
/// 除显式失效外还依赖TTL兜底，保证错过失效时的旧数据有界
pub struct ViewCache {
    store: Arc<dyn Store>,
    timeline_ttl_secs: u64,
    post_ttl_secs: u64,
}

impl ViewCache {
    pub fn new(store: Arc<dyn Store>, timeline_ttl_secs: u64, post_ttl_secs: u64) -> Self {
        Self {
            store,
            timeline_ttl_secs,
            post_ttl_secs,
        }
    }

    /// 时间线缓存的默认TTL(秒)
    pub fn timeline_ttl_secs(&self) -> u64 {
        self.timeline_ttl_secs
    }

    /// 单帖缓存的默认TTL(秒)
    pub fn post_ttl_secs(&self) -> u64 {
        self.post_ttl_secs
    }
}
