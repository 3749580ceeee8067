// 存储抽象模块
// 限流与视图缓存共用的键值存储协议:
// 带TTL的字符串键，加上有序集合上的原子滑动窗口批处理

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use thiserror::Error;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("存储访问失败: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("缓存数据编解码失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 键值存储协议
/// 任何支持按键过期和原子批处理的有序键值存储都可以实现
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;

    /// 一次调用删除多个键
    async fn delete(&self, keys: &[String]) -> Result<(), StoreError>;

    /// 滑动窗口批处理，整体原子执行:
    /// 1. 移除分数小于 window_start 的过期成员
    /// 2. 读取集合基数(返回值，即本次尝试之前窗口内的事件数)
    /// 3. 以 now 为分数写入本次事件
    /// 4. 重置键的TTL，空闲键自行消失
    async fn slide_window(
        &self,
        key: &str,
        window_start: i64,
        now: i64,
        member: &str,
        ttl_secs: u64,
    ) -> Result<u64, StoreError>;

    /// 移除窗口内的单个成员(拒绝后的补偿删除)
    async fn remove_window_member(&self, key: &str, member: &str) -> Result<(), StoreError>;
}
