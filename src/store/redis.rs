use std::sync::Arc;

use ::redis::{AsyncCommands, Client as RedisClient};
use async_trait::async_trait;

use super::{Store, StoreError};

/// Redis 存储实现
/// 滑动窗口批处理通过 MULTI/EXEC 管道原子执行
pub struct RedisStore {
    client: Arc<RedisClient>,
}

impl RedisStore {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(keys).await?;
        Ok(())
    }

    async fn slide_window(
        &self,
        key: &str,
        window_start: i64,
        now: i64,
        member: &str,
        ttl_secs: u64,
    ) -> Result<u64, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // 清理、计数、记录、续期作为单个原子批次执行，
        // 避免同键并发调用之间的读改写竞争
        let (count,): (u64,) = ::redis::pipe()
            .atomic()
            .zrembyscore(key, "-inf", format!("({}", window_start))
            .ignore()
            .zcard(key)
            .zadd(key, member, now)
            .ignore()
            .expire(key, ttl_secs as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count)
    }

    async fn remove_window_member(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.zrem(key, member).await?;
        Ok(())
    }
}
