use async_trait::async_trait;
use redis::{ErrorKind, RedisError};
use social_backend::store::{Store, StoreError};

/// 每个操作都失败的存储实现，用于验证存储故障下的行为
pub struct UnavailableStore;

fn store_down() -> StoreError {
    StoreError::Redis(RedisError::from((ErrorKind::IoError, "connection refused")))
}

#[async_trait]
impl Store for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(store_down())
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<(), StoreError> {
        Err(store_down())
    }

    async fn delete(&self, _keys: &[String]) -> Result<(), StoreError> {
        Err(store_down())
    }

    async fn slide_window(
        &self,
        _key: &str,
        _window_start: i64,
        _now: i64,
        _member: &str,
        _ttl_secs: u64,
    ) -> Result<u64, StoreError> {
        Err(store_down())
    }

    async fn remove_window_member(&self, _key: &str, _member: &str) -> Result<(), StoreError> {
        Err(store_down())
    }
}
