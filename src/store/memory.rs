use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Store, StoreError};

/// 进程内存储实现，与 Redis 版本遵循同一套协议
/// 内置可拨动的时钟偏移，TTL和窗口老化无需真实等待即可验证
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock_offset: AtomicI64,
}

struct Entry {
    value: Value,
    expires_at: i64,
}

enum Value {
    Text(String),
    Window(BTreeMap<String, i64>),
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock_offset: AtomicI64::new(0),
        }
    }

    /// 将内部时钟向前拨动指定秒数
    pub fn advance(&self, secs: i64) {
        self.clock_offset.fetch_add(secs, Ordering::SeqCst);
    }

    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp() + self.clock_offset.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.now();
        let mut entries = self.entries.lock().await;
        let expired = matches!(entries.get(key), Some(entry) if entry.expires_at <= now);
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        match entries.get(key) {
            Some(Entry {
                value: Value::Text(text),
                ..
            }) => Ok(Some(text.clone())),
            _ => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let expires_at = self.now() + ttl_secs as i64;
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        for key in keys {
            entries.remove(key);
        }
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
        let mut entries = self.entries.lock().await;

        // 过期或类型不符的键按不存在处理
        let stale = match entries.get(key) {
            Some(entry) if entry.expires_at <= self.now() => true,
            Some(Entry {
                value: Value::Text(_),
                ..
            }) => true,
            _ => false,
        };
        if stale {
            entries.remove(key);
        }

        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: Value::Window(BTreeMap::new()),
            expires_at: now + ttl_secs as i64,
        });
        entry.expires_at = now + ttl_secs as i64;

        let Value::Window(window) = &mut entry.value else {
            unreachable!("stale entries were dropped above");
        };

        window.retain(|_, score| *score >= window_start);
        let count = window.len() as u64;
        window.insert(member.to_string(), now);

        Ok(count)
    }

    async fn remove_window_member(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if let Some(Entry {
            value: Value::Window(window),
            ..
        }) = entries.get_mut(key)
        {
            window.remove(member);
        }
        Ok(())
    }
}
