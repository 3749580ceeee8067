use crate::cache::ViewCache;
use crate::cache::keys;
use crate::cache::models::CachedPostView;
use crate::store::StoreError;

/// 时间线缓存操作
impl ViewCache {
    /// 读取用户时间线缓存
    /// 存储故障或数据损坏一律按未命中处理，读路径不能被缓存阻塞
    pub async fn get_timeline(&self, user_id: u64) -> Option<Vec<CachedPostView>> {
        let key = keys::timeline_key(user_id);
        let json = match self.store.get(&key).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("timeline cache read failed for user {}: {}", user_id, e);
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(posts) => Some(posts),
            Err(e) => {
                tracing::warn!("discarding corrupt timeline cache for user {}: {}", user_id, e);
                None
            }
        }
    }

    /// 写入用户时间线缓存(最新帖在前的快照序列)
    pub async fn put_timeline(
        &self,
        user_id: u64,
        posts: &[CachedPostView],
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        let key = keys::timeline_key(user_id);
        let json = serde_json::to_string(posts)?;
        self.store.set_ex(&key, &json, ttl_secs).await
    }

    /// 删除单个用户的时间线缓存
    pub async fn invalidate_timeline(&self, user_id: u64) -> Result<(), StoreError> {
        self.store.delete(&[keys::timeline_key(user_id)]).await
    }

    /// 帖子变更后的扇出失效: 作者本人加上全部粉丝的时间线
    /// 粉丝的缓存时间线里可能嵌着这条帖子的旧快照
    pub async fn invalidate_author_and_followers(
        &self,
        author_id: u64,
        follower_ids: &[u64],
    ) -> Result<(), StoreError> {
        let mut stale_keys = Vec::with_capacity(follower_ids.len() + 1);
        stale_keys.push(keys::timeline_key(author_id));
        stale_keys.extend(follower_ids.iter().map(|id| keys::timeline_key(*id)));
        self.store.delete(&stale_keys).await
    }
}
