use crate::cache::ViewCache;
use crate::cache::keys;
use crate::cache::models::CachedPostView;
use crate::store::StoreError;

/// 单帖缓存操作
impl ViewCache {
    /// 读取单帖视图缓存，故障按未命中处理
    pub async fn get_post(&self, post_id: u64) -> Option<CachedPostView> {
        let key = keys::post_key(post_id);
        let json = match self.store.get(&key).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("post cache read failed for post {}: {}", post_id, e);
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::warn!("discarding corrupt post cache for post {}: {}", post_id, e);
                None
            }
        }
    }

    /// 写入单帖视图缓存
    pub async fn put_post(
        &self,
        post_id: u64,
        post: &CachedPostView,
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        let key = keys::post_key(post_id);
        let json = serde_json::to_string(post)?;
        self.store.set_ex(&key, &json, ttl_secs).await
    }

    /// 删除单帖视图缓存
    /// 帖子创建、更新、删除提交之后都必须调用
    pub async fn invalidate_post(&self, post_id: u64) -> Result<(), StoreError> {
        self.store.delete(&[keys::post_key(post_id)]).await
    }
}
