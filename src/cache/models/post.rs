use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户公开信息快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedUserView {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

/// 单帖公开视图快照
/// is_liked 表示填充缓存时的观察者是否点过赞
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPostView {
    pub id: u64,
    pub content: String,
    pub image_url: String,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub user: CachedUserView,
    pub is_liked: bool,
}
