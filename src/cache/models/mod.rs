// 缓存数据模型
// 视图快照反映填充缓存那一刻的权威数据

pub mod post;

pub use post::{CachedPostView, CachedUserView};
