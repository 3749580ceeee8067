// 缓存操作逻辑

pub mod post;
pub mod timeline;
