use std::sync::Arc;

use chrono::Utc;
use social_backend::cache::{CachedPostView, CachedUserView, ViewCache};
use social_backend::store::MemoryStore;

mod common;
use common::UnavailableStore;

fn user_view(id: u64, username: &str) -> CachedUserView {
    CachedUserView {
        id,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        bio: String::new(),
        avatar: String::new(),
        created_at: Utc::now(),
    }
}

fn post_view(id: u64, author: &CachedUserView) -> CachedPostView {
    CachedPostView {
        id,
        content: format!("post {}", id),
        image_url: String::new(),
        like_count: 3,
        created_at: Utc::now(),
        user: author.clone(),
        is_liked: false,
    }
}

fn view_cache() -> (Arc<MemoryStore>, ViewCache) {
    let store = Arc::new(MemoryStore::new());
    let cache = ViewCache::new(store.clone(), 300, 600);
    (store, cache)
}

#[test_log::test(tokio::test)]
async fn post_round_trip_and_ttl_expiry() {
    let (store, cache) = view_cache();
    let author = user_view(1, "alice");
    let post = post_view(42, &author);

    cache.put_post(42, &post, cache.post_ttl_secs()).await.unwrap();
    assert_eq!(cache.get_post(42).await, Some(post));

    // TTL走完后自动失效
    store.advance(601);
    assert_eq!(cache.get_post(42).await, None);
}

#[test_log::test(tokio::test)]
async fn timeline_put_get_invalidate() {
    let (_store, cache) = view_cache();
    let author = user_view(1, "alice");
    let posts = vec![post_view(10, &author), post_view(9, &author)];

    cache.put_timeline(42, &posts, cache.timeline_ttl_secs()).await.unwrap();
    assert_eq!(cache.get_timeline(42).await, Some(posts));

    cache.invalidate_timeline(42).await.unwrap();
    assert_eq!(cache.get_timeline(42).await, None);
}

#[test_log::test(tokio::test)]
async fn timeline_expires_after_ttl() {
    let (store, cache) = view_cache();
    let author = user_view(1, "alice");
    let posts = vec![post_view(10, &author)];

    cache.put_timeline(42, &posts, cache.timeline_ttl_secs()).await.unwrap();
    store.advance(301);
    assert_eq!(cache.get_timeline(42).await, None);
}

#[test_log::test(tokio::test)]
async fn post_mutation_fans_out_to_author_and_all_followers() {
    let (_store, cache) = view_cache();
    let author = user_view(1, "alice");
    let posts = vec![post_view(10, &author)];

    for user_id in [1, 2, 3, 4, 99] {
        cache.put_timeline(user_id, &posts, cache.timeline_ttl_secs()).await.unwrap();
    }

    // 作者1的粉丝是{2,3,4}，用户99与这次写入无关
    cache
        .invalidate_author_and_followers(1, &[2, 3, 4])
        .await
        .unwrap();

    for user_id in [1, 2, 3, 4] {
        assert_eq!(cache.get_timeline(user_id).await, None);
    }
    assert!(cache.get_timeline(99).await.is_some());
}

#[test_log::test(tokio::test)]
async fn follow_edge_only_invalidates_follower_timeline() {
    let (_store, cache) = view_cache();
    let author = user_view(5, "bob");
    let posts = vec![post_view(20, &author)];
    let post = post_view(21, &author);

    cache.put_timeline(5, &posts, cache.timeline_ttl_secs()).await.unwrap();
    cache.put_timeline(6, &posts, cache.timeline_ttl_secs()).await.unwrap();
    cache.put_post(21, &post, cache.post_ttl_secs()).await.unwrap();

    // 用户6关注/取关用户5: 只有用户6自己的时间线成员集变了
    cache.invalidate_timeline(6).await.unwrap();

    assert_eq!(cache.get_timeline(6).await, None);
    assert!(cache.get_timeline(5).await.is_some());
    assert!(cache.get_post(21).await.is_some());
}

#[test_log::test(tokio::test)]
async fn post_delete_scenario_keeps_unrelated_post_entry() {
    let (_store, cache) = view_cache();
    let author = user_view(7, "carol");
    let other = user_view(30, "dave");
    let posts = vec![post_view(50, &author)];
    let unrelated_post = post_view(60, &other);

    for user_id in [7, 8, 9] {
        cache.put_timeline(user_id, &posts, cache.timeline_ttl_secs()).await.unwrap();
    }
    cache.put_post(50, &posts[0], cache.post_ttl_secs()).await.unwrap();
    cache.put_post(60, &unrelated_post, cache.post_ttl_secs()).await.unwrap();

    // 作者7删帖，粉丝是{8,9}: 删除帖子缓存并扇出时间线失效
    cache.invalidate_post(50).await.unwrap();
    cache.invalidate_author_and_followers(7, &[8, 9]).await.unwrap();

    for user_id in [7, 8, 9] {
        assert_eq!(cache.get_timeline(user_id).await, None);
    }
    assert_eq!(cache.get_post(50).await, None);
    assert_eq!(cache.get_post(60).await, Some(unrelated_post));
}

#[test_log::test(tokio::test)]
async fn corrupt_cache_payload_degrades_to_miss() {
    let (store, cache) = view_cache();
    use social_backend::store::Store;

    store
        .set_ex("timeline:42", "not valid json", 300)
        .await
        .unwrap();
    assert_eq!(cache.get_timeline(42).await, None);
}

#[test_log::test(tokio::test)]
async fn invalidating_absent_entries_is_a_no_op() {
    let (_store, cache) = view_cache();

    // 幂等: 目标不存在时照常成功
    cache.invalidate_timeline(12345).await.unwrap();
    cache.invalidate_post(12345).await.unwrap();
    cache
        .invalidate_author_and_followers(12345, &[1, 2])
        .await
        .unwrap();
}

#[test_log::test(tokio::test)]
async fn store_outage_degrades_reads_to_miss_and_surfaces_write_errors() {
    let cache = ViewCache::new(Arc::new(UnavailableStore), 300, 600);
    let author = user_view(1, "alice");
    let posts = vec![post_view(10, &author)];

    // 读路径对存储故障透明降级为未命中
    assert_eq!(cache.get_timeline(42).await, None);
    assert_eq!(cache.get_post(10).await, None);

    // 写入与失效把故障交给调用方记录，不得静默吞掉
    assert!(cache.put_timeline(42, &posts, 300).await.is_err());
    assert!(cache.put_post(10, &posts[0], 600).await.is_err());
    assert!(cache.invalidate_timeline(42).await.is_err());
    assert!(cache.invalidate_post(10).await.is_err());
    assert!(cache.invalidate_author_and_followers(1, &[2, 3]).await.is_err());
}
