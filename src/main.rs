use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{Json, Router, routing::get};
use social_backend::{
    AppState,
    cache::ViewCache,
    config::Config,
    middleware::{
        log_errors,
        rate_limit::{self, ActionLimit, RateLimiter},
    },
    store::{RedisStore, Store},
    utils::{ApiResponse, success_to_api_response},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置 Redis 客户端与存储抽象
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");
    let store: Arc<dyn Store> = Arc::new(RedisStore::new(redis_client));

    // 限流器与视图缓存在进程启动时构造一次，以句柄传入请求处理
    let rate_limiter = Arc::new(RateLimiter::new(store.clone()));
    let view_cache = Arc::new(ViewCache::new(
        store.clone(),
        config.timeline_cache_ttl_secs,
        config.post_cache_ttl_secs,
    ));

    let state = AppState {
        config: config.clone(),
        store,
        cache: view_cache,
    };

    // 业务路由在各自的路由表上叠加更严格的动作级策略；
    // 这里挂全局按IP限流与错误日志
    let router: Router<AppState> = Router::new()
        .route("/health", get(health))
        .layer(axum::middleware::from_fn(log_errors))
        .layer(axum::middleware::from_fn_with_state(
            (
                rate_limiter.clone(),
                ActionLimit {
                    action: "request",
                    policy: config.default_rate_limit_policy(),
                },
            ),
            rate_limit::by_ip,
        ));

    // 开发模式下放开CORS
    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    let app = router.with_state(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}

async fn health() -> Json<ApiResponse<serde_json::Value>> {
    success_to_api_response(serde_json::json!({ "status": "ok" }))
}
