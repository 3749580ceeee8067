use std::sync::Arc;

use config::Config;

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod store;
pub mod utils;

use cache::ViewCache;
use store::Store;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub cache: Arc<ViewCache>,
}
