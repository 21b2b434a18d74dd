use std::sync::Arc;

use cache::{FileStore, MemoryStore, RedisStore, SessionManager, SessionStore};
use config::{Config, StoreKind};
use error::StoreError;
use timing::Clock;

pub mod activity;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod navigation;
pub mod timing;
pub mod utils;

/// 根据配置创建存储后端
pub fn open_store(config: &Config) -> Result<Arc<dyn SessionStore>, StoreError> {
    let store: Arc<dyn SessionStore> = match config.store {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::File => Arc::new(FileStore::new(&config.session_dir)),
        StoreKind::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .ok_or_else(|| StoreError::Unavailable("REDIS_URL is not set".into()))?;
            Arc::new(RedisStore::open(url)?)
        }
    };
    Ok(store)
}

/// 按配置组装会话管理器
pub fn session_manager(
    config: &Config,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
) -> SessionManager {
    SessionManager::new(store, clock).with_ttl(config.session_ttl())
}
