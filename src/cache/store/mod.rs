// 会话存储后端
//
// 与浏览器 localStorage 的语义一致：按键存取字符串，删除不存在的键不是错误。
mod file;
mod memory;
mod redis_store;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

use crate::error::StoreError;

pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
