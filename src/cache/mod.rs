// 缓存模块
// 包含会话数据结构、存储后端和操作逻辑

pub mod keys;
pub mod models;
pub mod operations;
pub mod store;

// 重新导出常用类型，方便其他模块使用
pub use models::session::{SessionRecord, SessionUser, UserId};
pub use operations::session::{LoginOutcome, LogoutOutcome, SessionManager};
pub use store::{FileStore, MemoryStore, RedisStore, SessionStore};
