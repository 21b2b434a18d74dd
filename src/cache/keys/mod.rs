/// 缓存键模块

pub mod session_keys;

pub use session_keys::{REMEMBER_ME_KEY, SESSION_STORAGE_KEY, namespaced_key};
