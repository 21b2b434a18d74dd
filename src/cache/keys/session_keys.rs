/// 浏览器会话记录的固定存储键，全局唯一
pub const SESSION_STORAGE_KEY: &str = "attendance_user_session";

/// "记住我" 标记的存储键
pub const REMEMBER_ME_KEY: &str = "remember_me";

/// Redis 后端的键前缀
const REDIS_NAMESPACE: &str = "attendance:";

/// 生成 Redis 中的实际键
pub fn namespaced_key(key: &str) -> String {
    format!("{}{}", REDIS_NAMESPACE, key)
}
