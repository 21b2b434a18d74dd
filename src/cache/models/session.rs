use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户ID，服务端可能返回数字或字符串
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Numeric(id) => write!(f, "{}", id),
            UserId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId::Numeric(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId::Text(id.to_string())
    }
}

/// 登录成功后服务端返回的身份信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub role: String,
}

/// 会话缓存数据模型
///
/// `role` 仅用于界面展示，服务端必须对每个特权请求重新校验角色。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(user: SessionUser, now: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: now,
            expires_at: expiry_after(now, ttl),
        }
    }

    /// 仅当 `now < expires_at` 时有效
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn remaining_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        if self.is_valid_at(now) {
            self.expires_at - now
        } else {
            chrono::Duration::zero()
        }
    }

    /// 从 `now` 起重新计算过期时间
    pub fn extend_from(&mut self, now: DateTime<Utc>, ttl: chrono::Duration) {
        self.expires_at = expiry_after(now, ttl);
    }

    pub fn user(&self) -> SessionUser {
        SessionUser {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
        }
    }
}

// 超出可表示范围时取最大时刻
fn expiry_after(now: DateTime<Utc>, ttl: chrono::Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
