use std::sync::Arc;

use crate::api::client::AuthGateway;
use crate::api::models::auth::LoginForm;
use crate::cache::keys::{REMEMBER_ME_KEY, SESSION_STORAGE_KEY};
use crate::cache::models::session::{SessionRecord, SessionUser, UserId};
use crate::cache::store::SessionStore;
use crate::error::{ClientError, ValidationError};
use crate::middleware::{PageAccess, check_access};
use crate::navigation::UserDisplay;
use crate::timing::Clock;
use crate::utils::validate_login_form;

/// 服务端未给出跳转地址时的默认目标
const DEFAULT_REDIRECT: &str = "/";

/// 登录结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// `persisted` 为 false 表示服务端已登录但本地缓存写入失败
    Success {
        user: SessionUser,
        redirect: String,
        persisted: bool,
    },
    Rejected {
        message: String,
    },
    Invalid(ValidationError),
}

/// 登出结果，本地缓存总是已被清除
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub redirect: String,
    pub server_notified: bool,
}

/// 会话缓存操作
///
/// 在存储中只维护一条会话记录（固定键）。所有操作都不会向调用方返回错误：
/// 存储或解析失败会被记录日志，并按"未登录"处理。
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
}

impl SessionManager {
    pub const DEFAULT_TTL_MINUTES: i64 = 30;

    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: chrono::Duration::minutes(Self::DEFAULT_TTL_MINUTES),
        }
    }

    pub fn with_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// 缓存会话，无条件覆盖旧记录
    pub fn set_session(&self, user: SessionUser) -> bool {
        let record = SessionRecord::new(user, self.clock.now(), self.ttl);
        if self.write(&record) {
            tracing::info!(
                "Session stored for user {} (role {}), expires at {}",
                record.user_id,
                record.role,
                record.expires_at
            );
            tracing::debug!("Session email: {}", record.email);
            true
        } else {
            false
        }
    }

    /// 获取会话；缺失、损坏或已过期都返回 `None`，过期记录会被顺带删除
    pub fn get_session(&self) -> Option<SessionRecord> {
        let raw = match self.store.get(SESSION_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!("Error retrieving session: {}", e);
                return None;
            }
        };

        let session: SessionRecord = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Ignoring malformed session record: {}", e);
                return None;
            }
        };

        if !session.is_valid_at(self.clock.now()) {
            tracing::info!("Session expired for user {}", session.user_id);
            self.clear_session();
            return None;
        }

        Some(session)
    }

    /// 删除会话，可重复调用
    pub fn clear_session(&self) -> bool {
        match self.store.remove(SESSION_STORAGE_KEY) {
            Ok(()) => {
                tracing::debug!("Session cleared");
                true
            }
            Err(e) => {
                tracing::error!("Error clearing session: {}", e);
                false
            }
        }
    }

    /// 会话有效时把过期时间重置为 `now + ttl`
    pub fn refresh_session(&self) -> bool {
        let Some(mut session) = self.get_session() else {
            return false;
        };

        session.extend_from(self.clock.now(), self.ttl);
        if self.write(&session) {
            tracing::debug!(
                "Session refreshed for user {}, expires at {}",
                session.user_id,
                session.expires_at
            );
            true
        } else {
            false
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.get_session().is_some()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.get_session().map(|session| session.user_id)
    }

    pub fn user_role(&self) -> Option<String> {
        self.get_session().map(|session| session.role)
    }

    pub fn user_email(&self) -> Option<String> {
        self.get_session().map(|session| session.email)
    }

    pub fn user_name(&self) -> Option<String> {
        self.get_session().map(|session| session.name)
    }

    pub fn display_info(&self) -> Option<UserDisplay> {
        self.get_session().as_ref().map(UserDisplay::from)
    }

    /// 页面守卫，只给出结论，跳转由调用方执行
    pub fn protect_page(&self, required_role: Option<&str>) -> PageAccess {
        check_access(self.get_session().as_ref(), required_role)
    }

    pub fn set_remember_me(&self, remember: bool) -> bool {
        let result = if remember {
            self.store.set(REMEMBER_ME_KEY, "true")
        } else {
            self.store.remove(REMEMBER_ME_KEY)
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error storing remember-me flag: {}", e);
                false
            }
        }
    }

    pub fn remembers_me(&self) -> bool {
        matches!(self.store.get(REMEMBER_ME_KEY), Ok(Some(flag)) if flag == "true")
    }

    /// 提交登录表单，成功时写入会话缓存
    pub async fn login<G: AuthGateway>(
        &self,
        gateway: &G,
        form: &LoginForm,
    ) -> Result<LoginOutcome, ClientError> {
        if let Err(issue) = validate_login_form(form) {
            return Ok(LoginOutcome::Invalid(issue));
        }

        let response = gateway.login(form).await?;
        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "Login failed".to_string());
            tracing::info!("Login rejected: {}", message);
            return Ok(LoginOutcome::Rejected { message });
        }

        let user: SessionUser = response
            .user
            .ok_or_else(|| ClientError::Malformed("successful login without user".into()))?
            .into();

        let persisted = self.set_session(user.clone());
        if persisted && form.remember {
            self.set_remember_me(true);
        }

        Ok(LoginOutcome::Success {
            user,
            redirect: non_empty(response.redirect),
            persisted,
        })
    }

    /// 先清本地缓存再通知服务端，网络失败时依然处于未登录状态
    pub async fn logout<G: AuthGateway>(&self, gateway: &G) -> LogoutOutcome {
        self.clear_session();

        match gateway.logout().await {
            Ok(response) => LogoutOutcome {
                redirect: non_empty(response.redirect),
                server_notified: true,
            },
            Err(e) => {
                tracing::error!("Error during logout: {}", e);
                LogoutOutcome {
                    redirect: DEFAULT_REDIRECT.to_string(),
                    server_notified: false,
                }
            }
        }
    }

    fn write(&self, record: &SessionRecord) -> bool {
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Error serializing session: {}", e);
                return false;
            }
        };

        match self.store.set(SESSION_STORAGE_KEY, &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error storing session: {}", e);
                false
            }
        }
    }
}

fn non_empty(redirect: Option<String>) -> String {
    redirect
        .filter(|target| !target.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REDIRECT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::MemoryStore;
    use crate::timing::ManualClock;
    use chrono::{TimeZone, Utc};

    fn setup() -> (Arc<MemoryStore>, Arc<ManualClock>, SessionManager) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 2, 10, 9, 0, 0).unwrap(),
        ));
        let manager = SessionManager::new(store.clone(), clock.clone());
        (store, clock, manager)
    }

    fn faculty() -> SessionUser {
        SessionUser {
            user_id: UserId::Numeric(12),
            email: "k.iyer@college.edu".into(),
            name: "Kavya Iyer".into(),
            role: "FACULTY".into(),
        }
    }

    #[test]
    fn set_then_get_returns_identity_with_thirty_minute_expiry() {
        let (_, clock, manager) = setup();
        assert!(manager.set_session(faculty()));

        let session = manager.get_session().unwrap();
        assert_eq!(session.user(), faculty());
        assert_eq!(session.created_at, clock.now());
        assert_eq!(session.expires_at - session.created_at, chrono::Duration::minutes(30));
    }

    #[test]
    fn corrupted_record_reads_as_absent() {
        let (store, _, manager) = setup();
        store.set(SESSION_STORAGE_KEY, "{\"user_id\": 12, \"email\":").unwrap();
        assert!(manager.get_session().is_none());

        store.set(SESSION_STORAGE_KEY, r#"{"user_id": 12}"#).unwrap();
        assert!(!manager.is_logged_in());
    }

    #[test]
    fn quota_failure_reports_false() {
        let store = Arc::new(MemoryStore::with_quota(16));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let manager = SessionManager::new(store, clock);

        assert!(!manager.set_session(faculty()));
        assert!(!manager.is_logged_in());
    }

    #[test]
    fn accessors_follow_the_session() {
        let (_, clock, manager) = setup();
        assert_eq!(manager.user_id(), None);

        manager.set_session(faculty());
        assert_eq!(manager.user_id(), Some(UserId::Numeric(12)));
        assert_eq!(manager.user_role().as_deref(), Some("FACULTY"));
        assert_eq!(manager.user_email().as_deref(), Some("k.iyer@college.edu"));
        assert_eq!(manager.user_name().as_deref(), Some("Kavya Iyer"));
        assert_eq!(manager.display_info().unwrap().first_name, "Kavya");

        clock.advance(chrono::Duration::minutes(30));
        assert_eq!(manager.user_role(), None);
    }

    #[test]
    fn remember_me_survives_clear_session() {
        let (_, _, manager) = setup();
        assert!(!manager.remembers_me());

        assert!(manager.set_remember_me(true));
        manager.clear_session();
        assert!(manager.remembers_me());

        assert!(manager.set_remember_me(false));
        assert!(!manager.remembers_me());
    }

    #[test]
    fn custom_ttl_is_applied() {
        let (_, _, manager) = setup();
        let manager = manager.with_ttl(chrono::Duration::minutes(5));
        manager.set_session(faculty());

        let session = manager.get_session().unwrap();
        assert_eq!(session.expires_at - session.created_at, chrono::Duration::minutes(5));
    }

    #[test]
    fn oversized_ttl_stores_a_valid_session() {
        let (_, clock, manager) = setup();
        let manager = manager.with_ttl(chrono::Duration::minutes(10_000_000_000_000));

        assert!(manager.set_session(faculty()));
        assert!(manager.is_logged_in());
        clock.advance(chrono::Duration::days(3650));
        assert!(manager.refresh_session());
    }
}
