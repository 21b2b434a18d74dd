use crate::cache::models::session::SessionRecord;
use crate::config::Config;

/// 受保护页面的访问结论，由调用方负责执行跳转
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAccess {
    Granted,
    RedirectToLogin,
    Forbidden { required: String, actual: String },
}

impl PageAccess {
    pub fn is_permitted(&self) -> bool {
        matches!(self, PageAccess::Granted)
    }

    /// 需要跳转时返回目标路径
    pub fn redirect_path<'a>(&self, config: &'a Config) -> Option<&'a str> {
        match self {
            PageAccess::Granted => None,
            PageAccess::RedirectToLogin => Some(&config.login_path),
            PageAccess::Forbidden { .. } => Some(&config.home_path),
        }
    }
}

/// 根据缓存的会话判断能否进入页面。
///
/// 缓存中的角色只是界面提示，不构成授权边界。
pub fn check_access(session: Option<&SessionRecord>, required_role: Option<&str>) -> PageAccess {
    let Some(session) = session else {
        tracing::debug!("Not logged in, redirecting to login page");
        return PageAccess::RedirectToLogin;
    };

    // 空字符串等同于不要求角色
    match required_role.filter(|role| !role.is_empty()) {
        Some(required) if session.role != required => {
            tracing::debug!(
                "Access denied. Required role: {}, cached role: {}",
                required,
                session.role
            );
            PageAccess::Forbidden {
                required: required.to_string(),
                actual: session.role.clone(),
            }
        }
        _ => PageAccess::Granted,
    }
}
