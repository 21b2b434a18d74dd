use serde::{Deserialize, Serialize};

use crate::cache::models::session::{SessionUser, UserId};

/// 登录表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember: bool,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>, remember: bool) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            remember,
        }
    }
}

/// 登录表单按 `application/x-www-form-urlencoded` 提交时的请求体
#[derive(Debug, Serialize)]
pub(crate) struct LoginFormBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub remember: &'static str,
}

impl<'a> From<&'a LoginForm> for LoginFormBody<'a> {
    fn from(form: &'a LoginForm) -> Self {
        Self {
            email: form.email.trim(),
            password: &form.password,
            remember: if form.remember { "on" } else { "off" },
        }
    }
}

/// 登录响应中的用户信息
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoginUser {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<LoginUser> for SessionUser {
    fn from(user: LoginUser) -> Self {
        SessionUser {
            user_id: user.user_id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

/// 登录响应 `{success, user, redirect?, message?}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub user: Option<LoginUser>,
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// 登出响应
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LogoutResponse {
    #[serde(default)]
    pub redirect: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_body_trims_email_and_encodes_remember_flag() {
        let form = LoginForm::new("  faculty@college.edu ", "Secret@123", true);
        let body = LoginFormBody::from(&form);

        assert_eq!(body.email, "faculty@college.edu");
        assert_eq!(body.remember, "on");
        assert_eq!(LoginFormBody::from(&LoginForm::new("a@b.c", "x", false)).remember, "off");
    }

    #[test]
    fn login_response_tolerates_missing_optionals() {
        let ok: LoginResponse = serde_json::from_str(
            r#"{"success": true, "user": {"user_id": 7, "email": "a@b.edu", "name": "A B", "role": "ADMIN"}, "redirect": "/admin"}"#,
        )
        .unwrap();
        assert!(ok.success);
        assert_eq!(ok.user.unwrap().user_id, UserId::Numeric(7));
        assert_eq!(ok.redirect.as_deref(), Some("/admin"));

        let rejected: LoginResponse =
            serde_json::from_str(r#"{"success": false, "message": "Invalid credentials"}"#).unwrap();
        assert!(!rejected.success);
        assert!(rejected.user.is_none());
        assert_eq!(rejected.message.as_deref(), Some("Invalid credentials"));
    }
}
