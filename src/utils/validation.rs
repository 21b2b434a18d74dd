use std::sync::LazyLock;

use regex::Regex;

use crate::api::models::auth::LoginForm;
use crate::error::ValidationError;

// name@domain.tld 基本格式
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

const PASSWORD_SPECIALS: &str = "@$!%*?&";
const PASSWORD_MIN_LEN: usize = 8;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// 至少 8 位，只允许字母、数字和 `@$!%*?&`，且至少包含一个大写字母、一个数字和一个特殊字符
pub fn is_valid_password(password: &str) -> bool {
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c);

    password.chars().count() >= PASSWORD_MIN_LEN
        && password.chars().all(allowed)
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

/// 登录表单只检查必填项，凭据由服务端校验
pub fn validate_login_form(form: &LoginForm) -> Result<(), ValidationError> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    Ok(())
}

/// 注册表单，返回全部问题
pub fn validate_signup_form(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), Vec<ValidationError>> {
    let mut issues = Vec::new();

    if !is_valid_email(email) {
        issues.push(ValidationError::InvalidEmail);
    }
    if !is_valid_password(password) {
        issues.push(ValidationError::WeakPassword);
    }
    if password != confirm_password {
        issues.push(ValidationError::PasswordMismatch);
    }

    if issues.is_empty() { Ok(()) } else { Err(issues) }
}
