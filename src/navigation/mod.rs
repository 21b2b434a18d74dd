// 导航栏：身份展示与按角色生成菜单

mod menu;

pub use menu::{MenuItem, badge_label, is_active, menu_for_role};

use serde::Serialize;

use crate::cache::models::session::SessionRecord;

/// 导航栏展示的用户信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDisplay {
    pub name: String,
    pub first_name: String,
    pub email: String,
    pub role_label: String,
}

impl From<&SessionRecord> for UserDisplay {
    fn from(session: &SessionRecord) -> Self {
        let first_name = session
            .name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            name: session.name.clone(),
            first_name,
            email: session.email.clone(),
            role_label: session.role.to_uppercase(),
        }
    }
}
