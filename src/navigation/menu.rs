use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: &'static str,
    pub href: &'static str,
    pub icon: &'static str,
}

const fn item(label: &'static str, href: &'static str, icon: &'static str) -> MenuItem {
    MenuItem { label, href, icon }
}

const DASHBOARD: MenuItem = item("Dashboard", "/dashboard", "speedometer2");
const STUDENTS: MenuItem = item("Students", "/students", "people");
const FACULTY: MenuItem = item("Faculty", "/faculty", "person-workspace");
const TIMETABLE: MenuItem = item("Timetable", "/timetable", "calendar3");
const REPORTS: MenuItem = item("Reports", "/reports", "graph-up");

const ADMIN_MENU: &[MenuItem] = &[
    DASHBOARD,
    STUDENTS,
    FACULTY,
    item("Departments", "/departments", "building"),
    TIMETABLE,
    REPORTS,
    item("Settings", "/settings", "gear"),
];

const HOD_MENU: &[MenuItem] = &[DASHBOARD, STUDENTS, FACULTY, TIMETABLE, REPORTS];

const FACULTY_MENU: &[MenuItem] = &[
    DASHBOARD,
    item("Mark Attendance", "/mark-attendance", "clipboard-check"),
    TIMETABLE,
    REPORTS,
];

const STUDENT_MENU: &[MenuItem] = &[
    DASHBOARD,
    item("My Attendance", "/student-attendance", "clipboard-data"),
    TIMETABLE,
];

const PARENT_MENU: &[MenuItem] = &[DASHBOARD];

/// 按角色返回导航菜单，未知角色返回空菜单
pub fn menu_for_role(role: &str) -> &'static [MenuItem] {
    match role {
        "ADMIN" => ADMIN_MENU,
        "HOD" => HOD_MENU,
        "FACULTY" => FACULTY_MENU,
        "STUDENT" => STUDENT_MENU,
        "PARENT" => PARENT_MENU,
        _ => &[],
    }
}

/// 当前路径是否命中菜单项：完全相等，或非根链接的前缀匹配
pub fn is_active(href: &str, current_path: &str) -> bool {
    href == current_path || (href != "/" && current_path.starts_with(href))
}

/// 未读通知角标，超过 9 条显示 "9+"
pub fn badge_label(unread: u32) -> Option<String> {
    match unread {
        0 => None,
        1..=9 => Some(unread.to_string()),
        _ => Some("9+".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menus_per_role() {
        let labels = |role: &str| {
            menu_for_role(role)
                .iter()
                .map(|item| item.label)
                .collect::<Vec<_>>()
        };

        assert_eq!(labels("ADMIN").len(), 7);
        assert_eq!(
            labels("FACULTY"),
            vec!["Dashboard", "Mark Attendance", "Timetable", "Reports"]
        );
        assert_eq!(labels("STUDENT"), vec!["Dashboard", "My Attendance", "Timetable"]);
        assert_eq!(labels("PARENT"), vec!["Dashboard"]);
        assert!(menu_for_role("student").is_empty());
        assert!(menu_for_role("GUEST").is_empty());
    }

    #[test]
    fn active_link_matching() {
        assert!(is_active("/reports", "/reports"));
        assert!(is_active("/reports", "/reports/monthly"));
        assert!(is_active("/", "/"));
        assert!(!is_active("/", "/reports"));
        assert!(!is_active("/timetable", "/reports"));
    }

    #[test]
    fn badge_caps_at_nine() {
        assert_eq!(badge_label(0), None);
        assert_eq!(badge_label(4).as_deref(), Some("4"));
        assert_eq!(badge_label(9).as_deref(), Some("9"));
        assert_eq!(badge_label(27).as_deref(), Some("9+"));
    }
}
