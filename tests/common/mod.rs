#![allow(dead_code)]

use std::sync::Arc;

use attendance_session::activity::ActivityMonitor;
use attendance_session::cache::{MemoryStore, SessionManager, SessionUser, UserId};
use attendance_session::timing::{Clock, ManualClock, ManualScheduler};
use chrono::{DateTime, TimeZone, Utc};

/// 测试用的登录时刻 T0
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 4, 10, 0, 0).unwrap()
}

pub fn user(role: &str) -> SessionUser {
    SessionUser {
        user_id: UserId::Numeric(1001),
        email: "r.sharma@college.edu".to_string(),
        name: "Rohan Sharma".to_string(),
        role: role.to_string(),
    }
}

/// 内存存储 + 手动时钟 + 手动调度器
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub scheduler: Arc<ManualScheduler>,
    pub session: Arc<SessionManager>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let scheduler = Arc::new(ManualScheduler::new(Arc::clone(&clock)));
        let session = Arc::new(SessionManager::new(store.clone(), clock.clone()));
        Self {
            store,
            clock,
            scheduler,
            session,
        }
    }

    pub fn monitor(&self) -> ActivityMonitor {
        ActivityMonitor::new(Arc::clone(&self.session), self.scheduler.clone())
    }

    pub fn minutes(&self, m: i64) -> DateTime<Utc> {
        t0() + chrono::Duration::minutes(m)
    }

    /// 把时钟推进到 T0 之后的某个时刻，沿途触发到期的定时器
    pub fn advance_to(&self, instant: DateTime<Utc>) -> usize {
        let now = self.clock_now();
        self.scheduler.advance(instant - now)
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
