// 用户活动驱动的会话自动续期

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;

use crate::cache::operations::session::SessionManager;
use crate::timing::{Scheduler, TimerHandle};

/// 默认防抖时长，最近一次活动 60 秒后续期
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(60);

/// 被监听的用户活动
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityEvent {
    PointerDown,
    KeyDown,
    Scroll,
    TouchStart,
    Click,
}

impl ActivityEvent {
    pub const ALL: [ActivityEvent; 5] = [
        ActivityEvent::PointerDown,
        ActivityEvent::KeyDown,
        ActivityEvent::Scroll,
        ActivityEvent::TouchStart,
        ActivityEvent::Click,
    ];

    pub fn dom_name(&self) -> &'static str {
        match self {
            ActivityEvent::PointerDown => "mousedown",
            ActivityEvent::KeyDown => "keydown",
            ActivityEvent::Scroll => "scroll",
            ActivityEvent::TouchStart => "touchstart",
            ActivityEvent::Click => "click",
        }
    }
}

impl fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown activity event {0:?}")]
pub struct UnknownActivity(pub String);

impl FromStr for ActivityEvent {
    type Err = UnknownActivity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mousedown" | "pointerdown" => Ok(ActivityEvent::PointerDown),
            "keydown" => Ok(ActivityEvent::KeyDown),
            "scroll" => Ok(ActivityEvent::Scroll),
            "touchstart" => Ok(ActivityEvent::TouchStart),
            "click" => Ok(ActivityEvent::Click),
            other => Err(UnknownActivity(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    PendingRefresh,
}

struct MonitorState {
    state: RefreshState,
    pending: Option<TimerHandle>,
    // 每次重新布置定时器都会递增，过期的回调据此忽略自己
    generation: u64,
    refreshes: u64,
}

fn lock(state: &Mutex<MonitorState>) -> MutexGuard<'_, MonitorState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// 活动监视器：把连续的活动合并为一次延迟续期（防抖）
///
/// 只有在会话有效时才会布置定时器；定时器触发时调用一次
/// `refresh_session`，无论窗口内发生了多少次活动。
pub struct ActivityMonitor {
    session: Arc<SessionManager>,
    scheduler: Arc<dyn Scheduler>,
    debounce: Duration,
    state: Arc<Mutex<MonitorState>>,
}

impl ActivityMonitor {
    pub fn new(session: Arc<SessionManager>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            session,
            scheduler,
            debounce: DEFAULT_DEBOUNCE,
            state: Arc::new(Mutex::new(MonitorState {
                state: RefreshState::Idle,
                pending: None,
                generation: 0,
                refreshes: 0,
            })),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn state(&self) -> RefreshState {
        lock(&self.state).state
    }

    /// 已触发并成功续期的次数
    pub fn refresh_count(&self) -> u64 {
        lock(&self.state).refreshes
    }

    /// 处理一次用户活动，返回是否（重新）布置了续期定时器
    pub fn record_activity(&self, event: ActivityEvent) -> bool {
        if !self.session.is_logged_in() {
            tracing::debug!("Ignoring {} without a valid session", event);
            return false;
        }

        let mut state = lock(&self.state);
        if let Some(previous) = state.pending.take() {
            self.scheduler.cancel(previous);
        }
        state.generation += 1;
        let generation = state.generation;

        let session = Arc::clone(&self.session);
        let shared = Arc::clone(&self.state);
        let handle = self.scheduler.schedule(
            self.debounce,
            Box::new(move || {
                {
                    let mut state = lock(&shared);
                    if state.generation != generation {
                        return;
                    }
                    state.pending = None;
                    state.state = RefreshState::Idle;
                }

                if session.refresh_session() {
                    lock(&shared).refreshes += 1;
                    tracing::info!("Session refreshed due to user activity");
                } else {
                    tracing::debug!("Activity timer fired without a valid session");
                }
            }),
        );

        state.pending = Some(handle);
        state.state = RefreshState::PendingRefresh;
        tracing::trace!("{} armed session refresh in {:?}", event, self.debounce);
        true
    }

    /// 取消尚未触发的续期并回到空闲状态
    pub fn shutdown(&self) {
        let mut state = lock(&self.state);
        if let Some(pending) = state.pending.take() {
            self.scheduler.cancel(pending);
            tracing::debug!("Cancelled pending session refresh");
        }
        state.generation += 1;
        state.state = RefreshState::Idle;
    }
}

impl Drop for ActivityMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
