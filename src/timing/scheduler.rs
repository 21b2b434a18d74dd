use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use super::clock::{Clock, ManualClock};

pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// 定时器句柄，用于取消尚未触发的回调
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// 定时调度能力：`schedule(delay, callback)` / `cancel(handle)`
///
/// 取消已触发或不存在的句柄是空操作。
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
    fn cancel(&self, handle: TimerHandle);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// 基于 tokio 的调度器，每个定时器是一个先 sleep 再执行回调的任务
pub struct TokioScheduler {
    runtime: Handle,
    next_id: AtomicU64,
    tasks: Arc<Mutex<HashMap<u64, AbortHandle>>>,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 在 tokio 运行时之外调用时返回 `None`
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    pub fn pending(&self) -> usize {
        lock(&self.tasks).len()
    }

    /// 取消所有未触发的定时器
    pub fn shutdown(&self) {
        let drained: Vec<AbortHandle> = lock(&self.tasks).drain().map(|(_, task)| task).collect();
        if !drained.is_empty() {
            tracing::debug!("Aborting {} pending timer(s)", drained.len());
        }
        for task in drained {
            task.abort();
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);

        // 持锁插入，保证任务结束时的移除一定发生在插入之后
        let mut guard = lock(&self.tasks);
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            lock(&tasks).remove(&id);
            callback();
        });
        guard.insert(id, join.abort_handle());

        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(task) = lock(&self.tasks).remove(&handle.0) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct PendingTimer {
    id: u64,
    due: DateTime<Utc>,
    callback: TimerCallback,
}

// 超出 chrono 表示范围的延迟按一百年处理
const FAR_FUTURE_DAYS: i64 = 36_500;

/// 虚拟时间调度器，与 `ManualClock` 共享时间，通过 `advance` 推进
pub struct ManualScheduler {
    clock: Arc<ManualClock>,
    next_id: AtomicU64,
    pending: Mutex<Vec<PendingTimer>>,
}

impl ManualScheduler {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            next_id: AtomicU64::new(1),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn clock(&self) -> &Arc<ManualClock> {
        &self.clock
    }

    pub fn pending(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        lock(&self.pending).iter().map(|timer| timer.due).min()
    }

    /// 推进虚拟时间并按到期顺序执行回调，回调执行时时钟停在其到期时刻。
    /// 返回触发的回调数量。
    pub fn advance(&self, by: chrono::Duration) -> usize {
        let target = self.clock.now() + by;
        let mut fired = 0;

        loop {
            let next = {
                let mut pending = lock(&self.pending);
                let index = pending
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.id))
                    .map(|(index, _)| index);
                index.map(|index| pending.remove(index))
            };

            match next {
                Some(timer) => {
                    if timer.due > self.clock.now() {
                        self.clock.set(timer.due);
                    }
                    (timer.callback)();
                    fired += 1;
                }
                None => break,
            }
        }

        if target > self.clock.now() {
            self.clock.set(target);
        }
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let delay = chrono::Duration::from_std(delay)
            .unwrap_or_else(|_| chrono::Duration::days(FAR_FUTURE_DAYS));
        let due = self.clock.now() + delay;

        lock(&self.pending).push(PendingTimer { id, due, callback });
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        lock(&self.pending).retain(|timer| timer.id != handle.0);
    }
}
