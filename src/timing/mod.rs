// 时间相关能力：时钟与定时器，均以依赖注入方式提供，测试中可替换为手动驱动的实现

pub mod clock;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::{ManualScheduler, Scheduler, TimerCallback, TimerHandle, TokioScheduler};
