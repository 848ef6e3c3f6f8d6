use domain::Timestamp;
use time::{OffsetDateTime, UtcOffset};

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// 系统时钟。
///
/// 本地时区偏移只能在进程仍是单线程时可靠读取，因此 [`SystemClock::local`] 应在启动
/// 异步运行时之前调用；未固定偏移时每次尝试读取本地时间，失败则退回 UTC。
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock {
    offset: Option<UtcOffset>,
}

impl SystemClock {
    pub fn local() -> Self {
        Self {
            offset: UtcOffset::current_local_offset().ok(),
        }
    }

    pub fn with_offset(offset: UtcOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        match self.offset {
            Some(offset) => OffsetDateTime::now_utc().to_offset(offset),
            None => OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()),
        }
    }
}
