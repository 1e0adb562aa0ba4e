//! Progress Tracker
//!
//! 由周期性 tick 驱动的已播放时长与进度百分比。
//! 仅用于展示，朗读是否结束以引擎事件为准。

use serde::Serialize;
use std::time::Duration;

/// 进度快照
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub elapsed_secs: f64,
    pub estimated_secs: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    elapsed_secs: f64,
    estimated_secs: f64,
    running: bool,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新会话开始：从 0 开始计时
    pub fn start(&mut self, estimated_secs: f64) {
        self.elapsed_secs = 0.0;
        self.estimated_secs = if estimated_secs.is_finite() {
            estimated_secs.max(0.0)
        } else {
            0.0
        };
        self.running = true;
    }

    /// 累加一次 tick；暂停或空闲时忽略
    pub fn tick(&mut self, dt: Duration) {
        if self.running {
            self.elapsed_secs += dt.as_secs_f64();
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn estimated_secs(&self) -> f64 {
        self.estimated_secs
    }

    /// 进度百分比，总在 [0, 100] 内；估算时长为 0 时为 0
    pub fn progress(&self) -> f64 {
        if self.estimated_secs <= 0.0 {
            return 0.0;
        }
        (self.elapsed_secs / self.estimated_secs * 100.0).clamp(0.0, 100.0)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            elapsed_secs: self.elapsed_secs,
            estimated_secs: self.estimated_secs,
            percent: self.progress(),
        }
    }
}
