//! Playback - 播放用例
//!
//! - controller: 状态机 + 进度 + 引擎端口
//! - worker: 单线程事件循环与命令句柄

mod controller;
mod worker;

pub use controller::{PlaybackController, PlaybackStatus};
pub use worker::{PlaybackCommand, PlaybackHandle, PlaybackWorker, PlaybackWorkerConfig};
