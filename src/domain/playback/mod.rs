//! Playback Context - 播放限界上下文
//!
//! 职责:
//! - Idle / Playing / Paused 状态转换
//! - 播放进度计算

mod errors;
mod machine;
mod progress;

pub use errors::PlaybackError;
pub use machine::{
    EngineDirective, PlaybackMachine, PlaybackSession, PlaybackState, Transition, UtteranceId,
};
pub use progress::{ProgressSnapshot, ProgressTracker};
