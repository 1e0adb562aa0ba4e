//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Speech Context: 文本、语音参数、时长估算
//! - Playback Context: 播放状态机与进度
//! - Export Context: 导出产物

pub mod export;
pub mod playback;
pub mod speech;
