//! Audio Recorder Port - 音频录制抽象
//!
//! 需要用户授权的系统/标签页音频捕获。捕获开始后持续产出编码后的音频块，
//! 直到显式调用 `stop`。

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecorderError {
    #[error("Recording permission was denied")]
    PermissionDenied,

    #[error("The captured stream has no audio track")]
    NoAudioTrack,

    #[error("Recording failed: {0}")]
    Failed(String),
}

/// 一次已授权的捕获
#[async_trait]
pub trait CaptureSession: Send {
    /// 授权的流是否包含音频轨道
    fn has_audio_track(&self) -> bool;

    /// 录制产物的 MIME 类型
    fn mime_type(&self) -> String;

    async fn start(&mut self) -> Result<(), RecorderError>;

    /// 停止录制并释放轨道，返回按顺序排列的音频块
    async fn stop(&mut self) -> Result<Vec<Vec<u8>>, RecorderError>;
}

/// Audio Recorder Port
#[async_trait]
pub trait AudioRecorderPort: Send + Sync {
    /// 请求捕获（会向用户弹出授权）
    async fn request_capture(&self) -> Result<Box<dyn CaptureSession>, RecorderError>;
}
