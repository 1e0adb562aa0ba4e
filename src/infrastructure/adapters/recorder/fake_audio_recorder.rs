//! Fake Audio Recorder - 用于测试与无捕获能力环境的录制器
//!
//! 按配置的行为模拟授权结果，授权后在 stop 时返回预设的音频块

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::application::ports::{AudioRecorderPort, CaptureSession, RecorderError};

/// 模拟的授权结果
#[derive(Debug, Clone)]
pub enum FakeRecorderBehavior {
    /// 用户拒绝授权
    Deny,
    /// 授权成功
    Grant {
        chunks: Vec<Vec<u8>>,
        has_audio: bool,
        mime_type: String,
    },
    /// 授权成功但启动录制失败
    FailOnStart(String),
}

/// Fake Audio Recorder
pub struct FakeAudioRecorder {
    behavior: FakeRecorderBehavior,
    requests: AtomicUsize,
    stops: Arc<AtomicUsize>,
}

impl FakeAudioRecorder {
    pub fn new(behavior: FakeRecorderBehavior) -> Self {
        Self {
            behavior,
            requests: AtomicUsize::new(0),
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 授权请求次数
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// 所有捕获会话上 stop 的调用次数
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

struct FakeCapture {
    chunks: Vec<Vec<u8>>,
    has_audio: bool,
    mime_type: String,
    start_error: Option<String>,
    recording: bool,
    stops: Arc<AtomicUsize>,
}

#[async_trait]
impl CaptureSession for FakeCapture {
    fn has_audio_track(&self) -> bool {
        self.has_audio
    }

    fn mime_type(&self) -> String {
        self.mime_type.clone()
    }

    async fn start(&mut self) -> Result<(), RecorderError> {
        if let Some(reason) = &self.start_error {
            return Err(RecorderError::Failed(reason.clone()));
        }
        self.recording = true;
        Ok(())
    }

    async fn stop(&mut self) -> Result<Vec<Vec<u8>>, RecorderError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if !self.recording {
            return Ok(Vec::new());
        }
        self.recording = false;
        tracing::debug!(chunks = self.chunks.len(), "FakeAudioRecorder: stopped");
        Ok(std::mem::take(&mut self.chunks))
    }
}

#[async_trait]
impl AudioRecorderPort for FakeAudioRecorder {
    async fn request_capture(&self) -> Result<Box<dyn CaptureSession>, RecorderError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let capture = match &self.behavior {
            FakeRecorderBehavior::Deny => return Err(RecorderError::PermissionDenied),
            FakeRecorderBehavior::Grant {
                chunks,
                has_audio,
                mime_type,
            } => FakeCapture {
                chunks: chunks.clone(),
                has_audio: *has_audio,
                mime_type: mime_type.clone(),
                start_error: None,
                recording: false,
                stops: self.stops.clone(),
            },
            FakeRecorderBehavior::FailOnStart(reason) => FakeCapture {
                chunks: Vec::new(),
                has_audio: true,
                mime_type: "audio/webm".to_string(),
                start_error: Some(reason.clone()),
                recording: false,
                stops: self.stops.clone(),
            },
        };
        Ok(Box::new(capture))
    }
}
