//! Speech Engine Port - 语音合成引擎抽象
//!
//! 合成引擎是外部协作者（浏览器的 speech synthesis 能力或其他实现）。
//! 引擎通过 [`SpeechEnginePort::subscribe`] 推送生命周期事件，调用方不需要轮询引擎状态。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::domain::playback::UtteranceId;
use crate::domain::speech::{SpeechText, VoiceDescriptor, VoiceSettings};

/// 引擎错误
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Speech synthesis is not supported: {0}")]
    Unsupported(String),

    #[error("Speech engine failed: {0}")]
    Failed(String),
}

/// 引擎能力
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCapability {
    Supported,
    Unsupported { reason: String },
}

impl EngineCapability {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported)
    }
}

/// 提交给引擎的一次朗读
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub voice: Option<VoiceDescriptor>,
}

impl Utterance {
    pub fn new(id: UtteranceId, text: &SpeechText, settings: &VoiceSettings) -> Self {
        Self {
            id,
            text: text.as_str().to_string(),
            rate: settings.rate(),
            pitch: settings.pitch(),
            volume: settings.volume(),
            voice: settings.voice().cloned(),
        }
    }
}

/// 引擎事件
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Started(UtteranceId),
    Ended(UtteranceId),
    Error { utterance: UtteranceId, reason: String },
    /// 可用语音列表发生变化，需要重新调用 `voices()`
    VoicesChanged,
}

/// Speech Engine Port
///
/// 进程内唯一的合成引擎句柄，由播放状态机独占驱动
#[async_trait]
pub trait SpeechEnginePort: Send + Sync {
    /// 能力检测，启动时调用一次
    fn capability(&self) -> EngineCapability;

    /// 当前可用语音；首次加载时可能为空
    fn voices(&self) -> Vec<VoiceDescriptor>;

    /// 订阅引擎事件
    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;

    /// 开始朗读
    async fn speak(&self, utterance: Utterance) -> Result<(), EngineError>;

    async fn pause(&self) -> Result<(), EngineError>;

    async fn resume(&self) -> Result<(), EngineError>;

    /// 立即取消当前朗读
    async fn cancel(&self);
}
