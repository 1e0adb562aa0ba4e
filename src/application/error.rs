//! 应用层错误定义
//!
//! 所有平台/引擎错误都在命令边界被捕获，并转换为面向用户的状态文本

use thiserror::Error;

use crate::application::export::ExportError;
use crate::application::ports::EngineError;
use crate::domain::playback::PlaybackError;
use crate::domain::speech::SpeechError;

/// 应用层错误
#[derive(Debug, Clone, Error)]
pub enum ApplicationError {
    /// 文本为空或超长
    #[error("{0}")]
    InputInvalid(String),

    /// 平台完全不支持语音合成，启动时报告一次
    #[error("Speech synthesis is not supported: {0}")]
    EngineUnsupported(String),

    /// 朗读中途失败，已回到 Idle
    #[error("Speech engine error: {0}")]
    EngineError(String),

    /// 当前状态不允许该命令
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 导出错误
    #[error(transparent)]
    Export(#[from] ExportError),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InputInvalid(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// 面向用户的状态文本
    pub fn user_message(&self) -> String {
        match self {
            Self::InputInvalid(msg) => msg.clone(),
            Self::EngineUnsupported(_) => {
                "Text-to-speech is not supported on this platform.".to_string()
            }
            Self::EngineError(reason) => format!("Speech stopped: {}", reason),
            Self::InvalidState(msg) => msg.clone(),
            Self::Export(err) => err.user_message(),
            Self::InternalError(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<SpeechError> for ApplicationError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::InputInvalid(msg) => Self::InputInvalid(msg),
        }
    }
}

impl From<PlaybackError> for ApplicationError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::InputInvalid(msg) => Self::InputInvalid(msg),
            PlaybackError::InvalidState(msg) => Self::InvalidState(msg),
        }
    }
}

impl From<EngineError> for ApplicationError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unsupported(reason) => Self::EngineUnsupported(reason),
            EngineError::Failed(reason) => Self::EngineError(reason),
        }
    }
}
