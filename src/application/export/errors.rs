//! Export Errors

use thiserror::Error;

use crate::application::ports::{FileSaveError, RecorderError};
use crate::domain::speech::SpeechError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("{0}")]
    InputInvalid(String),

    #[error("Recording permission was denied")]
    PermissionDenied,

    #[error("The shared stream has no audio track")]
    NoAudioTrack,

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error("Export produced an empty file")]
    ArtifactEmpty,

    #[error("Failed to save file: {0}")]
    SaveFailed(String),
}

impl ExportError {
    /// 该错误是否应回退到文本导出
    pub fn allows_fallback(&self) -> bool {
        !matches!(self, Self::InputInvalid(_) | Self::SaveFailed(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::InputInvalid(msg) => msg.clone(),
            Self::PermissionDenied => {
                "Audio capture permission was not granted, so a text file was exported instead."
                    .to_string()
            }
            Self::NoAudioTrack => {
                "The shared source had no audio. Remember to enable \"Share audio\" when choosing a tab."
                    .to_string()
            }
            Self::RecordingFailed(reason) => format!("Recording failed: {}", reason),
            Self::ArtifactEmpty => "Nothing was recorded. Please try again.".to_string(),
            Self::SaveFailed(reason) => format!("Could not save the file: {}", reason),
        }
    }
}

impl From<RecorderError> for ExportError {
    fn from(err: RecorderError) -> Self {
        match err {
            RecorderError::PermissionDenied => Self::PermissionDenied,
            RecorderError::NoAudioTrack => Self::NoAudioTrack,
            RecorderError::Failed(reason) => Self::RecordingFailed(reason),
        }
    }
}

impl From<SpeechError> for ExportError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::InputInvalid(msg) => Self::InputInvalid(msg),
        }
    }
}

impl From<FileSaveError> for ExportError {
    fn from(err: FileSaveError) -> Self {
        Self::SaveFailed(err.to_string())
    }
}
