//! Playback Context - Errors

use thiserror::Error;

use crate::domain::speech::SpeechError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("{0}")]
    InputInvalid(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<SpeechError> for PlaybackError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::InputInvalid(msg) => Self::InputInvalid(msg),
        }
    }
}
