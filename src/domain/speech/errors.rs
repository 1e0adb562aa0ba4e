//! Speech Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    /// 文本为空或超长，消息直接展示给用户
    #[error("{0}")]
    InputInvalid(String),
}
