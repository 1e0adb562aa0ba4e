//! File Saver Port - 客户端保存文件

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileSaveError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

/// 保存结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub bytes: usize,
}

#[async_trait]
pub trait FileSaverPort: Send + Sync {
    async fn save(
        &self,
        payload: &[u8],
        mime_type: &str,
        suggested_filename: &str,
    ) -> Result<SavedFile, FileSaveError>;
}
