//! Fs File Saver - 文件系统保存实现
//!
//! 实现 FileSaverPort trait，同名文件存在时追加序号而不是覆盖

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::application::ports::{FileSaveError, FileSaverPort, SavedFile};

/// 文件系统保存器
pub struct FsFileSaver {
    /// 输出目录
    base_dir: PathBuf,
}

impl FsFileSaver {
    /// 创建保存器，目录在首次保存时创建
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// 依次尝试 name.ext, name-1.ext, name-2.ext ...
    ///
    /// 用 create_new 打开，已存在的文件不会被截断
    async fn create_unique(&self, filename: &str) -> Result<(PathBuf, fs::File), FileSaveError> {
        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (filename, None),
        };

        let mut n = 0u32;
        loop {
            let name = match (n, ext) {
                (0, _) => filename.to_string(),
                (_, Some(ext)) => format!("{}-{}.{}", stem, n, ext),
                (_, None) => format!("{}-{}", stem, n),
            };
            let path = self.base_dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    n = n
                        .checked_add(1)
                        .ok_or_else(|| FileSaveError::IoError("no free filename".to_string()))?;
                }
                Err(e) => return Err(FileSaveError::IoError(e.to_string())),
            }
        }
    }
}

fn validate_filename(filename: &str) -> Result<(), FileSaveError> {
    let trimmed = filename.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\', '\0'])
    {
        return Err(FileSaveError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

#[async_trait]
impl FileSaverPort for FsFileSaver {
    async fn save(
        &self,
        payload: &[u8],
        mime_type: &str,
        suggested_filename: &str,
    ) -> Result<SavedFile, FileSaveError> {
        validate_filename(suggested_filename)?;

        // 确保目录存在
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| FileSaveError::IoError(e.to_string()))?;

        let (path, mut file) = self.create_unique(suggested_filename.trim()).await?;
        let written = async {
            file.write_all(payload).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            let _ = fs::remove_file(&path).await;
            return Err(FileSaveError::IoError(e.to_string()));
        }

        tracing::info!(
            path = %path.display(),
            mime = %mime_type,
            bytes = payload.len(),
            "Saved export"
        );

        Ok(SavedFile {
            path,
            bytes: payload.len(),
        })
    }
}
