//! Export Context - 导出限界上下文
//!
//! 职责:
//! - 导出产物定义
//! - 文本说明文档
//! - 静音占位 WAV

mod artifact;
mod description;
mod wav;

pub use artifact::{ArtifactKind, ExportArtifact, DEFAULT_RECORDING_MIME, TEXT_MIME, WAV_MIME};
pub use description::describe;
pub use wav::{silent_wav, WavFormat, WavInfo, WAV_HEADER_LEN};
