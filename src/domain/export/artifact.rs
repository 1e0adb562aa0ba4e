//! Export Artifact
//!
//! 导出产物：创建后不可变

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::wav::WavInfo;

pub const TEXT_MIME: &str = "text/plain;charset=utf-8";
pub const WAV_MIME: &str = "audio/wav";
pub const DEFAULT_RECORDING_MIME: &str = "audio/webm";

/// 导出类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// 文本说明（始终可用）
    TextDescription,
    /// 录制的系统/标签页音频
    RecordedAudio,
    /// 静音占位 WAV
    SilentPlaceholder,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextDescription => "text_description",
            Self::RecordedAudio => "recorded_audio",
            Self::SilentPlaceholder => "silent_placeholder",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    kind: ArtifactKind,
    payload: Vec<u8>,
    suggested_filename: String,
    mime_type: String,
}

impl ExportArtifact {
    pub fn text_description(document: String, at: DateTime<Utc>) -> Self {
        Self {
            kind: ArtifactKind::TextDescription,
            payload: document.into_bytes(),
            suggested_filename: format!("speech-{}.txt", file_stamp(at)),
            mime_type: TEXT_MIME.to_string(),
        }
    }

    pub fn recorded_audio(payload: Vec<u8>, mime_type: &str, at: DateTime<Utc>) -> Self {
        let mime_type = if mime_type.is_empty() {
            DEFAULT_RECORDING_MIME
        } else {
            mime_type
        };
        Self {
            kind: ArtifactKind::RecordedAudio,
            payload,
            suggested_filename: format!(
                "speech-recording-{}.{}",
                file_stamp(at),
                extension_for(mime_type)
            ),
            mime_type: mime_type.to_string(),
        }
    }

    pub fn silent_placeholder(wav: Vec<u8>, at: DateTime<Utc>) -> Self {
        Self {
            kind: ArtifactKind::SilentPlaceholder,
            payload: wav,
            suggested_filename: format!("speech-placeholder-{}.wav", file_stamp(at)),
            mime_type: WAV_MIME.to_string(),
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn suggested_filename(&self) -> &str {
        &self.suggested_filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// 是否包含真实录制的语音
    pub fn is_real_audio(&self) -> bool {
        self.kind == ArtifactKind::RecordedAudio
    }

    /// 面向用户的提示，占位文件必须明确说明其中只有静音
    pub fn user_notice(&self) -> String {
        match self.kind {
            ArtifactKind::TextDescription => {
                "Saved a text file with your text and voice settings. \
                 Browsers do not expose synthesized speech as audio data."
                    .to_string()
            }
            ArtifactKind::RecordedAudio => {
                format!("Saved a recording of the spoken text ({} bytes).", self.len())
            }
            ArtifactKind::SilentPlaceholder => {
                let secs = WavInfo::parse(&self.payload)
                    .map(|info| info.duration_secs())
                    .unwrap_or(0.0);
                format!(
                    "Saved a {:.1}s placeholder WAV file. It contains silence only, \
                     not the synthesized speech.",
                    secs
                )
            }
        }
    }
}

fn file_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d-%H%M%S").to_string()
}

fn extension_for(mime_type: &str) -> &'static str {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    match essence {
        "audio/ogg" => "ogg",
        "audio/wav" | "audio/wave" | "audio/x-wav" => "wav",
        "audio/mp4" => "m4a",
        "audio/mpeg" => "mp3",
        _ => "webm",
    }
}
