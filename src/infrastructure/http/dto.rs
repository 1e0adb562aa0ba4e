//! Data Transfer Objects
//!
//! 请求/响应字段统一使用 camelCase

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::RangeInclusive;

use crate::application::ExportMode;
use crate::domain::speech::{
    format_clock, word_count, DurationEstimator, SpeechText, VoiceSettings, DEFAULT_PITCH,
    DEFAULT_RATE, DEFAULT_VOLUME, MAX_TEXT_CHARS, PITCH_RANGE, RATE_RANGE, VOLUME_RANGE,
};

// ============================================================================
// TTS 请求
// ============================================================================

/// POST /api/tts 请求体
///
/// 字段类型不做强约束：text 非字符串视为缺失，数值参数非数字时取默认值
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsRequest {
    #[serde(default)]
    pub text: Value,
    #[serde(default)]
    pub rate: Option<Value>,
    #[serde(default)]
    pub pitch: Option<Value>,
    #[serde(default)]
    pub volume: Option<Value>,
    #[serde(default)]
    pub voice_name: Option<String>,
}

fn number_or(value: &Option<Value>, default: f32) -> f32 {
    value
        .as_ref()
        .and_then(Value::as_f64)
        .map(|v| v as f32)
        .unwrap_or(default)
}

impl TtsRequest {
    /// text 字段（仅字符串有效）
    pub fn text(&self) -> Option<&str> {
        self.text.as_str()
    }

    /// 钳制后的语音参数
    pub fn settings(&self) -> VoiceSettings {
        VoiceSettings::new(
            number_or(&self.rate, DEFAULT_RATE),
            number_or(&self.pitch, DEFAULT_PITCH),
            number_or(&self.volume, DEFAULT_VOLUME),
        )
    }
}

// ============================================================================
// TTS 响应
// ============================================================================

/// 回显的请求摘要
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedRequest {
    pub characters: usize,
    pub words: usize,
    pub estimated_seconds: f64,
    pub estimated_duration: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub voice_name: Option<String>,
}

impl ReceivedRequest {
    pub fn new(
        text: &SpeechText,
        settings: &VoiceSettings,
        voice_name: Option<String>,
        estimator: &DurationEstimator,
    ) -> Self {
        let secs = estimator.estimate(text.as_str(), f64::from(settings.rate()));
        Self {
            characters: text.char_count(),
            words: word_count(text.as_str()),
            estimated_seconds: (secs * 100.0).round() / 100.0,
            estimated_duration: format_clock(secs),
            rate: settings.rate(),
            pitch: settings.pitch(),
            volume: settings.volume(),
            voice_name,
        }
    }
}

/// 服务端合成不可用时的 501 响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsUnavailableResponse {
    pub error: &'static str,
    pub message: &'static str,
    pub alternatives: Vec<&'static str>,
    pub received: ReceivedRequest,
}

pub const NOT_IMPLEMENTED_ERROR: &str = "Server-side text-to-speech is not implemented";

impl TtsUnavailableResponse {
    pub fn new(received: ReceivedRequest) -> Self {
        Self {
            error: NOT_IMPLEMENTED_ERROR,
            message: "Speech is synthesized on the client. This endpoint validates the request \
                      and reports what would be spoken, but returns no audio.",
            alternatives: vec![
                "Play the text with the client speech engine",
                "Export a text description of the speech settings",
                "Record system audio while the client speaks the text",
                "Download a silent WAV placeholder",
            ],
            received,
        }
    }
}

// ============================================================================
// TTS 元数据
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ValueRange {
    fn new(range: &RangeInclusive<f32>, default: f32) -> Self {
        Self {
            min: *range.start(),
            max: *range.end(),
            default,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SupportedRanges {
    pub rate: ValueRange,
    pub pitch: ValueRange,
    pub volume: ValueRange,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsLimits {
    pub max_text_length: usize,
}

/// GET /api/tts 响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsInfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub engine: &'static str,
    pub limits: TtsLimits,
    pub ranges: SupportedRanges,
    pub base_wpm: f64,
    pub export_modes: Vec<&'static str>,
}

impl TtsInfoResponse {
    pub fn new(base_wpm: f64, engine_available: bool) -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            status: "client-side-only",
            engine: if engine_available { "ready" } else { "unavailable" },
            limits: TtsLimits {
                max_text_length: MAX_TEXT_CHARS,
            },
            ranges: SupportedRanges {
                rate: ValueRange::new(&RATE_RANGE, DEFAULT_RATE),
                pitch: ValueRange::new(&PITCH_RANGE, DEFAULT_PITCH),
                volume: ValueRange::new(&VOLUME_RANGE, DEFAULT_VOLUME),
            },
            base_wpm,
            export_modes: ExportMode::ALL.iter().map(ExportMode::as_str).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_settings_are_clamped() {
        let req: TtsRequest = serde_json::from_value(json!({
            "text": "hi",
            "rate": 9,
            "pitch": -1,
            "volume": "loud",
            "voiceName": "Alex"
        }))
        .unwrap();
        let settings = req.settings();
        assert_eq!(settings.rate(), 2.0);
        assert_eq!(settings.pitch(), 0.0);
        assert_eq!(settings.volume(), DEFAULT_VOLUME);
        assert_eq!(req.voice_name.as_deref(), Some("Alex"));
    }

    #[test]
    fn test_non_string_text() {
        let req: TtsRequest = serde_json::from_value(json!({ "text": 42 })).unwrap();
        assert!(req.text().is_none());
        let req: TtsRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.text().is_none());
    }

    #[test]
    fn test_received_echo() {
        let text = SpeechText::new("Hello world").unwrap();
        let received = ReceivedRequest::new(
            &text,
            &VoiceSettings::default(),
            None,
            &DurationEstimator::default(),
        );
        assert_eq!(received.characters, 11);
        assert_eq!(received.words, 2);
        assert_eq!(received.estimated_seconds, 0.77);
        assert_eq!(received.estimated_duration, "0:00");
    }
}
