//! Speech Context - Value Objects

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::SpeechError;

/// 文本最大长度（按字符计）
pub const MAX_TEXT_CHARS: usize = 5000;

/// 语速范围
pub const RATE_RANGE: RangeInclusive<f32> = 0.5..=2.0;
/// 音调范围
pub const PITCH_RANGE: RangeInclusive<f32> = 0.0..=2.0;
/// 音量范围
pub const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=1.0;

pub const DEFAULT_RATE: f32 = 1.0;
pub const DEFAULT_PITCH: f32 = 1.0;
pub const DEFAULT_VOLUME: f32 = 1.0;

pub const EMPTY_TEXT_MESSAGE: &str = "Text is required and must be a non-empty string";
pub const TEXT_TOO_LONG_MESSAGE: &str = "Text must be less than 5000 characters";

/// 待朗读的文本
///
/// 不变量:
/// - 去除首尾空白后非空
/// - 字符数不超过 [`MAX_TEXT_CHARS`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechText(String);

impl SpeechText {
    pub fn new(text: impl Into<String>) -> Result<Self, SpeechError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SpeechError::InputInvalid(EMPTY_TEXT_MESSAGE.to_string()));
        }
        if text.chars().count() > MAX_TEXT_CHARS {
            return Err(SpeechError::InputInvalid(TEXT_TOO_LONG_MESSAGE.to_string()));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SpeechText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语音描述（由合成引擎提供）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    pub name: String,
    pub language: String,
    pub is_local: bool,
    pub is_default: bool,
}

impl VoiceDescriptor {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            is_local: true,
            is_default: false,
        }
    }

    pub fn remote(mut self) -> Self {
        self.is_local = false;
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// 展示用标签，例如 `Samantha (en-US)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.language)
    }
}

/// 语音参数
///
/// 数值字段在构造和每次赋值时都被钳制到各自范围内
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceSettings {
    rate: f32,
    pitch: f32,
    volume: f32,
    voice: Option<VoiceDescriptor>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
            volume: DEFAULT_VOLUME,
            voice: None,
        }
    }
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_nan() {
        return fallback;
    }
    value.clamp(*range.start(), *range.end())
}

impl VoiceSettings {
    pub fn new(rate: f32, pitch: f32, volume: f32) -> Self {
        let mut settings = Self::default();
        settings.set_rate(rate);
        settings.set_pitch(pitch);
        settings.set_volume(volume);
        settings
    }

    pub fn with_voice(mut self, voice: Option<VoiceDescriptor>) -> Self {
        self.voice = voice;
        self
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn voice(&self) -> Option<&VoiceDescriptor> {
        self.voice.as_ref()
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = clamp_to(rate, &RATE_RANGE, DEFAULT_RATE);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = clamp_to(pitch, &PITCH_RANGE, DEFAULT_PITCH);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_to(volume, &VOLUME_RANGE, DEFAULT_VOLUME);
    }

    pub fn set_voice(&mut self, voice: Option<VoiceDescriptor>) {
        self.voice = voice;
    }

    /// 音量百分比（四舍五入）
    pub fn volume_percent(&self) -> u32 {
        (self.volume * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_text_rejects_blank() {
        let err = SpeechText::new("   \n\t").unwrap_err();
        assert_eq!(err.to_string(), EMPTY_TEXT_MESSAGE);
    }

    #[test]
    fn test_speech_text_length_boundary() {
        assert!(SpeechText::new("a".repeat(MAX_TEXT_CHARS)).is_ok());
        let err = SpeechText::new("a".repeat(MAX_TEXT_CHARS + 1)).unwrap_err();
        assert_eq!(err.to_string(), TEXT_TOO_LONG_MESSAGE);
    }

    #[test]
    fn test_speech_text_counts_chars_not_bytes() {
        // 每个字符 3 字节
        let text = "语".repeat(MAX_TEXT_CHARS);
        assert!(SpeechText::new(text).is_ok());
    }

    #[test]
    fn test_settings_are_clamped() {
        let settings = VoiceSettings::new(9.0, -1.0, 3.0);
        assert_eq!(settings.rate(), 2.0);
        assert_eq!(settings.pitch(), 0.0);
        assert_eq!(settings.volume(), 1.0);

        let mut settings = VoiceSettings::default();
        settings.set_rate(0.0);
        assert_eq!(settings.rate(), 0.5);
        settings.set_volume(f32::NAN);
        assert_eq!(settings.volume(), DEFAULT_VOLUME);
    }

    #[test]
    fn test_volume_percent() {
        let settings = VoiceSettings::new(1.0, 1.0, 0.456);
        assert_eq!(settings.volume_percent(), 46);
    }

    #[test]
    fn test_voice_label() {
        let voice = VoiceDescriptor::new("Samantha", "en-US").as_default();
        assert_eq!(voice.label(), "Samantha (en-US)");
        assert!(voice.is_default);
        assert!(voice.is_local);
    }
}
