//! Speech Context - 语音参数限界上下文
//!
//! 职责:
//! - 文本校验
//! - 语音参数（语速/音调/音量/语音）钳制
//! - 朗读时长估算
//! - 可用语音列表

mod catalog;
mod errors;
mod estimator;
mod value_objects;

pub use catalog::VoiceCatalog;
pub use errors::SpeechError;
pub use estimator::{estimate_duration, format_clock, word_count, DurationEstimator, BASE_WPM};
pub use value_objects::{
    SpeechText, VoiceDescriptor, VoiceSettings, DEFAULT_PITCH, DEFAULT_RATE, DEFAULT_VOLUME,
    EMPTY_TEXT_MESSAGE, MAX_TEXT_CHARS, PITCH_RANGE, RATE_RANGE, TEXT_TOO_LONG_MESSAGE,
    VOLUME_RANGE,
};
