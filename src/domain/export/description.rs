//! 文本说明文档
//!
//! 浏览器无法把合成的语音截取为文件时，导出原文与语音参数

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::domain::speech::{format_clock, word_count, VoiceSettings};

const LIMITATION_NOTE: &str = "\
Note: speech synthesis runs inside the browser and its audio output cannot be
captured directly into a file. This document records the text and the voice
settings instead. Use the recording export to capture tab audio while the
text is spoken, or paste this text into a dedicated TTS tool.";

/// 生成导出用的纯文本文档
///
/// 语速、音调保留一位小数，音量以百分比表示
pub fn describe(
    text: &str,
    settings: &VoiceSettings,
    estimated_secs: f64,
    generated_at: DateTime<Utc>,
) -> String {
    let voice = match settings.voice() {
        Some(v) => v.label(),
        None => "System default".to_string(),
    };

    let mut doc = String::with_capacity(text.len() + 512);
    // 写入 String 不会失败
    let _ = writeln!(doc, "Text-to-Speech Export");
    let _ = writeln!(doc, "=====================");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "Generated: {}", generated_at.to_rfc3339());
    let _ = writeln!(doc);
    let _ = writeln!(doc, "Voice Settings");
    let _ = writeln!(doc, "--------------");
    let _ = writeln!(doc, "Voice:  {}", voice);
    let _ = writeln!(doc, "Rate:   {:.1}x", settings.rate());
    let _ = writeln!(doc, "Pitch:  {:.1}", settings.pitch());
    let _ = writeln!(doc, "Volume: {}%", settings.volume_percent());
    let _ = writeln!(doc);
    let _ = writeln!(
        doc,
        "Words: {}  Estimated duration: {} ({:.1}s)",
        word_count(text),
        format_clock(estimated_secs),
        estimated_secs
    );
    let _ = writeln!(doc);
    let _ = writeln!(doc, "Text");
    let _ = writeln!(doc, "----");
    let _ = writeln!(doc, "{}", text);
    let _ = writeln!(doc);
    let _ = writeln!(doc, "{}", LIMITATION_NOTE);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speech::VoiceDescriptor;

    #[test]
    fn test_contains_text_and_formatted_settings() {
        let settings = VoiceSettings::new(1.5, 0.8, 0.75)
            .with_voice(Some(VoiceDescriptor::new("Samantha", "en-US")));
        let doc = describe("Hello world", &settings, 0.62, Utc::now());

        assert!(doc.contains("Hello world"));
        assert!(doc.contains("Rate:   1.5x"));
        assert!(doc.contains("Pitch:  0.8"));
        assert!(doc.contains("Volume: 75%"));
        assert!(doc.contains("Samantha (en-US)"));
        assert!(doc.contains("cannot be\ncaptured directly"));
    }

    #[test]
    fn test_default_voice_label() {
        let doc = describe("x", &VoiceSettings::default(), 0.0, Utc::now());
        assert!(doc.contains("Voice:  System default"));
        assert!(doc.contains("Rate:   1.0x"));
        assert!(doc.contains("Volume: 100%"));
    }
}
