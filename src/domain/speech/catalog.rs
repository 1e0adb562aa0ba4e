//! Voice Catalog
//!
//! 引擎提供的语音列表。首次加载时列表可能为空，
//! 收到 "voices changed" 通知后需要重新查询并调用 [`VoiceCatalog::replace`]。

use super::VoiceDescriptor;

#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: Vec<VoiceDescriptor>,
}

impl VoiceCatalog {
    pub fn new(voices: Vec<VoiceDescriptor>) -> Self {
        Self { voices }
    }

    /// 用新查询到的列表替换，返回列表是否发生变化
    pub fn replace(&mut self, voices: Vec<VoiceDescriptor>) -> bool {
        if self.voices == voices {
            return false;
        }
        self.voices = voices;
        true
    }

    pub fn voices(&self) -> &[VoiceDescriptor] {
        &self.voices
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn find(&self, name: &str) -> Option<&VoiceDescriptor> {
        self.voices.iter().find(|v| v.name == name)
    }

    /// 默认语音：引擎标记的默认项，否则取第一项
    pub fn default_voice(&self) -> Option<&VoiceDescriptor> {
        self.voices
            .iter()
            .find(|v| v.is_default)
            .or_else(|| self.voices.first())
    }

    /// 按名称解析语音；名称缺失或未知时回退到默认语音
    pub fn resolve(&self, name: Option<&str>) -> Option<&VoiceDescriptor> {
        match name {
            Some(name) => self.find(name).or_else(|| self.default_voice()),
            None => self.default_voice(),
        }
    }

    /// 指定语言前缀的语音，例如 `en` 匹配 `en-US` / `en-GB`
    pub fn by_language<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a VoiceDescriptor> {
        self.voices
            .iter()
            .filter(move |v| v.language.starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VoiceCatalog {
        VoiceCatalog::new(vec![
            VoiceDescriptor::new("Alex", "en-US"),
            VoiceDescriptor::new("Daniel", "en-GB").as_default(),
            VoiceDescriptor::new("Ting-Ting", "zh-CN").remote(),
        ])
    }

    #[test]
    fn test_default_voice_prefers_flag() {
        let catalog = sample();
        assert_eq!(catalog.default_voice().unwrap().name, "Daniel");
    }

    #[test]
    fn test_default_voice_falls_back_to_first() {
        let catalog = VoiceCatalog::new(vec![
            VoiceDescriptor::new("Alex", "en-US"),
            VoiceDescriptor::new("Ting-Ting", "zh-CN"),
        ]);
        assert_eq!(catalog.default_voice().unwrap().name, "Alex");
        assert!(VoiceCatalog::default().default_voice().is_none());
    }

    #[test]
    fn test_resolve_unknown_name() {
        let catalog = sample();
        assert_eq!(catalog.resolve(Some("Alex")).unwrap().name, "Alex");
        assert_eq!(catalog.resolve(Some("Nobody")).unwrap().name, "Daniel");
        assert_eq!(catalog.resolve(None).unwrap().name, "Daniel");
    }

    #[test]
    fn test_replace_reports_changes() {
        let mut catalog = VoiceCatalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.replace(sample().voices().to_vec()));
        assert!(!catalog.replace(sample().voices().to_vec()));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_by_language() {
        let catalog = sample();
        let english: Vec<_> = catalog.by_language("en").map(|v| v.name.as_str()).collect();
        assert_eq!(english, vec!["Alex", "Daniel"]);
    }
}
