//! Fake Speech Engine - 进程内的合成引擎
//!
//! 不产生声音，只模拟引擎生命周期：
//! - `Manual`：事件由调用方通过 `complete` / `fail` 触发
//! - `Timed`：按估算时长自动发出结束事件，暂停期间计时冻结

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use crate::application::ports::{
    EngineCapability, EngineError, EngineEvent, SpeechEnginePort, Utterance,
};
use crate::domain::playback::UtteranceId;
use crate::domain::speech::{DurationEstimator, VoiceDescriptor};

/// 结束事件的产生方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    Manual,
    Timed,
}

/// Fake Speech Engine 配置
#[derive(Debug, Clone)]
pub struct FakeSpeechEngineConfig {
    pub mode: CompletionMode,
    /// 初始语音列表
    pub voices: Vec<VoiceDescriptor>,
    /// 设置后 capability() 报告不支持
    pub unsupported: Option<String>,
    /// 设置后 speak() 总是失败
    pub speak_error: Option<String>,
    /// 设置后 pause() / resume() 总是失败
    pub pause_error: Option<String>,
    /// Timed 模式下用于计算朗读时长
    pub estimator: DurationEstimator,
}

impl FakeSpeechEngineConfig {
    pub fn manual() -> Self {
        Self {
            mode: CompletionMode::Manual,
            voices: Vec::new(),
            unsupported: None,
            speak_error: None,
            pause_error: None,
            estimator: DurationEstimator::default(),
        }
    }

    pub fn timed() -> Self {
        Self {
            mode: CompletionMode::Timed,
            ..Self::manual()
        }
    }

    pub fn with_voices(mut self, voices: Vec<VoiceDescriptor>) -> Self {
        self.voices = voices;
        self
    }

    pub fn unsupported(mut self, reason: impl Into<String>) -> Self {
        self.unsupported = Some(reason.into());
        self
    }

    pub fn failing_speak(mut self, reason: impl Into<String>) -> Self {
        self.speak_error = Some(reason.into());
        self
    }

    pub fn failing_pause(mut self, reason: impl Into<String>) -> Self {
        self.pause_error = Some(reason.into());
        self
    }
}

impl Default for FakeSpeechEngineConfig {
    fn default() -> Self {
        Self::timed()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    current: Option<UtteranceId>,
    paused: bool,
}

/// Fake Speech Engine
pub struct FakeSpeechEngine {
    config: FakeSpeechEngineConfig,
    voices: Mutex<Vec<VoiceDescriptor>>,
    spoken: Mutex<Vec<Utterance>>,
    cancels: AtomicUsize,
    slot: Arc<watch::Sender<Slot>>,
    events: broadcast::Sender<EngineEvent>,
}

impl FakeSpeechEngine {
    pub fn new(config: FakeSpeechEngineConfig) -> Self {
        let (slot, _) = watch::channel(Slot::default());
        let (events, _) = broadcast::channel(64);
        tracing::debug!(mode = ?config.mode, voices = config.voices.len(), "FakeSpeechEngine initialized");
        Self {
            voices: Mutex::new(config.voices.clone()),
            config,
            spoken: Mutex::new(Vec::new()),
            cancels: AtomicUsize::new(0),
            slot: Arc::new(slot),
            events,
        }
    }

    /// 已提交的所有 utterance
    pub fn spoken(&self) -> Vec<Utterance> {
        lock(&self.spoken).clone()
    }

    /// 当前正在朗读的 utterance
    pub fn current(&self) -> Option<UtteranceId> {
        self.slot.borrow().current
    }

    pub fn is_paused(&self) -> bool {
        self.slot.borrow().paused
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    /// 模拟朗读结束；对非当前 utterance 也会发出事件
    pub fn complete(&self, utterance: UtteranceId) {
        self.clear_if_current(utterance);
        self.emit(EngineEvent::Ended(utterance));
    }

    /// 模拟朗读出错
    pub fn fail(&self, utterance: UtteranceId, reason: impl Into<String>) {
        self.clear_if_current(utterance);
        self.emit(EngineEvent::Error {
            utterance,
            reason: reason.into(),
        });
    }

    /// 模拟语音列表异步加载完成
    pub fn set_voices(&self, voices: Vec<VoiceDescriptor>) {
        *lock(&self.voices) = voices;
        self.emit(EngineEvent::VoicesChanged);
    }

    fn clear_if_current(&self, utterance: UtteranceId) -> bool {
        clear_slot(&self.slot, utterance)
    }

    fn emit(&self, event: EngineEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("FakeSpeechEngine: no event subscribers");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn clear_slot(slot: &watch::Sender<Slot>, utterance: UtteranceId) -> bool {
    slot.send_if_modified(|s| {
        if s.current == Some(utterance) {
            *s = Slot::default();
            true
        } else {
            false
        }
    })
}

/// Timed 模式：暂停时冻结剩余时长，取消或被替换时退出
async fn finish_after(
    slot: Arc<watch::Sender<Slot>>,
    events: broadcast::Sender<EngineEvent>,
    utterance: UtteranceId,
    mut remaining: Duration,
) {
    let mut rx = slot.subscribe();
    loop {
        let Slot { current, paused } = *rx.borrow_and_update();
        if current != Some(utterance) {
            return;
        }
        if paused {
            if rx.changed().await.is_err() {
                return;
            }
            continue;
        }

        let started = tokio::time::Instant::now();
        tokio::select! {
            _ = tokio::time::sleep(remaining) => {
                if clear_slot(&slot, utterance) {
                    let _ = events.send(EngineEvent::Ended(utterance));
                }
                return;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    return;
                }
                remaining = remaining.saturating_sub(started.elapsed());
            }
        }
    }
}

#[async_trait]
impl SpeechEnginePort for FakeSpeechEngine {
    fn capability(&self) -> EngineCapability {
        match &self.config.unsupported {
            Some(reason) => EngineCapability::Unsupported {
                reason: reason.clone(),
            },
            None => EngineCapability::Supported,
        }
    }

    fn voices(&self) -> Vec<VoiceDescriptor> {
        lock(&self.voices).clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), EngineError> {
        if let Some(reason) = &self.config.unsupported {
            return Err(EngineError::Unsupported(reason.clone()));
        }
        if let Some(reason) = &self.config.speak_error {
            return Err(EngineError::Failed(reason.clone()));
        }

        let id = utterance.id;
        let secs = self
            .config
            .estimator
            .estimate(&utterance.text, f64::from(utterance.rate));
        tracing::debug!(utterance = %id, chars = utterance.text.len(), secs = secs, "FakeSpeechEngine: speak");

        self.slot.send_modify(|s| {
            s.current = Some(id);
            s.paused = false;
        });
        lock(&self.spoken).push(utterance);
        self.emit(EngineEvent::Started(id));

        if self.config.mode == CompletionMode::Timed {
            tokio::spawn(finish_after(
                self.slot.clone(),
                self.events.clone(),
                id,
                Duration::from_secs_f64(secs),
            ));
        }
        Ok(())
    }

    async fn pause(&self) -> Result<(), EngineError> {
        if let Some(reason) = &self.config.pause_error {
            return Err(EngineError::Failed(reason.clone()));
        }
        self.slot.send_if_modified(|s| {
            let changed = s.current.is_some() && !s.paused;
            if changed {
                s.paused = true;
            }
            changed
        });
        Ok(())
    }

    async fn resume(&self) -> Result<(), EngineError> {
        if let Some(reason) = &self.config.pause_error {
            return Err(EngineError::Failed(reason.clone()));
        }
        self.slot.send_if_modified(|s| {
            let changed = s.paused;
            s.paused = false;
            changed
        });
        Ok(())
    }

    async fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.slot.send_modify(|s| *s = Slot::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speech::{SpeechText, VoiceSettings};

    fn utterance(text: &str) -> Utterance {
        Utterance::new(
            UtteranceId::new(),
            &SpeechText::new(text).unwrap(),
            &VoiceSettings::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_engine_emits_end() {
        let engine = FakeSpeechEngine::new(FakeSpeechEngineConfig::timed());
        let mut rx = engine.subscribe();
        let u = utterance("Hello world");
        let id = u.id;

        engine.speak(u).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), EngineEvent::Started(id));
        assert_eq!(rx.recv().await.unwrap(), EngineEvent::Ended(id));
        assert!(engine.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_delays_end() {
        let engine = FakeSpeechEngine::new(FakeSpeechEngineConfig::timed());
        let mut rx = engine.subscribe();
        let u = utterance("Hello world");
        let id = u.id;

        let start = tokio::time::Instant::now();
        engine.speak(u).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        engine.pause().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(engine.current(), Some(id));
        engine.resume().await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), EngineEvent::Started(id));
        assert_eq!(rx.recv().await.unwrap(), EngineEvent::Ended(id));
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_end() {
        let engine = FakeSpeechEngine::new(FakeSpeechEngineConfig::timed());
        let mut rx = engine.subscribe();
        engine.speak(utterance("Hello world")).await.unwrap();
        engine.cancel().await;
        assert!(matches!(rx.recv().await.unwrap(), EngineEvent::Started(_)));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(engine.cancel_count(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_and_failing() {
        let engine =
            FakeSpeechEngine::new(FakeSpeechEngineConfig::manual().unsupported("no speech api"));
        assert!(!engine.capability().is_supported());
        assert!(matches!(
            engine.speak(utterance("x")).await,
            Err(EngineError::Unsupported(_))
        ));

        let engine = FakeSpeechEngine::new(FakeSpeechEngineConfig::manual().failing_speak("boom"));
        assert!(engine.capability().is_supported());
        assert!(matches!(
            engine.speak(utterance("x")).await,
            Err(EngineError::Failed(ref r)) if r == "boom"
        ));
    }
}
