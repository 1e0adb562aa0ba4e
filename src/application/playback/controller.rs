//! Playback Controller
//!
//! 把纯状态机、进度计算和合成引擎端口组合在一起：
//! 执行状态机产生的引擎指令，处理引擎事件，发布播放事件。

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{EngineEvent, SpeechEnginePort, Utterance};
use crate::domain::playback::{
    EngineDirective, PlaybackMachine, PlaybackState, ProgressSnapshot, ProgressTracker,
    Transition,
};
use crate::domain::speech::{DurationEstimator, VoiceCatalog, VoiceDescriptor, VoiceSettings};
use crate::infrastructure::events::EventPublisher;

/// 播放状态快照
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub session_id: Option<Uuid>,
    pub progress: ProgressSnapshot,
}

pub struct PlaybackController {
    machine: PlaybackMachine,
    tracker: ProgressTracker,
    catalog: VoiceCatalog,
    engine: Arc<dyn SpeechEnginePort>,
    events: Arc<EventPublisher>,
}

impl PlaybackController {
    pub fn new(
        engine: Arc<dyn SpeechEnginePort>,
        events: Arc<EventPublisher>,
        estimator: DurationEstimator,
    ) -> Self {
        let catalog = VoiceCatalog::new(engine.voices());
        Self {
            machine: PlaybackMachine::new(estimator),
            tracker: ProgressTracker::new(),
            catalog,
            engine,
            events,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.machine.state()
    }

    /// 只有 Playing 状态需要 tick
    pub fn is_ticking(&self) -> bool {
        self.tracker.is_running() && self.machine.state() == PlaybackState::Playing
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            state: self.machine.state(),
            session_id: self.machine.session().map(|s| s.id),
            progress: self.tracker.snapshot(),
        }
    }

    pub fn voices(&self) -> &[VoiceDescriptor] {
        self.catalog.voices()
    }

    /// Play：已有会话时先取消，再开始新的朗读
    pub async fn play(
        &mut self,
        text: &str,
        mut settings: VoiceSettings,
    ) -> Result<PlaybackStatus, ApplicationError> {
        if settings.voice().is_none() {
            settings.set_voice(self.catalog.default_voice().cloned());
        }

        let transition = self.machine.play(text, settings)?;
        // 旧会话的进度在 Cancel 前清零
        self.tracker.reset();

        if let Err(e) = self.apply(&transition.directives).await {
            let aborted = self.machine.abort();
            self.tracker.reset();
            self.publish_transition(&aborted, None);
            let err = ApplicationError::from(e);
            tracing::warn!(error = %err, "Engine rejected utterance");
            self.events.publish_error(err.user_message());
            return Err(err);
        }

        let (session_id, estimated_secs) = match self.machine.session() {
            Some(s) => (s.id, s.estimated_secs),
            None => return Err(ApplicationError::internal("session missing after play")),
        };
        self.tracker.start(estimated_secs);
        self.publish_transition(&transition, Some(session_id));

        tracing::info!(
            session_id = %session_id,
            chars = text.chars().count(),
            estimated_secs = estimated_secs,
            "Playback started"
        );

        Ok(self.status())
    }

    /// 暂停/继续
    pub async fn toggle_pause(&mut self) -> Result<PlaybackStatus, ApplicationError> {
        let transition = self.machine.toggle_pause()?;

        if let Err(e) = self.apply(&transition.directives).await {
            // 引擎仍持有当前 utterance，回到 Idle 前必须取消
            self.engine.cancel().await;
            let aborted = self.machine.abort();
            self.tracker.reset();
            self.publish_transition(&aborted, None);
            let err = ApplicationError::from(e);
            self.events.publish_error(err.user_message());
            return Err(err);
        }

        match transition.to {
            PlaybackState::Paused => self.tracker.pause(),
            PlaybackState::Playing => self.tracker.resume(),
            PlaybackState::Idle => self.tracker.reset(),
        }
        let session_id = self.machine.session().map(|s| s.id);
        self.publish_transition(&transition, session_id);
        tracing::debug!(state = %transition.to, "Playback toggled");

        Ok(self.status())
    }

    /// Stop：无条件回到 Idle
    pub async fn stop(&mut self) -> PlaybackStatus {
        let session_id = self.machine.session().map(|s| s.id);
        let transition = self.machine.stop();
        self.tracker.reset();

        if !transition.is_noop() {
            // Cancel 不会失败
            let _ = self.apply(&transition.directives).await;
            self.publish_transition(&transition, session_id);
            tracing::info!(session_id = ?session_id, "Playback stopped");
        }

        self.status()
    }

    /// 处理引擎事件；引擎报告的错误以 Err 返回给调用方
    pub fn handle_engine_event(&mut self, event: EngineEvent) -> Result<(), ApplicationError> {
        match event {
            EngineEvent::Started(utterance) => {
                if self.machine.owns(utterance) {
                    tracing::debug!(utterance = %utterance, "Engine started speaking");
                }
                Ok(())
            }
            EngineEvent::Ended(utterance) => {
                let session_id = self.machine.session().map(|s| s.id);
                match self.machine.engine_completed(utterance) {
                    Some(transition) => {
                        self.tracker.reset();
                        self.publish_transition(&transition, session_id);
                        self.events.publish_status("Finished speaking");
                        tracing::info!(session_id = ?session_id, "Playback completed");
                    }
                    None => {
                        tracing::debug!(utterance = %utterance, "Ignoring end of stale utterance");
                    }
                }
                Ok(())
            }
            EngineEvent::Error { utterance, reason } => {
                let session_id = self.machine.session().map(|s| s.id);
                match self.machine.engine_failed(utterance) {
                    Some(transition) => {
                        self.tracker.reset();
                        self.publish_transition(&transition, session_id);
                        let err = ApplicationError::EngineError(reason);
                        tracing::warn!(session_id = ?session_id, error = %err, "Playback failed");
                        self.events.publish_error(err.user_message());
                        Err(err)
                    }
                    None => {
                        tracing::debug!(
                            utterance = %utterance,
                            reason = %reason,
                            "Ignoring error of stale utterance"
                        );
                        Ok(())
                    }
                }
            }
            EngineEvent::VoicesChanged => {
                if self.catalog.replace(self.engine.voices()) {
                    tracing::info!(count = self.catalog.len(), "Voice list refreshed");
                    self.events.publish_voices_changed(self.catalog.len());
                }
                Ok(())
            }
        }
    }

    /// 周期 tick，只更新展示用进度
    pub fn on_tick(&mut self, dt: Duration) {
        if !self.is_ticking() {
            return;
        }
        self.tracker.tick(dt);
        self.events.publish_progress(self.tracker.snapshot());
    }

    async fn apply(
        &self,
        directives: &[EngineDirective],
    ) -> Result<(), crate::application::ports::EngineError> {
        for directive in directives {
            match directive {
                EngineDirective::Speak {
                    utterance,
                    text,
                    settings,
                } => {
                    self.engine
                        .speak(Utterance::new(*utterance, text, settings))
                        .await?
                }
                EngineDirective::Pause => self.engine.pause().await?,
                EngineDirective::Resume => self.engine.resume().await?,
                EngineDirective::Cancel => self.engine.cancel().await,
            }
        }
        Ok(())
    }

    fn publish_transition(&self, transition: &Transition, session_id: Option<Uuid>) {
        if transition.from != transition.to || transition.to == PlaybackState::Playing {
            self.events
                .publish_state_changed(session_id, transition.from, transition.to);
        }
    }
}
