//! Playback State Machine
//!
//! 纯状态机：只负责状态转换，并以 [`EngineDirective`] 的形式返回需要对合成引擎执行的操作。
//! 引擎事件（完成/出错）由调用方转交，状态机对其只做被动响应。

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::PlaybackError;
use crate::domain::speech::{DurationEstimator, SpeechText, VoiceSettings};

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Utterance 唯一标识，引擎事件据此归属到会话
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UtteranceId(Uuid);

impl UtteranceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UtteranceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 播放会话
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub id: Uuid,
    pub utterance: UtteranceId,
    pub text: SpeechText,
    pub settings: VoiceSettings,
    pub started_at: DateTime<Utc>,
    pub estimated_secs: f64,
}

/// 对合成引擎的指令
#[derive(Debug, Clone, PartialEq)]
pub enum EngineDirective {
    Speak {
        utterance: UtteranceId,
        text: SpeechText,
        settings: VoiceSettings,
    },
    Pause,
    Resume,
    Cancel,
}

/// 一次状态转换
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: PlaybackState,
    pub to: PlaybackState,
    pub directives: Vec<EngineDirective>,
}

impl Transition {
    fn new(from: PlaybackState, to: PlaybackState, directives: Vec<EngineDirective>) -> Self {
        Self {
            from,
            to,
            directives,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.from == self.to && self.directives.is_empty()
    }
}

/// 播放状态机
///
/// 不变量: 同一时刻最多一个活动会话；`session` 非空当且仅当状态不是 Idle
#[derive(Debug)]
pub struct PlaybackMachine {
    state: PlaybackState,
    session: Option<PlaybackSession>,
    estimator: DurationEstimator,
}

impl Default for PlaybackMachine {
    fn default() -> Self {
        Self::new(DurationEstimator::default())
    }
}

impl PlaybackMachine {
    pub fn new(estimator: DurationEstimator) -> Self {
        Self {
            state: PlaybackState::Idle,
            session: None,
            estimator,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// 当前会话是否拥有该 utterance
    pub fn owns(&self, utterance: UtteranceId) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.utterance == utterance)
    }

    /// Play：任意状态 -> Playing
    ///
    /// 已有活动会话时先取消（`Cancel` 排在 `Speak` 之前）
    pub fn play(
        &mut self,
        text: &str,
        settings: VoiceSettings,
    ) -> Result<Transition, PlaybackError> {
        let text = SpeechText::new(text)?;
        let from = self.state;

        let mut directives = Vec::with_capacity(2);
        if from.is_active() {
            directives.push(EngineDirective::Cancel);
        }

        let estimated_secs = self
            .estimator
            .estimate(text.as_str(), f64::from(settings.rate()));
        let session = PlaybackSession {
            id: Uuid::new_v4(),
            utterance: UtteranceId::new(),
            text: text.clone(),
            settings: settings.clone(),
            started_at: Utc::now(),
            estimated_secs,
        };

        directives.push(EngineDirective::Speak {
            utterance: session.utterance,
            text,
            settings,
        });

        self.session = Some(session);
        self.state = PlaybackState::Playing;
        Ok(Transition::new(from, PlaybackState::Playing, directives))
    }

    /// 暂停/继续切换
    pub fn toggle_pause(&mut self) -> Result<Transition, PlaybackError> {
        let from = self.state;
        let (to, directive) = match from {
            PlaybackState::Playing => (PlaybackState::Paused, EngineDirective::Pause),
            PlaybackState::Paused => (PlaybackState::Playing, EngineDirective::Resume),
            PlaybackState::Idle => {
                return Err(PlaybackError::InvalidState(
                    "Nothing is playing".to_string(),
                ))
            }
        };
        self.state = to;
        Ok(Transition::new(from, to, vec![directive]))
    }

    /// Stop：Playing/Paused -> Idle 并取消引擎；Idle 时为空操作
    pub fn stop(&mut self) -> Transition {
        let from = self.state;
        if !from.is_active() {
            return Transition::new(from, from, Vec::new());
        }
        self.reset();
        Transition::new(from, PlaybackState::Idle, vec![EngineDirective::Cancel])
    }

    /// 引擎报告朗读结束；不属于当前会话的事件返回 None
    pub fn engine_completed(&mut self, utterance: UtteranceId) -> Option<Transition> {
        if !self.owns(utterance) {
            return None;
        }
        let from = self.state;
        self.reset();
        Some(Transition::new(from, PlaybackState::Idle, Vec::new()))
    }

    /// 引擎报告错误；不属于当前会话的事件返回 None
    pub fn engine_failed(&mut self, utterance: UtteranceId) -> Option<Transition> {
        self.engine_completed(utterance)
    }

    /// 引擎拒绝执行指令时直接回到 Idle，不再下发 Cancel
    pub fn abort(&mut self) -> Transition {
        let from = self.state;
        self.reset();
        Transition::new(from, PlaybackState::Idle, Vec::new())
    }

    fn reset(&mut self) {
        self.state = PlaybackState::Idle;
        self.session = None;
    }
}
