//! Playback Worker - 单一执行上下文的事件循环
//!
//! 所有状态转换都发生在 worker 任务内：
//! - 用户命令（mpsc，oneshot 回复，每个命令只回复一次）
//! - 引擎事件（broadcast 订阅）
//! - 进度 tick（只在 Playing 时启用）

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::controller::{PlaybackController, PlaybackStatus};
use crate::application::error::ApplicationError;
use crate::application::ports::{EngineEvent, SpeechEnginePort};
use crate::domain::speech::{DurationEstimator, VoiceDescriptor, VoiceSettings};
use crate::infrastructure::events::EventPublisher;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct PlaybackWorkerConfig {
    /// 进度 tick 间隔
    pub tick_interval: Duration,
    /// 命令队列长度
    pub queue_capacity: usize,
    pub estimator: DurationEstimator,
}

impl Default for PlaybackWorkerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            queue_capacity: 32,
            estimator: DurationEstimator::default(),
        }
    }
}

type Reply<T> = oneshot::Sender<T>;

/// 两次 tick 之间实际经过的时间
///
/// 跳过的 tick 不会丢失进度：下一次 tick 补上整段间隔
#[derive(Debug)]
struct TickClock {
    last: Instant,
}

impl TickClock {
    fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    fn restart(&mut self) {
        self.last = Instant::now();
    }

    fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        dt
    }
}

/// 播放命令
#[derive(Debug)]
pub enum PlaybackCommand {
    Play {
        text: String,
        settings: VoiceSettings,
        reply: Reply<Result<PlaybackStatus, ApplicationError>>,
    },
    TogglePause {
        reply: Reply<Result<PlaybackStatus, ApplicationError>>,
    },
    Stop {
        reply: Reply<PlaybackStatus>,
    },
    Status {
        reply: Reply<PlaybackStatus>,
    },
    Voices {
        reply: Reply<Vec<VoiceDescriptor>>,
    },
}

/// 播放 worker
pub struct PlaybackWorker {
    config: PlaybackWorkerConfig,
    controller: PlaybackController,
    commands: mpsc::Receiver<PlaybackCommand>,
    engine_events: broadcast::Receiver<EngineEvent>,
}

impl PlaybackWorker {
    /// 创建 worker 与对应的命令句柄
    ///
    /// 引擎事件在这里订阅，保证之后下发的任何命令产生的事件都能被收到
    pub fn new(
        config: PlaybackWorkerConfig,
        engine: Arc<dyn SpeechEnginePort>,
        events: Arc<EventPublisher>,
    ) -> (Self, PlaybackHandle) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let engine_events = engine.subscribe();
        let controller = PlaybackController::new(engine, events, config.estimator);

        let worker = Self {
            config,
            controller,
            commands: rx,
            engine_events,
        };
        (worker, PlaybackHandle { tx })
    }

    /// 启动 worker，所有句柄被丢弃后退出
    pub async fn run(mut self) {
        tracing::info!(
            tick_ms = self.config.tick_interval.as_millis() as u64,
            "PlaybackWorker started"
        );

        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut clock = TickClock::new();
        let mut engine_open = true;

        loop {
            let ticking = self.controller.is_ticking();
            tokio::select! {
                cmd = self.commands.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd, &mut ticker, &mut clock).await,
                        None => break,
                    }
                }
                event = self.engine_events.recv(), if engine_open => {
                    match event {
                        Ok(event) => {
                            if let Err(e) = self.controller.handle_engine_event(event) {
                                tracing::debug!(error = %e, "Engine event surfaced an error");
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped = skipped, "Engine event stream lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::warn!("Engine event stream closed");
                            engine_open = false;
                        }
                    }
                }
                _ = ticker.tick(), if ticking => {
                    self.controller.on_tick(clock.lap());
                }
            }
        }

        // 句柄全部关闭时停止仍在进行的朗读
        self.controller.stop().await;
        tracing::info!("PlaybackWorker stopped");
    }

    async fn handle_command(
        &mut self,
        cmd: PlaybackCommand,
        ticker: &mut Interval,
        clock: &mut TickClock,
    ) {
        let was_ticking = self.controller.is_ticking();
        let restarts = matches!(cmd, PlaybackCommand::Play { .. });

        match cmd {
            PlaybackCommand::Play {
                text,
                settings,
                reply,
            } => {
                let result = self.controller.play(&text, settings).await;
                let _ = reply.send(result);
            }
            PlaybackCommand::TogglePause { reply } => {
                let result = self.controller.toggle_pause().await;
                let _ = reply.send(result);
            }
            PlaybackCommand::Stop { reply } => {
                let status = self.controller.stop().await;
                let _ = reply.send(status);
            }
            PlaybackCommand::Status { reply } => {
                let _ = reply.send(self.controller.status());
            }
            PlaybackCommand::Voices { reply } => {
                let _ = reply.send(self.controller.voices().to_vec());
            }
        }

        // 进入 Playing 或开始新会话时 tick 从一个完整周期后开始
        if self.controller.is_ticking() && (!was_ticking || restarts) {
            ticker.reset();
            clock.restart();
        }
    }
}

/// 播放命令句柄（可克隆）
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    tx: mpsc::Sender<PlaybackCommand>,
}

impl PlaybackHandle {
    pub async fn play(
        &self,
        text: impl Into<String>,
        settings: VoiceSettings,
    ) -> Result<PlaybackStatus, ApplicationError> {
        let text = text.into();
        self.request(|reply| PlaybackCommand::Play {
            text,
            settings,
            reply,
        })
        .await?
    }

    pub async fn toggle_pause(&self) -> Result<PlaybackStatus, ApplicationError> {
        self.request(|reply| PlaybackCommand::TogglePause { reply })
            .await?
    }

    pub async fn stop(&self) -> Result<PlaybackStatus, ApplicationError> {
        self.request(|reply| PlaybackCommand::Stop { reply }).await
    }

    pub async fn status(&self) -> Result<PlaybackStatus, ApplicationError> {
        self.request(|reply| PlaybackCommand::Status { reply }).await
    }

    pub async fn voices(&self) -> Result<Vec<VoiceDescriptor>, ApplicationError> {
        self.request(|reply| PlaybackCommand::Voices { reply }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> PlaybackCommand,
    ) -> Result<T, ApplicationError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| ApplicationError::internal("playback worker is not running"))?;
        rx.await
            .map_err(|_| ApplicationError::internal("playback worker dropped the command"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::playback::PlaybackState;
    use crate::infrastructure::adapters::{FakeSpeechEngine, FakeSpeechEngineConfig};
    use crate::infrastructure::events::PlaybackEvent;

    fn spawn_worker(engine: Arc<FakeSpeechEngine>) -> (PlaybackHandle, Arc<EventPublisher>) {
        let events = Arc::new(EventPublisher::new());
        let (worker, handle) =
            PlaybackWorker::new(PlaybackWorkerConfig::default(), engine, events.clone());
        tokio::spawn(worker.run());
        (handle, events)
    }

    #[tokio::test(start_paused = true)]
    async fn test_natural_completion_returns_to_idle() {
        // "Hello world" ≈ 0.774s
        let engine = Arc::new(FakeSpeechEngine::new(FakeSpeechEngineConfig::timed()));
        let (handle, _events) = spawn_worker(engine);

        let status = handle
            .play("Hello world", VoiceSettings::default())
            .await
            .unwrap();
        assert_eq!(status.state, PlaybackState::Playing);

        tokio::time::sleep(Duration::from_millis(400)).await;
        let status = handle.status().await.unwrap();
        assert_eq!(status.state, PlaybackState::Playing);
        assert!(status.progress.elapsed_secs > 0.0);

        tokio::time::sleep(Duration::from_secs(1)).await;
        let status = handle.status().await.unwrap();
        assert_eq!(status.state, PlaybackState::Idle);
        assert_eq!(status.progress.percent, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_progress() {
        let engine = Arc::new(FakeSpeechEngine::new(FakeSpeechEngineConfig::manual()));
        let (handle, _events) = spawn_worker(engine);

        handle
            .play("a fairly long sentence to keep the engine busy", VoiceSettings::default())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(550)).await;

        let paused = handle.toggle_pause().await.unwrap();
        assert_eq!(paused.state, PlaybackState::Paused);
        let frozen = paused.progress.elapsed_secs;
        assert!(frozen > 0.0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let status = handle.status().await.unwrap();
        assert_eq!(status.progress.elapsed_secs, frozen);

        let resumed = handle.toggle_pause().await.unwrap();
        assert_eq!(resumed.state, PlaybackState::Playing);
        tokio::time::sleep(Duration::from_millis(350)).await;
        let status = handle.status().await.unwrap();
        assert!(status.progress.elapsed_secs > frozen);

        let stopped = handle.stop().await.unwrap();
        assert_eq!(stopped.state, PlaybackState::Idle);
        assert_eq!(stopped.progress.elapsed_secs, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_session_completes() {
        let engine = Arc::new(FakeSpeechEngine::new(FakeSpeechEngineConfig::manual()));
        let (handle, events) = spawn_worker(engine.clone());
        let mut rx = events.subscribe();

        handle.play("first", VoiceSettings::default()).await.unwrap();
        let first = engine.current().unwrap();
        handle.play("second", VoiceSettings::default()).await.unwrap();
        let second = engine.current().unwrap();

        engine.complete(first);
        engine.complete(second);
        tokio::time::sleep(Duration::from_millis(10)).await;

        let status = handle.status().await.unwrap();
        assert_eq!(status.state, PlaybackState::Idle);

        let mut completions = 0;
        while let Ok(event) = rx.try_recv() {
            if let PlaybackEvent::StateChanged { to: PlaybackState::Idle, .. } = event {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_clock_measures_real_gap() {
        let mut clock = TickClock::new();
        tokio::time::advance(Duration::from_millis(350)).await;
        assert_eq!(clock.lap(), Duration::from_millis(350));

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(clock.lap(), Duration::from_millis(100));

        tokio::time::advance(Duration::from_secs(2)).await;
        clock.restart();
        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(clock.lap(), Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let engine = Arc::new(FakeSpeechEngine::new(FakeSpeechEngineConfig::manual()));
        let (handle, _events) = spawn_worker(engine.clone());

        let err = handle.play("   ", VoiceSettings::default()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::InputInvalid(_)));
        assert!(engine.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_voices_arrive_after_start() {
        let engine = Arc::new(FakeSpeechEngine::new(FakeSpeechEngineConfig::manual()));
        let (handle, _events) = spawn_worker(engine.clone());
        assert!(handle.voices().await.unwrap().is_empty());

        engine.set_voices(vec![VoiceDescriptor::new("Alex", "en-US")]);
        // 等待 worker 处理 VoicesChanged
        for _ in 0..50 {
            if !handle.voices().await.unwrap().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(handle.voices().await.unwrap().len(), 1);
    }
}
