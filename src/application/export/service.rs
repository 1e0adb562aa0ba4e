//! Export Service - 导出与回退策略
//!
//! 平台无法把合成语音直接截取为文件，因此提供三种导出方式：
//! - 文本说明：始终可用，作为默认及回退路径
//! - 录制音频：用户授权后录制系统/标签页音频，尽力而为
//! - 静音占位：格式合法的静音 WAV，不冒充真实语音
//!
//! 录制时长以 `估算时长 + 安全余量` 为上限，即使漏掉引擎完成事件也会结束。
//! 启动延迟与超时都是经验值，录音与语音的对齐只是近似。

use chrono::Utc;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::ExportError;
use crate::application::ports::{
    AudioRecorderPort, EngineEvent, FileSaverPort, SavedFile, SpeechEnginePort, Utterance,
};
use crate::domain::export::{describe, silent_wav, ExportArtifact, WavFormat};
use crate::domain::playback::UtteranceId;
use crate::domain::speech::{DurationEstimator, SpeechText, VoiceSettings};

/// 导出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    TextDescription,
    RecordedAudio,
    SilentPlaceholder,
}

impl ExportMode {
    pub const ALL: [ExportMode; 3] = [
        ExportMode::TextDescription,
        ExportMode::RecordedAudio,
        ExportMode::SilentPlaceholder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextDescription => "text_description",
            Self::RecordedAudio => "recorded_audio",
            Self::SilentPlaceholder => "silent_placeholder",
        }
    }
}

/// 导出配置
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// 开始录制到开始朗读之间的等待
    pub startup_delay: Duration,
    /// 录制时长上限 = 估算时长 + safety_margin
    pub safety_margin: Duration,
    /// 占位 WAV 格式
    pub placeholder_format: WavFormat,
    /// 占位 WAV 最短时长（秒）
    pub min_placeholder_secs: f64,
    pub estimator: DurationEstimator,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_millis(500),
            safety_margin: Duration::from_secs(10),
            placeholder_format: WavFormat::default(),
            min_placeholder_secs: 1.0,
            estimator: DurationEstimator::default(),
        }
    }
}

/// 带回退信息的导出结果
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub artifact: ExportArtifact,
    /// 请求的方式失败时记录原因，artifact 为文本说明
    pub fallback_reason: Option<ExportError>,
}

impl ExportOutcome {
    pub fn user_notice(&self) -> String {
        match &self.fallback_reason {
            Some(reason) => format!("{} {}", reason.user_message(), self.artifact.user_notice()),
            None => self.artifact.user_notice(),
        }
    }
}

pub struct ExportService {
    engine: Arc<dyn SpeechEnginePort>,
    recorder: Arc<dyn AudioRecorderPort>,
    saver: Arc<dyn FileSaverPort>,
    config: ExportConfig,
    cancel: Mutex<CancellationToken>,
}

impl ExportService {
    pub fn new(
        engine: Arc<dyn SpeechEnginePort>,
        recorder: Arc<dyn AudioRecorderPort>,
        saver: Arc<dyn FileSaverPort>,
        config: ExportConfig,
    ) -> Self {
        Self {
            engine,
            recorder,
            saver,
            config,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// 按指定方式导出
    pub async fn export(
        &self,
        text: &str,
        settings: &VoiceSettings,
        mode: ExportMode,
    ) -> Result<ExportArtifact, ExportError> {
        let text = SpeechText::new(text)?;
        let estimated_secs = self
            .config
            .estimator
            .estimate(text.as_str(), f64::from(settings.rate()));

        let artifact = match mode {
            ExportMode::TextDescription => self.text_artifact(&text, settings, estimated_secs),
            ExportMode::SilentPlaceholder => self.placeholder(estimated_secs),
            ExportMode::RecordedAudio => self.record(&text, settings, estimated_secs).await?,
        };

        if artifact.is_empty() {
            return Err(ExportError::ArtifactEmpty);
        }

        tracing::info!(
            kind = %artifact.kind(),
            bytes = artifact.len(),
            filename = %artifact.suggested_filename(),
            "Export artifact created"
        );
        Ok(artifact)
    }

    /// 导出，录制失败时回退到文本说明
    pub async fn export_with_fallback(
        &self,
        text: &str,
        settings: &VoiceSettings,
        mode: ExportMode,
    ) -> Result<ExportOutcome, ExportError> {
        match self.export(text, settings, mode).await {
            Ok(artifact) => Ok(ExportOutcome {
                artifact,
                fallback_reason: None,
            }),
            Err(e) if e.allows_fallback() => {
                tracing::warn!(mode = mode.as_str(), error = %e, "Export failed, falling back to text");
                let artifact = self
                    .export(text, settings, ExportMode::TextDescription)
                    .await?;
                Ok(ExportOutcome {
                    artifact,
                    fallback_reason: Some(e),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// 交给文件保存端口
    pub async fn save(&self, artifact: &ExportArtifact) -> Result<SavedFile, ExportError> {
        if artifact.is_empty() {
            return Err(ExportError::ArtifactEmpty);
        }
        let saved = self
            .saver
            .save(
                artifact.payload(),
                artifact.mime_type(),
                artifact.suggested_filename(),
            )
            .await?;
        tracing::info!(path = %saved.path.display(), bytes = saved.bytes, "Export saved");
        Ok(saved)
    }

    /// 取消进行中的录制（Stop 命令）
    pub fn cancel(&self) {
        let mut guard = match self.cancel.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.cancel();
        *guard = CancellationToken::new();
    }

    fn current_token(&self) -> CancellationToken {
        match self.cancel.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn text_artifact(
        &self,
        text: &SpeechText,
        settings: &VoiceSettings,
        estimated_secs: f64,
    ) -> ExportArtifact {
        let now = Utc::now();
        ExportArtifact::text_description(describe(text.as_str(), settings, estimated_secs, now), now)
    }

    fn placeholder(&self, estimated_secs: f64) -> ExportArtifact {
        let secs = estimated_secs.max(self.config.min_placeholder_secs);
        ExportArtifact::silent_placeholder(
            silent_wav(self.config.placeholder_format, secs),
            Utc::now(),
        )
    }

    async fn record(
        &self,
        text: &SpeechText,
        settings: &VoiceSettings,
        estimated_secs: f64,
    ) -> Result<ExportArtifact, ExportError> {
        let token = self.current_token();

        let mut capture = self.recorder.request_capture().await?;
        if !capture.has_audio_track() {
            let _ = capture.stop().await;
            return Err(ExportError::NoAudioTrack);
        }
        if let Err(e) = capture.start().await {
            // 释放已授权的捕获
            let _ = capture.stop().await;
            return Err(e.into());
        }

        // 先订阅再朗读，避免漏掉结束事件
        let mut events = self.engine.subscribe();

        let spoken = self
            .speak_while_recording(text, settings, estimated_secs, &mut events, &token)
            .await;
        let chunks = capture.stop().await;
        spoken?;
        let chunks = chunks?;

        let payload: Vec<u8> = chunks.concat();
        if payload.is_empty() {
            return Err(ExportError::ArtifactEmpty);
        }
        Ok(ExportArtifact::recorded_audio(
            payload,
            &capture.mime_type(),
            Utc::now(),
        ))
    }

    async fn speak_while_recording(
        &self,
        text: &SpeechText,
        settings: &VoiceSettings,
        estimated_secs: f64,
        events: &mut broadcast::Receiver<EngineEvent>,
        token: &CancellationToken,
    ) -> Result<(), ExportError> {
        tokio::select! {
            _ = tokio::time::sleep(self.config.startup_delay) => {}
            _ = token.cancelled() => return Err(cancelled()),
        }

        let id = UtteranceId::new();
        self.engine
            .speak(Utterance::new(id, text, settings))
            .await
            .map_err(|e| ExportError::RecordingFailed(e.to_string()))?;

        let limit = Duration::from_secs_f64(estimated_secs.max(0.0)) + self.config.safety_margin;
        tokio::select! {
            result = wait_for_end(events, id) => result,
            _ = tokio::time::sleep(limit) => {
                tracing::warn!(
                    limit_secs = limit.as_secs_f64(),
                    "No end event before the recording limit, stopping capture"
                );
                self.engine.cancel().await;
                Ok(())
            }
            _ = token.cancelled() => {
                self.engine.cancel().await;
                Err(cancelled())
            }
        }
    }
}

fn cancelled() -> ExportError {
    ExportError::RecordingFailed("cancelled".to_string())
}

async fn wait_for_end(
    events: &mut broadcast::Receiver<EngineEvent>,
    id: UtteranceId,
) -> Result<(), ExportError> {
    loop {
        match events.recv().await {
            Ok(EngineEvent::Ended(ended)) if ended == id => return Ok(()),
            Ok(EngineEvent::Error { utterance, reason }) if utterance == id => {
                return Err(ExportError::RecordingFailed(reason))
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped = skipped, "Export lagged behind engine events");
            }
            Err(broadcast::error::RecvError::Closed) => {
                return Err(ExportError::RecordingFailed(
                    "engine event stream closed".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::export::{ArtifactKind, WavInfo};
    use crate::infrastructure::adapters::{
        FakeAudioRecorder, FakeRecorderBehavior, FakeSpeechEngine, FakeSpeechEngineConfig,
        FsFileSaver,
    };

    fn service_with(
        engine: FakeSpeechEngineConfig,
        recorder: FakeRecorderBehavior,
        dir: &std::path::Path,
    ) -> ExportService {
        ExportService::new(
            Arc::new(FakeSpeechEngine::new(engine)),
            Arc::new(FakeAudioRecorder::new(recorder)),
            Arc::new(FsFileSaver::new(dir)),
            ExportConfig::default(),
        )
    }

    fn granted() -> FakeRecorderBehavior {
        FakeRecorderBehavior::Grant {
            chunks: vec![vec![1, 2, 3], vec![4, 5]],
            has_audio: true,
            mime_type: "audio/webm;codecs=opus".to_string(),
        }
    }

    #[tokio::test]
    async fn test_text_description_always_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            FakeSpeechEngineConfig::manual(),
            FakeRecorderBehavior::Deny,
            dir.path(),
        );
        let settings = VoiceSettings::new(1.0, 1.2, 0.5);

        let artifact = service
            .export("Hello world", &settings, ExportMode::TextDescription)
            .await
            .unwrap();
        assert_eq!(artifact.kind(), ArtifactKind::TextDescription);
        let doc = String::from_utf8(artifact.payload().to_vec()).unwrap();
        assert!(doc.contains("Hello world"));
        assert!(doc.contains("Rate:   1.0x"));
        assert!(doc.contains("Pitch:  1.2"));
        assert!(doc.contains("Volume: 50%"));
    }

    #[tokio::test]
    async fn test_rejects_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            FakeSpeechEngineConfig::manual(),
            FakeRecorderBehavior::Deny,
            dir.path(),
        );
        let err = service
            .export_with_fallback(" ", &VoiceSettings::default(), ExportMode::TextDescription)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::InputInvalid(_)));
    }

    #[tokio::test]
    async fn test_placeholder_is_valid_silent_wav() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            FakeSpeechEngineConfig::manual(),
            FakeRecorderBehavior::Deny,
            dir.path(),
        );
        let artifact = service
            .export("Hello world", &VoiceSettings::default(), ExportMode::SilentPlaceholder)
            .await
            .unwrap();
        assert_eq!(artifact.kind(), ArtifactKind::SilentPlaceholder);
        assert!(!artifact.is_real_audio());

        // 估算 0.774s，按最短 1s 生成
        let info = WavInfo::parse(artifact.payload()).unwrap();
        assert!((info.duration_secs() - 1.0).abs() < 1e-3);
        assert!(artifact.user_notice().contains("silence"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recording_collects_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(FakeSpeechEngineConfig::timed(), granted(), dir.path());

        let artifact = service
            .export("Hello world", &VoiceSettings::default(), ExportMode::RecordedAudio)
            .await
            .unwrap();
        assert_eq!(artifact.kind(), ArtifactKind::RecordedAudio);
        assert_eq!(artifact.payload(), &[1, 2, 3, 4, 5]);
        assert_eq!(artifact.mime_type(), "audio/webm;codecs=opus");
    }

    #[tokio::test(start_paused = true)]
    async fn test_recording_is_bounded_when_end_is_missed() {
        let dir = tempfile::tempdir().unwrap();
        // manual 引擎永远不会发出结束事件
        let engine = Arc::new(FakeSpeechEngine::new(FakeSpeechEngineConfig::manual()));
        let service = ExportService::new(
            engine.clone(),
            Arc::new(FakeAudioRecorder::new(granted())),
            Arc::new(FsFileSaver::new(dir.path())),
            ExportConfig::default(),
        );

        let started = tokio::time::Instant::now();
        let artifact = service
            .export("Hello world", &VoiceSettings::default(), ExportMode::RecordedAudio)
            .await
            .unwrap();
        let waited = started.elapsed();
        assert!(artifact.is_real_audio());
        assert!(waited >= Duration::from_secs(10));
        assert!(waited < Duration::from_secs(12));
        assert_eq!(engine.cancel_count(), 1);
    }

    #[tokio::test]
    async fn test_permission_denied_falls_back_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            FakeSpeechEngineConfig::manual(),
            FakeRecorderBehavior::Deny,
            dir.path(),
        );

        let err = service
            .export("Hello", &VoiceSettings::default(), ExportMode::RecordedAudio)
            .await
            .unwrap_err();
        assert_eq!(err, ExportError::PermissionDenied);

        let outcome = service
            .export_with_fallback("Hello", &VoiceSettings::default(), ExportMode::RecordedAudio)
            .await
            .unwrap();
        assert_eq!(outcome.artifact.kind(), ArtifactKind::TextDescription);
        assert_eq!(outcome.fallback_reason, Some(ExportError::PermissionDenied));
        assert!(outcome.user_notice().contains("permission"));
    }

    #[tokio::test]
    async fn test_missing_audio_track() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            FakeSpeechEngineConfig::manual(),
            FakeRecorderBehavior::Grant {
                chunks: vec![vec![1]],
                has_audio: false,
                mime_type: "audio/webm".to_string(),
            },
            dir.path(),
        );
        let err = service
            .export("Hello", &VoiceSettings::default(), ExportMode::RecordedAudio)
            .await
            .unwrap_err();
        assert_eq!(err, ExportError::NoAudioTrack);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_recording_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            FakeSpeechEngineConfig::timed(),
            FakeRecorderBehavior::Grant {
                chunks: Vec::new(),
                has_audio: true,
                mime_type: "audio/webm".to_string(),
            },
            dir.path(),
        );
        let outcome = service
            .export_with_fallback("Hello", &VoiceSettings::default(), ExportMode::RecordedAudio)
            .await
            .unwrap();
        assert_eq!(outcome.fallback_reason, Some(ExportError::ArtifactEmpty));
        assert_eq!(outcome.artifact.kind(), ArtifactKind::TextDescription);
    }

    #[tokio::test]
    async fn test_failed_start_releases_capture() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Arc::new(FakeAudioRecorder::new(FakeRecorderBehavior::FailOnStart(
            "device busy".to_string(),
        )));
        let engine = Arc::new(FakeSpeechEngine::new(FakeSpeechEngineConfig::manual()));
        let service = ExportService::new(
            engine.clone(),
            recorder.clone(),
            Arc::new(FsFileSaver::new(dir.path())),
            ExportConfig::default(),
        );

        let err = service
            .export("Hello", &VoiceSettings::default(), ExportMode::RecordedAudio)
            .await
            .unwrap_err();
        assert_eq!(err, ExportError::RecordingFailed("device busy".to_string()));
        assert_eq!(recorder.stop_count(), 1);
        assert!(engine.spoken().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_error_fails_recording() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            FakeSpeechEngineConfig::manual().failing_speak("synthesis-failed"),
            granted(),
            dir.path(),
        );
        let err = service
            .export("Hello", &VoiceSettings::default(), ExportMode::RecordedAudio)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::RecordingFailed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_recording() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(service_with(
            FakeSpeechEngineConfig::manual(),
            granted(),
            dir.path(),
        ));

        let task = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .export("Hello world", &VoiceSettings::default(), ExportMode::RecordedAudio)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_secs(2)).await;
        service.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err, ExportError::RecordingFailed("cancelled".to_string()));
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            FakeSpeechEngineConfig::manual(),
            FakeRecorderBehavior::Deny,
            dir.path(),
        );
        let artifact = service
            .export("Save me", &VoiceSettings::default(), ExportMode::TextDescription)
            .await
            .unwrap();
        let saved = service.save(&artifact).await.unwrap();
        assert_eq!(saved.bytes, artifact.len());
        let written = std::fs::read(&saved.path).unwrap();
        assert_eq!(written, artifact.payload());
    }
}
